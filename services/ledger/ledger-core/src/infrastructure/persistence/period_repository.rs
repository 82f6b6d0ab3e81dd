use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgPool;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::domain::error::{LedgerError, LedgerResult};
use crate::domain::period::Period;
use crate::domain::repositories::PeriodRepository;

use super::rows::PeriodRow;

#[derive(Clone)]
pub struct PgPeriodRepository {
    pool: Arc<PgPool>,
}

impl PgPeriodRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn infra_err(e: sqlx::Error) -> LedgerError {
    LedgerError::Infrastructure(e.to_string())
}

#[async_trait]
impl PeriodRepository for PgPeriodRepository {
    async fn find_by_id(&self, organization_id: Uuid, id: Uuid) -> LedgerResult<Option<Period>> {
        debug!(%organization_id, %id, "PeriodRepository.find_by_id");
        let row: Option<PeriodRow> = sqlx::query_as("SELECT * FROM periods WHERE organization_id = $1 AND id = $2")
            .bind(organization_id)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(infra_err)?;
        row.map(PeriodRow::into_domain).transpose()
    }

    async fn find_by_organization(&self, organization_id: Uuid) -> LedgerResult<Vec<Period>> {
        let rows: Vec<PeriodRow> = sqlx::query_as("SELECT * FROM periods WHERE organization_id = $1 ORDER BY start_date")
            .bind(organization_id)
            .fetch_all(self.pool.as_ref())
            .await
            .map_err(infra_err)?;
        rows.into_iter().map(PeriodRow::into_domain).collect()
    }

    async fn find_by_date(&self, organization_id: Uuid, date: NaiveDate) -> LedgerResult<Option<Period>> {
        let row: Option<PeriodRow> = sqlx::query_as(
            "SELECT * FROM periods WHERE organization_id = $1 AND start_date <= $2 AND end_date >= $2 LIMIT 1",
        )
        .bind(organization_id)
        .bind(date)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(infra_err)?;
        row.map(PeriodRow::into_domain).transpose()
    }

    async fn find_open_periods(&self, organization_id: Uuid) -> LedgerResult<Vec<Period>> {
        let rows: Vec<PeriodRow> =
            sqlx::query_as("SELECT * FROM periods WHERE organization_id = $1 AND status = 'open' ORDER BY start_date")
                .bind(organization_id)
                .fetch_all(self.pool.as_ref())
                .await
                .map_err(infra_err)?;
        rows.into_iter().map(PeriodRow::into_domain).collect()
    }

    async fn find_overlapping_periods(
        &self,
        organization_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        exclude_id: Option<Uuid>,
    ) -> LedgerResult<Vec<Period>> {
        let rows: Vec<PeriodRow> = sqlx::query_as(
            "SELECT * FROM periods WHERE organization_id = $1 AND start_date <= $3 AND end_date >= $2 \
             AND ($4::uuid IS NULL OR id != $4)",
        )
        .bind(organization_id)
        .bind(start)
        .bind(end)
        .bind(exclude_id)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(infra_err)?;
        rows.into_iter().map(PeriodRow::into_domain).collect()
    }

    async fn save(&self, period: &Period) -> LedgerResult<()> {
        sqlx::query(
            "INSERT INTO periods (id, organization_id, name, start_date, end_date, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (id) DO UPDATE SET \
               name = EXCLUDED.name, start_date = EXCLUDED.start_date, end_date = EXCLUDED.end_date, \
               status = EXCLUDED.status, updated_at = EXCLUDED.updated_at",
        )
        .bind(period.id())
        .bind(period.organization_id())
        .bind(period.name())
        .bind(period.start_date())
        .bind(period.end_date())
        .bind(period.status().as_str())
        .bind(period.created_at())
        .bind(period.updated_at())
        .execute(self.pool.as_ref())
        .await
        .map_err(infra_err)?;
        Ok(())
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> LedgerResult<()> {
        sqlx::query("DELETE FROM periods WHERE organization_id = $1 AND id = $2")
            .bind(organization_id)
            .bind(id)
            .execute(self.pool.as_ref())
            .await
            .map_err(infra_err)?;
        Ok(())
    }
}
