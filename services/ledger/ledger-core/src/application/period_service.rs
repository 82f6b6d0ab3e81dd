//! Period lifecycle orchestration: overlap checking against the repository,
//! then delegating the state transition itself to the aggregate.

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::error::{LedgerError, LedgerResult};
use crate::domain::period::Period;
use crate::domain::repositories::PeriodRepository;

pub struct PeriodService<R: PeriodRepository> {
    periods: Arc<R>,
}

impl<R: PeriodRepository> PeriodService<R> {
    pub const fn new(periods: Arc<R>) -> Self {
        Self { periods }
    }

    pub async fn create_period(
        &self,
        organization_id: Uuid,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> LedgerResult<Period> {
        self.reject_overlap(organization_id, start_date, end_date, None).await?;
        let period = Period::create(organization_id, name, start_date, end_date, now)?;
        self.periods.save(&period).await?;
        info!(%organization_id, period_id = %period.id(), "period created");
        Ok(period)
    }

    pub async fn update_period(
        &self,
        organization_id: Uuid,
        id: Uuid,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> LedgerResult<Period> {
        let mut period = self.load(organization_id, id).await?;
        self.reject_overlap(organization_id, start_date, end_date, Some(id)).await?;
        period.update(name, start_date, end_date, now)?;
        self.periods.save(&period).await?;
        info!(%organization_id, period_id = %id, "period updated");
        Ok(period)
    }

    pub async fn find_period_for_posting(&self, organization_id: Uuid, date: NaiveDate) -> LedgerResult<Period> {
        self.periods
            .find_by_date(organization_id, date)
            .await?
            .ok_or_else(|| LedgerError::EntityNotFound {
                entity: "period",
                id: date.to_string(),
            })
    }

    pub async fn validate_period_for_posting(&self, organization_id: Uuid, id: Uuid) -> LedgerResult<Period> {
        let period = self.load(organization_id, id).await?;
        period.validate_for_posting()?;
        Ok(period)
    }

    pub async fn start_closing(&self, organization_id: Uuid, id: Uuid, now: DateTime<Utc>) -> LedgerResult<Period> {
        let mut period = self.load(organization_id, id).await?;
        period.start_closing(now)?;
        self.periods.save(&period).await?;
        debug!(%organization_id, period_id = %id, "period closing started");
        Ok(period)
    }

    pub async fn close(&self, organization_id: Uuid, id: Uuid, now: DateTime<Utc>) -> LedgerResult<Period> {
        let mut period = self.load(organization_id, id).await?;
        period.close(now)?;
        self.periods.save(&period).await?;
        info!(%organization_id, period_id = %id, "period closed");
        Ok(period)
    }

    pub async fn reopen(&self, organization_id: Uuid, id: Uuid, now: DateTime<Utc>) -> LedgerResult<Period> {
        let mut period = self.load(organization_id, id).await?;
        period.reopen(now)?;
        self.periods.save(&period).await?;
        info!(%organization_id, period_id = %id, "period reopened");
        Ok(period)
    }

    async fn load(&self, organization_id: Uuid, id: Uuid) -> LedgerResult<Period> {
        self.periods
            .find_by_id(organization_id, id)
            .await?
            .ok_or_else(|| LedgerError::EntityNotFound {
                entity: "period",
                id: id.to_string(),
            })
    }

    async fn reject_overlap(&self, organization_id: Uuid, start: NaiveDate, end: NaiveDate, exclude_id: Option<Uuid>) -> LedgerResult<()> {
        let conflicts = self.periods.find_overlapping_periods(organization_id, start, end, exclude_id).await?;
        if conflicts.is_empty() {
            return Ok(());
        }
        let ids = conflicts.iter().map(|p| p.id().to_string()).collect::<Vec<_>>().join(",");
        Err(LedgerError::business_rule("period interval overlaps existing periods").with_details("overlappingPeriods", ids))
    }
}
