use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgPool, Postgres};
use sqlx::Transaction;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::domain::error::{LedgerError, LedgerResult};
use crate::domain::journal::Journal;
use crate::domain::repositories::JournalRepository;

use super::rows::{JournalLineRow, JournalRow};

#[derive(Clone)]
pub struct PgJournalRepository {
    pool: Arc<PgPool>,
}

impl PgJournalRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn hydrate(&self, row: JournalRow) -> LedgerResult<Journal> {
        let lines: Vec<JournalLineRow> = sqlx::query_as("SELECT * FROM journal_lines WHERE journal_id = $1 ORDER BY line_number")
            .bind(row.id)
            .fetch_all(self.pool.as_ref())
            .await
            .map_err(infra_err)?;
        row.into_domain(lines)
    }

    async fn hydrate_all(&self, rows: Vec<JournalRow>) -> LedgerResult<Vec<Journal>> {
        let mut journals = Vec::with_capacity(rows.len());
        for row in rows {
            journals.push(self.hydrate(row).await?);
        }
        Ok(journals)
    }

    async fn write_journal(tx: &mut Transaction<'_, Postgres>, journal: &Journal) -> LedgerResult<()> {
        sqlx::query(
            "INSERT INTO journals (id, organization_id, period_id, journal_number, description, reference, \
               posting_date, status, currency, hash_prev, hash_self, reversal_journal_id, original_journal_id, \
               ext_uid, created_by, posted_by, posted_at, created_at, updated_at) \
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18,$19) \
             ON CONFLICT (id) DO UPDATE SET \
               description = EXCLUDED.description, reference = EXCLUDED.reference, \
               posting_date = EXCLUDED.posting_date, status = EXCLUDED.status, \
               hash_prev = EXCLUDED.hash_prev, hash_self = EXCLUDED.hash_self, \
               reversal_journal_id = EXCLUDED.reversal_journal_id, \
               original_journal_id = EXCLUDED.original_journal_id, \
               posted_by = EXCLUDED.posted_by, posted_at = EXCLUDED.posted_at, \
               updated_at = EXCLUDED.updated_at",
        )
        .bind(journal.id())
        .bind(journal.organization_id())
        .bind(journal.period_id())
        .bind(journal.journal_number())
        .bind(journal.description())
        .bind(journal.reference())
        .bind(journal.posting_date())
        .bind(journal.status().as_str())
        .bind(journal.currency().to_string())
        .bind(journal.hash_prev().map(|h| h.to_hex()))
        .bind(journal.hash_self().map(|h| h.to_hex()))
        .bind(journal.reversal_journal_id())
        .bind(journal.original_journal_id())
        .bind(journal.ext_uid())
        .bind(journal.created_by())
        .bind(journal.posted_by())
        .bind(journal.posted_at())
        .bind(journal.created_at())
        .bind(journal.updated_at())
        .execute(&mut **tx)
        .await
        .map_err(infra_err)?;

        sqlx::query("DELETE FROM journal_lines WHERE journal_id = $1")
            .bind(journal.id())
            .execute(&mut **tx)
            .await
            .map_err(infra_err)?;

        for line in journal.lines() {
            sqlx::query(
                "INSERT INTO journal_lines (journal_id, line_number, account_id, description, debit_amount, \
                   credit_amount, original_amount, original_currency, exchange_rate, tax_code, tax_amount, tax_rate) \
                 VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)",
            )
            .bind(journal.id())
            .bind(line.line_number() as i32)
            .bind(line.account_id())
            .bind(line.description())
            .bind(line.debit_amount().amount().inner())
            .bind(line.credit_amount().amount().inner())
            .bind(line.original_amount().amount().inner())
            .bind(line.original_amount().currency().to_string())
            .bind(line.exchange_rate())
            .bind(line.tax_code())
            .bind(line.tax_amount().map(|a| a.inner()))
            .bind(line.tax_rate())
            .execute(&mut **tx)
            .await
            .map_err(infra_err)?;
        }
        Ok(())
    }
}

fn infra_err(e: sqlx::Error) -> LedgerError {
    LedgerError::Infrastructure(e.to_string())
}

#[async_trait]
impl JournalRepository for PgJournalRepository {
    async fn find_by_id(&self, organization_id: Uuid, id: Uuid) -> LedgerResult<Option<Journal>> {
        debug!(%organization_id, %id, "JournalRepository.find_by_id");
        let row: Option<JournalRow> = sqlx::query_as("SELECT * FROM journals WHERE organization_id = $1 AND id = $2")
            .bind(organization_id)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(infra_err)?;
        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_ext_uid(&self, organization_id: Uuid, ext_uid: &str) -> LedgerResult<Option<Journal>> {
        let row: Option<JournalRow> = sqlx::query_as("SELECT * FROM journals WHERE organization_id = $1 AND ext_uid = $2")
            .bind(organization_id)
            .bind(ext_uid)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(infra_err)?;
        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_journal_number(&self, organization_id: Uuid, journal_number: &str) -> LedgerResult<Option<Journal>> {
        let row: Option<JournalRow> =
            sqlx::query_as("SELECT * FROM journals WHERE organization_id = $1 AND journal_number = $2")
                .bind(organization_id)
                .bind(journal_number)
                .fetch_optional(self.pool.as_ref())
                .await
                .map_err(infra_err)?;
        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_period(&self, organization_id: Uuid, period_id: Uuid) -> LedgerResult<Vec<Journal>> {
        let rows: Vec<JournalRow> =
            sqlx::query_as("SELECT * FROM journals WHERE organization_id = $1 AND period_id = $2 ORDER BY journal_number")
                .bind(organization_id)
                .bind(period_id)
                .fetch_all(self.pool.as_ref())
                .await
                .map_err(infra_err)?;
        self.hydrate_all(rows).await
    }

    async fn find_posted_journals_chronological(&self, organization_id: Uuid, limit: Option<usize>) -> LedgerResult<Vec<Journal>> {
        let rows: Vec<JournalRow> = sqlx::query_as(
            "SELECT * FROM journals WHERE organization_id = $1 AND status IN ('posted', 'reversed') \
             ORDER BY posted_at ASC, journal_number ASC LIMIT $2",
        )
        .bind(organization_id)
        .bind(limit.map(|l| l as i64).unwrap_or(i64::MAX))
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(infra_err)?;
        self.hydrate_all(rows).await
    }

    async fn find_last_posted_journal(&self, organization_id: Uuid) -> LedgerResult<Option<Journal>> {
        let row: Option<JournalRow> = sqlx::query_as(
            "SELECT * FROM journals WHERE organization_id = $1 AND status IN ('posted', 'reversed') \
             ORDER BY posted_at DESC, journal_number DESC LIMIT 1",
        )
        .bind(organization_id)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(infra_err)?;
        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_draft_journals_by_period(&self, organization_id: Uuid, period_id: Uuid) -> LedgerResult<Vec<Journal>> {
        let rows: Vec<JournalRow> = sqlx::query_as(
            "SELECT * FROM journals WHERE organization_id = $1 AND period_id = $2 AND status = 'draft' ORDER BY journal_number",
        )
        .bind(organization_id)
        .bind(period_id)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(infra_err)?;
        self.hydrate_all(rows).await
    }

    async fn find_by_date_range(&self, organization_id: Uuid, from_date: NaiveDate, to_date: NaiveDate) -> LedgerResult<Vec<Journal>> {
        let rows: Vec<JournalRow> = sqlx::query_as(
            "SELECT * FROM journals WHERE organization_id = $1 AND posting_date BETWEEN $2 AND $3 ORDER BY posting_date",
        )
        .bind(organization_id)
        .bind(from_date)
        .bind(to_date)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(infra_err)?;
        self.hydrate_all(rows).await
    }

    async fn exists_by_journal_number(&self, organization_id: Uuid, journal_number: &str) -> LedgerResult<bool> {
        let row: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM journals WHERE organization_id = $1 AND journal_number = $2")
            .bind(organization_id)
            .bind(journal_number)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(infra_err)?;
        Ok(row.is_some())
    }

    async fn exists_by_ext_uid(&self, organization_id: Uuid, ext_uid: &str) -> LedgerResult<bool> {
        let row: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM journals WHERE organization_id = $1 AND ext_uid = $2")
            .bind(organization_id)
            .bind(ext_uid)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(infra_err)?;
        Ok(row.is_some())
    }

    async fn count_draft_journals_in_period(&self, organization_id: Uuid, period_id: Uuid) -> LedgerResult<u64> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM journals WHERE organization_id = $1 AND period_id = $2 AND status = 'draft'",
        )
        .bind(organization_id)
        .bind(period_id)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(infra_err)?;
        Ok(row.0 as u64)
    }

    async fn save(&self, journal: &Journal) -> LedgerResult<()> {
        let mut tx = self.pool.begin().await.map_err(infra_err)?;
        Self::write_journal(&mut tx, journal).await?;
        tx.commit().await.map_err(infra_err)?;
        Ok(())
    }

    async fn save_multiple(&self, journals: &[Journal]) -> LedgerResult<()> {
        let mut tx = self.pool.begin().await.map_err(infra_err)?;
        for journal in journals {
            Self::write_journal(&mut tx, journal).await?;
        }
        tx.commit().await.map_err(infra_err)?;
        Ok(())
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> LedgerResult<()> {
        sqlx::query("DELETE FROM journals WHERE organization_id = $1 AND id = $2")
            .bind(organization_id)
            .bind(id)
            .execute(self.pool.as_ref())
            .await
            .map_err(infra_err)?;
        Ok(())
    }

    async fn get_next_journal_number(&self, organization_id: Uuid, prefix: Option<&str>) -> LedgerResult<String> {
        let prefix = prefix.unwrap_or("JRN");
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM journals WHERE organization_id = $1 AND journal_number LIKE $2",
        )
        .bind(organization_id)
        .bind(format!("{prefix}-%"))
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(infra_err)?;
        Ok(format!("{prefix}-{:03}", row.0 + 1))
    }
}
