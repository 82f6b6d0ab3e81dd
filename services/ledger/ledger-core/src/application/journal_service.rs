//! Draft journal CRUD and lookups. Posting and reversal live in
//! [`crate::application::posting_service`].

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::error::{LedgerError, LedgerResult};
use crate::domain::journal::{Journal, JournalStatus};
use crate::domain::journal_line::JournalLine;
use crate::domain::repositories::{JournalRepository, PeriodRepository};
use ledger_primitives::CurrencyCode;

use super::period_service::PeriodService;

pub struct JournalService<JR: JournalRepository, PR: PeriodRepository> {
    journals: Arc<JR>,
    periods: PeriodService<PR>,
}

impl<JR: JournalRepository, PR: PeriodRepository> JournalService<JR, PR> {
    pub fn new(journals: Arc<JR>, periods: Arc<PR>) -> Self {
        Self {
            journals,
            periods: PeriodService::new(periods),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_draft(
        &self,
        organization_id: Uuid,
        period_id: Uuid,
        journal_number: impl Into<String>,
        description: impl Into<String>,
        reference: Option<String>,
        posting_date: NaiveDate,
        currency: CurrencyCode,
        lines: Vec<JournalLine>,
        ext_uid: Option<String>,
        created_by: impl Into<String>,
        now: DateTime<Utc>,
    ) -> LedgerResult<Journal> {
        let period = self.periods.validate_period_for_posting(organization_id, period_id).await?;
        if !period.contains(posting_date) {
            return Err(LedgerError::validation("posting_date must fall within the period's interval"));
        }

        let journal_number = journal_number.into();
        if self.journals.exists_by_journal_number(organization_id, &journal_number).await? {
            return Err(LedgerError::business_rule("journal_number already exists").with_details("journal_number", journal_number));
        }
        if let Some(uid) = &ext_uid {
            if self.journals.exists_by_ext_uid(organization_id, uid).await? {
                return Err(LedgerError::business_rule("ext_uid already exists").with_details("ext_uid", uid.clone()));
            }
        }

        let journal = Journal::create_draft(
            organization_id,
            period_id,
            journal_number,
            description,
            reference,
            posting_date,
            currency,
            lines,
            ext_uid,
            created_by,
            now,
        )?;
        self.journals.save(&journal).await?;
        info!(%organization_id, journal_id = %journal.id(), "draft journal created");
        Ok(journal)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update_draft(
        &self,
        organization_id: Uuid,
        id: Uuid,
        description: impl Into<String>,
        reference: Option<String>,
        posting_date: NaiveDate,
        lines: Vec<JournalLine>,
        now: DateTime<Utc>,
    ) -> LedgerResult<Journal> {
        let existing = self.load(organization_id, id).await?;
        if !existing.is_draft() {
            return Err(LedgerError::business_rule("only draft journals may be updated"));
        }
        let period = self.periods.validate_period_for_posting(organization_id, existing.period_id()).await?;
        if !period.contains(posting_date) {
            return Err(LedgerError::validation("posting_date must fall within the period's interval"));
        }

        let updated = Journal::create_draft(
            organization_id,
            existing.period_id(),
            existing.journal_number().to_string(),
            description,
            reference,
            posting_date,
            existing.currency(),
            lines,
            existing.ext_uid().map(str::to_string),
            existing.created_by().to_string(),
            now,
        )?;
        self.journals.save(&updated).await?;
        info!(%organization_id, journal_id = %id, "draft journal updated");
        Ok(updated)
    }

    pub async fn delete(&self, organization_id: Uuid, id: Uuid) -> LedgerResult<()> {
        let existing = self.load(organization_id, id).await?;
        if existing.status() != JournalStatus::Draft {
            return Err(LedgerError::business_rule("only draft journals may be deleted"));
        }
        self.journals.delete(organization_id, id).await?;
        info!(%organization_id, journal_id = %id, "draft journal deleted");
        Ok(())
    }

    pub async fn find_by_id(&self, organization_id: Uuid, id: Uuid) -> LedgerResult<Journal> {
        self.load(organization_id, id).await
    }

    pub async fn find_by_journal_number(&self, organization_id: Uuid, journal_number: &str) -> LedgerResult<Option<Journal>> {
        self.journals.find_by_journal_number(organization_id, journal_number).await
    }

    pub async fn find_by_ext_uid(&self, organization_id: Uuid, ext_uid: &str) -> LedgerResult<Option<Journal>> {
        self.journals.find_by_ext_uid(organization_id, ext_uid).await
    }

    pub async fn find_by_period(&self, organization_id: Uuid, period_id: Uuid) -> LedgerResult<Vec<Journal>> {
        self.journals.find_by_period(organization_id, period_id).await
    }

    pub async fn find_by_date_range(&self, organization_id: Uuid, from_date: NaiveDate, to_date: NaiveDate) -> LedgerResult<Vec<Journal>> {
        self.journals.find_by_date_range(organization_id, from_date, to_date).await
    }

    /// Revalidates a journal intended for bulk import without persisting
    /// it: the same checks as `create_draft`, minus the repository writes.
    pub async fn validate_for_import(&self, organization_id: Uuid, period_id: Uuid, posting_date: NaiveDate, journal: &Journal) -> LedgerResult<()> {
        let period = self.periods.validate_period_for_posting(organization_id, period_id).await?;
        if !period.contains(posting_date) {
            return Err(LedgerError::validation("posting_date must fall within the period's interval"));
        }
        journal.validate_invariants()
    }

    /// Next free number in the series `"{prefix}-NNN"`, zero-padded to at
    /// least 3 digits. Defaults `prefix` to `JRN-{current_year}`.
    pub async fn get_next_journal_number(&self, organization_id: Uuid, prefix: Option<&str>, current_year: i32) -> LedgerResult<String> {
        let default_prefix = format!("JRN-{current_year}");
        let prefix = prefix.unwrap_or(&default_prefix);
        self.journals.get_next_journal_number(organization_id, Some(prefix)).await
    }

    async fn load(&self, organization_id: Uuid, id: Uuid) -> LedgerResult<Journal> {
        self.journals
            .find_by_id(organization_id, id)
            .await?
            .ok_or_else(|| LedgerError::EntityNotFound {
                entity: "journal",
                id: id.to_string(),
            })
    }
}
