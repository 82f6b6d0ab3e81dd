//! Posting and reversal: the only operations that seal a journal into the
//! hash chain.

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::error::{LedgerError, LedgerResult};
use crate::domain::journal::Journal;
use crate::domain::repositories::{JournalRepository, PeriodRepository};

use super::hash_service::HashService;
use super::period_service::PeriodService;

pub struct PostingService<JR: JournalRepository, PR: PeriodRepository> {
    journals: Arc<JR>,
    periods: PeriodService<PR>,
    hashes: HashService<JR>,
}

impl<JR: JournalRepository, PR: PeriodRepository> PostingService<JR, PR> {
    pub fn new(journals: Arc<JR>, periods: Arc<PR>) -> Self {
        Self {
            journals: journals.clone(),
            periods: PeriodService::new(periods),
            hashes: HashService::new(journals),
        }
    }

    /// Seals a draft journal into the organization's hash chain. See spec
    /// §4.4 step 1-8: revalidate, reverify uniqueness, require an open
    /// period, chain onto the current head, and persist.
    pub async fn post(&self, organization_id: Uuid, journal_id: Uuid, posted_by: impl Into<String>, now: DateTime<Utc>) -> LedgerResult<Journal> {
        let mut journal = self.load(organization_id, journal_id).await?;
        if !journal.is_draft() {
            return Err(LedgerError::business_rule("only draft journals may be posted"));
        }
        journal.validate_invariants()?;

        if self.journals.exists_by_journal_number(organization_id, journal.journal_number()).await?
            && self.journals.find_by_journal_number(organization_id, journal.journal_number()).await?.map(|j| j.id()) != Some(journal.id())
        {
            return Err(LedgerError::business_rule("journal_number already exists").with_details("journal_number", journal.journal_number()));
        }
        if let Some(uid) = journal.ext_uid() {
            if self.journals.exists_by_ext_uid(organization_id, uid).await?
                && self.journals.find_by_ext_uid(organization_id, uid).await?.map(|j| j.id()) != Some(journal.id())
            {
                return Err(LedgerError::business_rule("ext_uid already exists").with_details("ext_uid", uid));
            }
        }

        self.periods.validate_period_for_posting(organization_id, journal.period_id()).await?;

        let hash_prev = self.hashes.get_previous_hash(organization_id).await?;
        journal.post(hash_prev, posted_by, now)?;
        self.journals.save(&journal).await?;
        info!(%organization_id, journal_id = %journal.id(), "journal posted");
        Ok(journal)
    }

    /// Builds and posts the mirror journal, then marks the original as
    /// reversed. Both writes happen through `save_multiple` so callers
    /// backed by a transactional repository commit them atomically.
    pub async fn reverse(
        &self,
        organization_id: Uuid,
        original_id: Uuid,
        description: impl Into<String>,
        reversal_date: NaiveDate,
        by: impl Into<String>,
        now: DateTime<Utc>,
    ) -> LedgerResult<Journal> {
        let mut original = self.load(organization_id, original_id).await?;
        if original.status() != crate::domain::journal::JournalStatus::Posted {
            return Err(LedgerError::business_rule("only a posted journal may be reversed"));
        }
        if original.reversal_journal_id().is_some() {
            return Err(LedgerError::business_rule("journal has already been reversed"));
        }

        let reversal_period = self
            .periods
            .find_period_for_posting(organization_id, reversal_date)
            .await?;
        reversal_period.validate_for_posting()?;

        let by = by.into();
        let mut mirror = original.build_reversal_draft(reversal_period.id(), description, reversal_date, by.clone(), now)?;

        let hash_prev = self.hashes.get_previous_hash(organization_id).await?;
        mirror.post(hash_prev, by, now)?;
        original.mark_reversed(mirror.id(), now)?;

        self.journals.save_multiple(&[original, mirror.clone()]).await?;
        info!(%organization_id, original_journal_id = %original_id, reversal_journal_id = %mirror.id(), "journal reversed");
        Ok(mirror)
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
