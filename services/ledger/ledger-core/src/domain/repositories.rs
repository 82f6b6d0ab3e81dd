//! Persistence contracts for the two aggregates. Pure interfaces: no
//! implementation lives in the domain layer.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::error::LedgerResult;
use crate::domain::journal::Journal;
use crate::domain::period::Period;

/// Persistence for the period aggregate. Every method is implicitly
/// scoped to a single organization via its `organization_id` argument.
#[async_trait]
pub trait PeriodRepository: Send + Sync {
    async fn find_by_id(&self, organization_id: Uuid, id: Uuid) -> LedgerResult<Option<Period>>;

    async fn find_by_organization(&self, organization_id: Uuid) -> LedgerResult<Vec<Period>>;

    async fn find_by_date(&self, organization_id: Uuid, date: NaiveDate) -> LedgerResult<Option<Period>>;

    async fn find_open_periods(&self, organization_id: Uuid) -> LedgerResult<Vec<Period>>;

    /// Periods overlapping `[start, end]`, excluding `exclude_id` (the
    /// period being edited, if any) so an update does not collide with
    /// itself.
    async fn find_overlapping_periods(
        &self,
        organization_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        exclude_id: Option<Uuid>,
    ) -> LedgerResult<Vec<Period>>;

    async fn save(&self, period: &Period) -> LedgerResult<()>;

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> LedgerResult<()>;
}

/// Persistence for the journal aggregate. Every method is implicitly
/// scoped to a single organization via its `organization_id` argument.
#[async_trait]
pub trait JournalRepository: Send + Sync {
    async fn find_by_id(&self, organization_id: Uuid, id: Uuid) -> LedgerResult<Option<Journal>>;

    async fn find_by_ext_uid(&self, organization_id: Uuid, ext_uid: &str) -> LedgerResult<Option<Journal>>;

    async fn find_by_journal_number(&self, organization_id: Uuid, journal_number: &str) -> LedgerResult<Option<Journal>>;

    async fn find_by_period(&self, organization_id: Uuid, period_id: Uuid) -> LedgerResult<Vec<Journal>>;

    /// Posted journals in hash-chain order: `posted_at` ascending, then
    /// `journal_number` ascending as a tiebreaker.
    async fn find_posted_journals_chronological(&self, organization_id: Uuid, limit: Option<usize>) -> LedgerResult<Vec<Journal>>;

    /// The most recently posted journal for the organization, i.e. the
    /// current head of its hash chain.
    async fn find_last_posted_journal(&self, organization_id: Uuid) -> LedgerResult<Option<Journal>>;

    async fn find_draft_journals_by_period(&self, organization_id: Uuid, period_id: Uuid) -> LedgerResult<Vec<Journal>>;

    async fn find_by_date_range(&self, organization_id: Uuid, from_date: NaiveDate, to_date: NaiveDate) -> LedgerResult<Vec<Journal>>;

    async fn exists_by_journal_number(&self, organization_id: Uuid, journal_number: &str) -> LedgerResult<bool>;

    async fn exists_by_ext_uid(&self, organization_id: Uuid, ext_uid: &str) -> LedgerResult<bool>;

    async fn count_draft_journals_in_period(&self, organization_id: Uuid, period_id: Uuid) -> LedgerResult<u64>;

    async fn save(&self, journal: &Journal) -> LedgerResult<()>;

    async fn save_multiple(&self, journals: &[Journal]) -> LedgerResult<()>;

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> LedgerResult<()>;

    /// The next free journal number for the organization, optionally
    /// scoped to a numbering sequence identified by `prefix`.
    async fn get_next_journal_number(&self, organization_id: Uuid, prefix: Option<&str>) -> LedgerResult<String>;
}
