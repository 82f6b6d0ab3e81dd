//! In-memory, tenant-partitioned reference implementations of the
//! repository traits. Suitable for tests and for embedding the core in a
//! host that does not yet have a database wired up; not a substitute for
//! the `persistence` feature's Postgres-backed implementation under
//! concurrent writers, since it serializes all access behind a single
//! `RwLock` rather than per-organization locking.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::error::LedgerResult;
use crate::domain::journal::Journal;
use crate::domain::period::Period;
use crate::domain::repositories::{JournalRepository, PeriodRepository};

#[derive(Default)]
pub struct InMemoryPeriodRepository {
    by_org: RwLock<HashMap<Uuid, Vec<Period>>>,
}

impl InMemoryPeriodRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PeriodRepository for InMemoryPeriodRepository {
    async fn find_by_id(&self, organization_id: Uuid, id: Uuid) -> LedgerResult<Option<Period>> {
        let store = self.by_org.read().await;
        Ok(store.get(&organization_id).and_then(|periods| periods.iter().find(|p| p.id() == id).cloned()))
    }

    async fn find_by_organization(&self, organization_id: Uuid) -> LedgerResult<Vec<Period>> {
        let store = self.by_org.read().await;
        Ok(store.get(&organization_id).cloned().unwrap_or_default())
    }

    async fn find_by_date(&self, organization_id: Uuid, date: NaiveDate) -> LedgerResult<Option<Period>> {
        let store = self.by_org.read().await;
        Ok(store.get(&organization_id).and_then(|periods| periods.iter().find(|p| p.contains(date)).cloned()))
    }

    async fn find_open_periods(&self, organization_id: Uuid) -> LedgerResult<Vec<Period>> {
        let store = self.by_org.read().await;
        Ok(store.get(&organization_id).map(|periods| periods.iter().filter(|p| p.is_open()).cloned().collect()).unwrap_or_default())
    }

    async fn find_overlapping_periods(&self, organization_id: Uuid, start: NaiveDate, end: NaiveDate, exclude_id: Option<Uuid>) -> LedgerResult<Vec<Period>> {
        let store = self.by_org.read().await;
        Ok(store
            .get(&organization_id)
            .map(|periods| {
                periods
                    .iter()
                    .filter(|p| Some(p.id()) != exclude_id && p.overlaps(start, end))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn save(&self, period: &Period) -> LedgerResult<()> {
        let mut store = self.by_org.write().await;
        let periods = store.entry(period.organization_id()).or_default();
        if let Some(existing) = periods.iter_mut().find(|p| p.id() == period.id()) {
            *existing = period.clone();
        } else {
            periods.push(period.clone());
        }
        drop(store);
        Ok(())
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> LedgerResult<()> {
        let mut store = self.by_org.write().await;
        if let Some(periods) = store.get_mut(&organization_id) {
            periods.retain(|p| p.id() != id);
        }
        drop(store);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryJournalRepository {
    by_org: RwLock<HashMap<Uuid, Vec<Journal>>>,
}

impl InMemoryJournalRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JournalRepository for InMemoryJournalRepository {
    async fn find_by_id(&self, organization_id: Uuid, id: Uuid) -> LedgerResult<Option<Journal>> {
        let store = self.by_org.read().await;
        Ok(store.get(&organization_id).and_then(|js| js.iter().find(|j| j.id() == id).cloned()))
    }

    async fn find_by_ext_uid(&self, organization_id: Uuid, ext_uid: &str) -> LedgerResult<Option<Journal>> {
        let store = self.by_org.read().await;
        Ok(store.get(&organization_id).and_then(|js| js.iter().find(|j| j.ext_uid() == Some(ext_uid)).cloned()))
    }

    async fn find_by_journal_number(&self, organization_id: Uuid, journal_number: &str) -> LedgerResult<Option<Journal>> {
        let store = self.by_org.read().await;
        Ok(store.get(&organization_id).and_then(|js| js.iter().find(|j| j.journal_number() == journal_number).cloned()))
    }

    async fn find_by_period(&self, organization_id: Uuid, period_id: Uuid) -> LedgerResult<Vec<Journal>> {
        let store = self.by_org.read().await;
        Ok(store.get(&organization_id).map(|js| js.iter().filter(|j| j.period_id() == period_id).cloned().collect()).unwrap_or_default())
    }

    async fn find_posted_journals_chronological(&self, organization_id: Uuid, limit: Option<usize>) -> LedgerResult<Vec<Journal>> {
        let store = self.by_org.read().await;
        let mut journals: Vec<Journal> = store
            .get(&organization_id)
            .map(|js| {
                js.iter()
                    .filter(|j| j.posted_at().is_some())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        drop(store);
        journals.sort_by(|a, b| a.posted_at().cmp(&b.posted_at()).then_with(|| a.journal_number().cmp(b.journal_number())));
        if let Some(limit) = limit {
            journals.truncate(limit);
        }
        Ok(journals)
    }

    async fn find_last_posted_journal(&self, organization_id: Uuid) -> LedgerResult<Option<Journal>> {
        Ok(self.find_posted_journals_chronological(organization_id, None).await?.into_iter().next_back())
    }

    async fn find_draft_journals_by_period(&self, organization_id: Uuid, period_id: Uuid) -> LedgerResult<Vec<Journal>> {
        let store = self.by_org.read().await;
        Ok(store
            .get(&organization_id)
            .map(|js| js.iter().filter(|j| j.period_id() == period_id && j.is_draft()).cloned().collect())
            .unwrap_or_default())
    }

    async fn find_by_date_range(&self, organization_id: Uuid, from_date: NaiveDate, to_date: NaiveDate) -> LedgerResult<Vec<Journal>> {
        let store = self.by_org.read().await;
        Ok(store
            .get(&organization_id)
            .map(|js| js.iter().filter(|j| j.posting_date() >= from_date && j.posting_date() <= to_date).cloned().collect())
            .unwrap_or_default())
    }

    async fn exists_by_journal_number(&self, organization_id: Uuid, journal_number: &str) -> LedgerResult<bool> {
        Ok(self.find_by_journal_number(organization_id, journal_number).await?.is_some())
    }

    async fn exists_by_ext_uid(&self, organization_id: Uuid, ext_uid: &str) -> LedgerResult<bool> {
        Ok(self.find_by_ext_uid(organization_id, ext_uid).await?.is_some())
    }

    async fn count_draft_journals_in_period(&self, organization_id: Uuid, period_id: Uuid) -> LedgerResult<u64> {
        Ok(self.find_draft_journals_by_period(organization_id, period_id).await?.len() as u64)
    }

    async fn save(&self, journal: &Journal) -> LedgerResult<()> {
        let mut store = self.by_org.write().await;
        let journals = store.entry(journal.organization_id()).or_default();
        if let Some(existing) = journals.iter_mut().find(|j| j.id() == journal.id()) {
            *existing = journal.clone();
        } else {
            journals.push(journal.clone());
        }
        drop(store);
        Ok(())
    }

    async fn save_multiple(&self, journals: &[Journal]) -> LedgerResult<()> {
        for journal in journals {
            self.save(journal).await?;
        }
        Ok(())
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> LedgerResult<()> {
        let mut store = self.by_org.write().await;
        if let Some(journals) = store.get_mut(&organization_id) {
            journals.retain(|j| j.id() != id);
        }
        drop(store);
        Ok(())
    }

    async fn get_next_journal_number(&self, organization_id: Uuid, prefix: Option<&str>) -> LedgerResult<String> {
        let prefix = prefix.unwrap_or("JRN");
        let store = self.by_org.read().await;
        let count = store
            .get(&organization_id)
            .map_or(0, |js| js.iter().filter(|j| j.journal_number().starts_with(prefix)).count());
        drop(store);
        Ok(format!("{prefix}-{:03}", count + 1))
    }
}

pub fn in_memory_period_repository() -> Arc<InMemoryPeriodRepository> {
    Arc::new(InMemoryPeriodRepository::new())
}

pub fn in_memory_journal_repository() -> Arc<InMemoryJournalRepository> {
    Arc::new(InMemoryJournalRepository::new())
}
