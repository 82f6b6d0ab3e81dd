//! Hash-chain construction and verification, per organization.

use ledger_primitives::JournalHash;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::error::LedgerResult;
use crate::domain::journal::Journal;
use crate::domain::repositories::JournalRepository;

/// Result of walking an organization's chronological chain.
#[derive(Debug, Clone)]
pub struct ChainVerification {
    pub is_valid: bool,
    pub total_journals: usize,
    pub invalid_journals: Vec<Uuid>,
    pub broken_chain_at: Option<Uuid>,
}

pub struct HashService<R: JournalRepository> {
    journals: Arc<R>,
}

impl<R: JournalRepository> HashService<R> {
    pub const fn new(journals: Arc<R>) -> Self {
        Self { journals }
    }

    /// The current chain head for the organization, or `None` if nothing
    /// has been posted yet.
    pub async fn get_previous_hash(&self, organization_id: Uuid) -> LedgerResult<Option<JournalHash>> {
        let head = self.journals.find_last_posted_journal(organization_id).await?;
        Ok(head.and_then(|j| j.hash_self().copied()))
    }

    pub fn verify_journal(&self, journal: &Journal) -> LedgerResult<bool> {
        journal.verify()
    }

    /// Walks the chronological sequence (`posted_at` asc, `journal_number`
    /// asc) verifying each node's own hash and that `hash_prev` matches the
    /// sealed `hash_self` of its predecessor.
    pub async fn verify_organization_chain(&self, organization_id: Uuid) -> LedgerResult<ChainVerification> {
        let mut journals = self.journals.find_posted_journals_chronological(organization_id, None).await?;
        journals.sort_by(|a, b| {
            a.posted_at()
                .cmp(&b.posted_at())
                .then_with(|| a.journal_number().cmp(b.journal_number()))
        });

        let mut invalid_journals = Vec::new();
        let mut broken_chain_at = None;
        let mut expected_prev: Option<JournalHash> = None;

        for journal in &journals {
            let self_valid = journal.verify().unwrap_or(false);
            if !self_valid {
                invalid_journals.push(journal.id());
            }
            if broken_chain_at.is_none() && journal.hash_prev().copied() != expected_prev {
                broken_chain_at = Some(journal.id());
            }
            expected_prev = journal.hash_self().copied();
        }

        let is_valid = invalid_journals.is_empty() && broken_chain_at.is_none();
        Ok(ChainVerification {
            is_valid,
            total_journals: journals.len(),
            invalid_journals,
            broken_chain_at,
        })
    }
}
