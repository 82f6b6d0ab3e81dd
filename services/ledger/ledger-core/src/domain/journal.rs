//! The journal aggregate root: an immutable-once-posted double-entry
//! transaction.

use chrono::{DateTime, NaiveDate, Utc};
use ledger_primitives::{Amount, CurrencyCode, JournalHash, Money};
use uuid::Uuid;

use crate::domain::error::{LedgerError, LedgerResult};
use crate::domain::journal_line::JournalLine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalStatus {
    Draft,
    Posted,
    Reversed,
}

impl JournalStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Posted => "posted",
            Self::Reversed => "reversed",
        }
    }

    pub fn parse(s: &str) -> LedgerResult<Self> {
        match s {
            "draft" => Ok(Self::Draft),
            "posted" => Ok(Self::Posted),
            "reversed" => Ok(Self::Reversed),
            other => Err(LedgerError::Infrastructure(format!("unknown journal status {other:?}"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Journal {
    id: Uuid,
    organization_id: Uuid,
    period_id: Uuid,
    journal_number: String,
    description: String,
    reference: Option<String>,
    posting_date: NaiveDate,
    status: JournalStatus,
    currency: CurrencyCode,
    lines: Vec<JournalLine>,
    hash_prev: Option<JournalHash>,
    hash_self: Option<JournalHash>,
    reversal_journal_id: Option<Uuid>,
    original_journal_id: Option<Uuid>,
    ext_uid: Option<String>,
    created_by: String,
    posted_by: Option<String>,
    posted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Journal {
    /// Rehydrates a `Journal` from storage without rerunning the creation
    /// invariants: they were already enforced when the row was written.
    #[allow(clippy::too_many_arguments)]
    pub const fn from_persisted(
        id: Uuid,
        organization_id: Uuid,
        period_id: Uuid,
        journal_number: String,
        description: String,
        reference: Option<String>,
        posting_date: NaiveDate,
        status: JournalStatus,
        currency: CurrencyCode,
        lines: Vec<JournalLine>,
        hash_prev: Option<JournalHash>,
        hash_self: Option<JournalHash>,
        reversal_journal_id: Option<Uuid>,
        original_journal_id: Option<Uuid>,
        ext_uid: Option<String>,
        created_by: String,
        posted_by: Option<String>,
        posted_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            organization_id,
            period_id,
            journal_number,
            description,
            reference,
            posting_date,
            status,
            currency,
            lines,
            hash_prev,
            hash_self,
            reversal_journal_id,
            original_journal_id,
            ext_uid,
            created_by,
            posted_by,
            posted_at,
            created_at,
            updated_at,
        }
    }

    /// Builds a new draft journal, validating every static invariant that
    /// does not require repository access (balance, line currency,
    /// contiguous line numbers, non-empty description). Period openness and
    /// number/ext-uid uniqueness are the caller's (`JournalService`)
    /// responsibility, since they require the repository.
    #[allow(clippy::too_many_arguments)]
    pub fn create_draft(
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
    ) -> LedgerResult<Self> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(LedgerError::validation("journal description must not be empty"));
        }

        let journal = Self {
            id: Uuid::new_v4(),
            organization_id,
            period_id,
            journal_number: journal_number.into(),
            description,
            reference,
            posting_date,
            status: JournalStatus::Draft,
            currency,
            lines,
            hash_prev: None,
            hash_self: None,
            reversal_journal_id: None,
            original_journal_id: None,
            ext_uid,
            created_by: created_by.into(),
            posted_by: None,
            posted_at: None,
            created_at: now,
            updated_at: now,
        };
        journal.validate_invariants()?;
        Ok(journal)
    }

    /// Revalidates the invariants that must hold for any accepted journal:
    /// balance, contiguous line numbers, and (implicitly, via `JournalLine`
    /// construction) same-currency lines and exchange tolerance.
    pub fn validate_invariants(&self) -> LedgerResult<()> {
        if self.lines.is_empty() {
            return Err(LedgerError::validation("journal must have at least one line"));
        }

        let mut numbers: Vec<u32> = self.lines.iter().map(JournalLine::line_number).collect();
        numbers.sort_unstable();
        let expected: Vec<u32> = (1..=numbers.len() as u32).collect();
        if numbers != expected {
            return Err(LedgerError::validation(
                "line numbers must form the contiguous sequence 1..N",
            ));
        }

        let (total_debit, total_credit) = self.totals()?;
        if total_debit != total_credit {
            return Err(LedgerError::unbalanced_journal(total_debit.to_string(), total_credit.to_string()));
        }

        Ok(())
    }

    pub fn totals(&self) -> LedgerResult<(Money, Money)> {
        let mut debit = Money::zero(self.currency);
        let mut credit = Money::zero(self.currency);
        for line in &self.lines {
            debit = debit
                .add(&line.debit_amount())
                .map_err(|e| LedgerError::validation(e.to_string()))?;
            credit = credit
                .add(&line.credit_amount())
                .map_err(|e| LedgerError::validation(e.to_string()))?;
        }
        Ok((debit, credit))
    }

    pub const fn id(&self) -> Uuid {
        self.id
    }

    pub const fn organization_id(&self) -> Uuid {
        self.organization_id
    }

    pub const fn period_id(&self) -> Uuid {
        self.period_id
    }

    pub fn journal_number(&self) -> &str {
        &self.journal_number
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub const fn posting_date(&self) -> NaiveDate {
        self.posting_date
    }

    pub const fn status(&self) -> JournalStatus {
        self.status
    }

    pub const fn currency(&self) -> CurrencyCode {
        self.currency
    }

    pub fn lines(&self) -> &[JournalLine] {
        &self.lines
    }

    pub const fn hash_prev(&self) -> Option<&JournalHash> {
        self.hash_prev.as_ref()
    }

    pub const fn hash_self(&self) -> Option<&JournalHash> {
        self.hash_self.as_ref()
    }

    pub const fn reversal_journal_id(&self) -> Option<Uuid> {
        self.reversal_journal_id
    }

    pub const fn original_journal_id(&self) -> Option<Uuid> {
        self.original_journal_id
    }

    pub fn ext_uid(&self) -> Option<&str> {
        self.ext_uid.as_deref()
    }

    pub const fn posted_at(&self) -> Option<DateTime<Utc>> {
        self.posted_at
    }

    pub fn posted_by(&self) -> Option<&str> {
        self.posted_by.as_deref()
    }

    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_draft(&self) -> bool {
        self.status == JournalStatus::Draft
    }

    /// The deterministic byte sequence hashed into the chain, per the
    /// colon/semicolon/pipe-joined layout fixed by the chain format.
    pub fn serialize_for_hash(&self) -> LedgerResult<String> {
        let (total_debit, total_credit) = self.totals()?;
        let mut sorted_lines = self.lines.clone();
        sorted_lines.sort_by_key(JournalLine::line_number);

        let lines_serialization = sorted_lines
            .iter()
            .map(|line| {
                let (original_debit, original_credit) = if line.is_debit() {
                    (line.original_amount().amount(), Amount::zero())
                } else {
                    (Amount::zero(), line.original_amount().amount())
                };
                format!(
                    "{}|{}|{}|{}|{}|{}|{}|{}|{:.6}|{}|{}|{}",
                    line.account_id(),
                    line.line_number(),
                    line.description(),
                    line.debit_amount().amount(),
                    line.credit_amount().amount(),
                    line.original_amount().currency(),
                    original_debit,
                    original_credit,
                    line.exchange_rate(),
                    line.tax_code().unwrap_or(""),
                    line.tax_amount().map_or_else(|| "0.0000".to_string(), |a| a.to_string()),
                    line.tax_rate().map_or_else(|| "0.0000".to_string(), |r| format!("{r:.4}")),
                )
            })
            .collect::<Vec<_>>()
            .join(";");

        Ok(format!(
            "{}:{}:{}:{}:{}:{}:{}:{}:{}:{}:{}",
            self.organization_id,
            self.period_id,
            self.journal_number,
            self.description,
            self.reference.as_deref().unwrap_or(""),
            self.posting_date.format("%Y-%m-%d"),
            total_debit.amount(),
            total_credit.amount(),
            self.currency,
            self.hash_prev.map(|h| h.to_hex()).unwrap_or_default(),
            lines_serialization,
        ))
    }

    /// Seals the journal: validates, computes `hash_self`, and transitions
    /// to `posted`. The caller supplies `hash_prev` (the current chain head
    /// for the organization) and the current time.
    pub fn post(&mut self, hash_prev: Option<JournalHash>, posted_by: impl Into<String>, now: DateTime<Utc>) -> LedgerResult<()> {
        if !self.is_draft() {
            return Err(LedgerError::JournalAlreadyPosted { journal_id: self.id });
        }
        self.validate_invariants()?;

        self.hash_prev = hash_prev;
        let payload = self.serialize_for_hash()?;
        self.hash_self = Some(JournalHash::compute(payload.as_bytes(), hash_prev.as_ref()));
        self.status = JournalStatus::Posted;
        self.posted_by = Some(posted_by.into());
        self.posted_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Recomputes the hash from the current field values and compares it to
    /// the sealed `hash_self`. A mismatch means the journal was tampered
    /// with after posting.
    pub fn verify(&self) -> LedgerResult<bool> {
        let Some(expected) = self.hash_self else {
            return Err(LedgerError::validation("journal has not been posted"));
        };
        let payload = self.serialize_for_hash()?;
        let recomputed = JournalHash::compute(payload.as_bytes(), self.hash_prev.as_ref());
        Ok(recomputed == expected)
    }

    /// Builds the mirror draft for a reversal: swapped lines, linked id,
    /// derived journal number/reference. The caller (`PostingService`) then
    /// posts this draft through the normal pipeline.
    pub fn build_reversal_draft(
        &self,
        reversal_period_id: Uuid,
        description: impl Into<String>,
        reversal_date: NaiveDate,
        created_by: impl Into<String>,
        now: DateTime<Utc>,
    ) -> LedgerResult<Self> {
        if self.status != JournalStatus::Posted {
            return Err(LedgerError::business_rule("only a posted journal may be reversed"));
        }
        if self.reversal_journal_id.is_some() {
            return Err(LedgerError::business_rule("journal has already been reversed"));
        }
        if reversal_date < self.posting_date {
            return Err(LedgerError::validation("reversal date must not precede the original posting date"));
        }
        if (reversal_date - self.posting_date).num_days() > 365 {
            return Err(LedgerError::validation("reversal date must be within 365 days of the original posting"));
        }

        let reversed_lines: Vec<JournalLine> = self.lines.iter().map(JournalLine::reversed).collect();
        let reference = format!("REV-{}", self.reference.clone().unwrap_or_else(|| self.journal_number.clone()));

        Self::create_draft(
            self.organization_id,
            reversal_period_id,
            format!("{}-REV", self.journal_number),
            description,
            Some(reference),
            reversal_date,
            self.currency,
            reversed_lines,
            None,
            created_by,
            now,
        )
        .map(|mut mirror| {
            mirror.original_journal_id = Some(self.id);
            mirror
        })
    }

    /// Marks this (posted) journal as reversed, linking to its mirror. Per
    /// the sealed-hash design, `hash_self` is not recomputed: `status` and
    /// the linkage fields live outside the hashed payload.
    pub fn mark_reversed(&mut self, reversal_journal_id: Uuid, now: DateTime<Utc>) -> LedgerResult<()> {
        if self.status != JournalStatus::Posted {
            return Err(LedgerError::business_rule("only a posted journal may be marked reversed"));
        }
        self.status = JournalStatus::Reversed;
        self.reversal_journal_id = Some(reversal_journal_id);
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-15T12:00:00Z").unwrap().with_timezone(&Utc)
    }

    fn eur(v: &str) -> Money {
        Money::new(Amount::from_str_exact(v).unwrap(), CurrencyCode::EUR)
    }

    fn balanced_lines() -> Vec<JournalLine> {
        vec![
            JournalLine::new(1, "1000-cash", "cash receipt", eur("1500.00"), eur("0"), CurrencyCode::EUR, eur("1500.00"), dec!(1.0), None, None, None).unwrap(),
            JournalLine::new(2, "4000-revenue", "sale", eur("0"), eur("1500.00"), CurrencyCode::EUR, eur("1500.00"), dec!(1.0), None, None, None).unwrap(),
        ]
    }

    fn draft_journal() -> Journal {
        Journal::create_draft(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "JRN-2024-001",
            "Q2 cash sale",
            None,
            ymd(2024, 5, 15),
            CurrencyCode::EUR,
            balanced_lines(),
            None,
            "alice",
            now(),
        )
        .unwrap()
    }

    #[test]
    fn rejects_unbalanced_lines() {
        let lines = vec![
            JournalLine::new(1, "1000", "x", eur("100.00"), eur("0"), CurrencyCode::EUR, eur("100.00"), dec!(1.0), None, None, None).unwrap(),
            JournalLine::new(2, "4000", "y", eur("0"), eur("99.99"), CurrencyCode::EUR, eur("99.99"), dec!(1.0), None, None, None).unwrap(),
        ];
        let err = Journal::create_draft(Uuid::new_v4(), Uuid::new_v4(), "J1", "bad", None, ymd(2024, 5, 15), CurrencyCode::EUR, lines, None, "alice", now());
        assert!(matches!(err, Err(LedgerError::UnbalancedJournal { .. })));
    }

    #[test]
    fn rejects_non_contiguous_line_numbers() {
        let lines = vec![
            JournalLine::new(1, "1000", "x", eur("100.00"), eur("0"), CurrencyCode::EUR, eur("100.00"), dec!(1.0), None, None, None).unwrap(),
            JournalLine::new(3, "4000", "y", eur("0"), eur("100.00"), CurrencyCode::EUR, eur("100.00"), dec!(1.0), None, None, None).unwrap(),
        ];
        let err = Journal::create_draft(Uuid::new_v4(), Uuid::new_v4(), "J1", "bad", None, ymd(2024, 5, 15), CurrencyCode::EUR, lines, None, "alice", now());
        assert!(err.is_err());
    }

    #[test]
    fn post_seals_genesis_hash() {
        let mut j = draft_journal();
        j.post(None, "alice", now()).unwrap();
        assert_eq!(j.status(), JournalStatus::Posted);
        assert!(j.hash_prev().is_none());
        assert_eq!(j.hash_self().unwrap().to_hex().len(), 64);
    }

    #[test]
    fn post_twice_fails() {
        let mut j = draft_journal();
        j.post(None, "alice", now()).unwrap();
        assert!(j.post(None, "alice", now()).is_err());
    }

    #[test]
    fn verify_detects_tampering() {
        let mut j = draft_journal();
        j.post(None, "alice", now()).unwrap();
        assert!(j.verify().unwrap());
        j.description = "tampered".to_string();
        assert!(!j.verify().unwrap());
    }

    #[test]
    fn reversal_mirrors_lines_and_links_ids() {
        let mut original = draft_journal();
        original.post(None, "alice", now()).unwrap();

        let mirror = original
            .build_reversal_draft(Uuid::new_v4(), "Error correction", ymd(2024, 5, 20), "bob", now())
            .unwrap();

        assert_eq!(mirror.journal_number(), "JRN-2024-001-REV");
        assert_eq!(mirror.original_journal_id(), Some(original.id()));
        assert_eq!(mirror.lines()[0].debit_amount(), original.lines()[0].credit_amount());
        assert_eq!(mirror.lines()[0].credit_amount(), original.lines()[0].debit_amount());
    }

    #[test]
    fn reversal_rejects_date_before_original() {
        let mut original = draft_journal();
        original.post(None, "alice", now()).unwrap();
        let err = original.build_reversal_draft(Uuid::new_v4(), "bad", ymd(2024, 5, 1), "bob", now());
        assert!(err.is_err());
    }

    #[test]
    fn mark_reversed_keeps_sealed_hash_intact() {
        let mut original = draft_journal();
        original.post(None, "alice", now()).unwrap();
        let sealed = *original.hash_self().unwrap();
        original.mark_reversed(Uuid::new_v4(), now()).unwrap();
        assert_eq!(original.status(), JournalStatus::Reversed);
        assert_eq!(*original.hash_self().unwrap(), sealed);
    }
}
