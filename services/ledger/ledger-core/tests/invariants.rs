//! Property-based tests for the universal invariants: balanced bookings,
//! same-currency lines, contiguous line numbers, posting date within the
//! period, no period overlap, hash-chain integrity, tampering detection,
//! idempotence of verification, reversal mirroring, tenant isolation,
//! exchange-rate tolerance, and decimal rounding.

use chrono::{DateTime, NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use ledger_core::application::{HashService, JournalService, PeriodService, PostingService};
use ledger_core::domain::journal::JournalStatus;
use ledger_core::domain::journal_line::JournalLine;
use ledger_core::domain::period::Period;
use ledger_core::domain::repositories::JournalRepository;
use ledger_core::infrastructure::memory::{in_memory_journal_repository, in_memory_period_repository};
use ledger_primitives::{Amount, CurrencyCode, Money};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-05-15T09:00:00Z").unwrap().with_timezone(&Utc)
}

fn eur(cents: i64) -> Money {
    Money::new(Amount::new(Decimal::new(cents, 2)).unwrap(), CurrencyCode::EUR)
}

/// Builds `n` balanced lines: one debit carrying the whole amount, split
/// across `n - 1` credit lines (plus a remainder line so the split is
/// exact), all at a 1:1 exchange rate.
fn balanced_lines(total_cents: i64, splits: &[i64]) -> Vec<JournalLine> {
    let mut lines = Vec::new();
    lines.push(
        JournalLine::new(1, "1000-cash", "debit", eur(total_cents), eur(0), CurrencyCode::EUR, eur(total_cents), dec!(1.0), None, None, None)
            .unwrap(),
    );
    let mut remaining = total_cents;
    let mut line_number = 2;
    for &split in splits {
        let amount = split.min(remaining.max(0));
        if amount == 0 {
            continue;
        }
        lines.push(
            JournalLine::new(line_number, "4000-revenue", "credit", eur(0), eur(amount), CurrencyCode::EUR, eur(amount), dec!(1.0), None, None, None)
                .unwrap(),
        );
        remaining -= amount;
        line_number += 1;
    }
    if remaining != 0 {
        lines.push(
            JournalLine::new(line_number, "4000-revenue", "credit remainder", eur(0), eur(remaining), CurrencyCode::EUR, eur(remaining), dec!(1.0), None, None, None)
                .unwrap(),
        );
    }
    lines
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, ..ProptestConfig::default() })]

    /// Invariants 1-3: any journal accepted by `create_draft` balances,
    /// keeps every line in the journal's currency, and numbers its lines
    /// as the contiguous sequence `1..N`.
    #[test]
    fn accepted_journals_balance_and_number_contiguously(
        total_cents in 1i64..1_000_000,
        split_a in 1i64..500_000,
        split_b in 1i64..500_000,
    ) {
        let lines = balanced_lines(total_cents, &[split_a, split_b]);
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let periods = in_memory_period_repository();
            let journals = in_memory_journal_repository();
            let period_service = PeriodService::new(periods.clone());
            let journal_service = JournalService::new(journals.clone(), periods.clone());

            let org = Uuid::new_v4();
            let period = period_service
                .create_period(org, "2024-Q2", ymd(2024, 4, 1), ymd(2024, 6, 30), now())
                .await
                .unwrap();

            let draft = journal_service
                .create_draft(org, period.id(), "JRN-0001", "balanced", None, ymd(2024, 5, 15), CurrencyCode::EUR, lines, None, "alice", now())
                .await
                .unwrap();

            let (debit, credit) = draft.totals().unwrap();
            prop_assert_eq!(debit, credit);
            for line in draft.lines() {
                prop_assert_eq!(line.debit_amount().currency(), draft.currency());
                prop_assert_eq!(line.credit_amount().currency(), draft.currency());
            }
            let mut numbers: Vec<u32> = draft.lines().iter().map(JournalLine::line_number).collect();
            numbers.sort_unstable();
            let expected: Vec<u32> = (1..=numbers.len() as u32).collect();
            prop_assert_eq!(numbers, expected);
            Ok(())
        })?;
    }

    /// Invariant 4: posting dates outside the chosen period are rejected;
    /// inside are accepted.
    #[test]
    fn posting_date_must_fall_within_the_period(offset_days in -30i64..30) {
        let start = ymd(2024, 4, 1);
        let end = ymd(2024, 6, 30);
        let period = Period::create(Uuid::new_v4(), "2024-Q2", start, end, now()).unwrap();
        let date = start + chrono::Duration::days(offset_days);
        let within = start <= date && date <= end;
        prop_assert_eq!(period.contains(date), within);
    }

    /// Invariant 5: two periods of the same org either are disjoint or are
    /// detected as overlapping — never both.
    #[test]
    fn overlap_detection_is_exact(
        a_start in 0i64..365,
        a_len in 1i64..90,
        b_start in 0i64..365,
        b_len in 1i64..90,
    ) {
        let base = ymd(2024, 1, 1);
        let a0 = base + chrono::Duration::days(a_start);
        let a1 = a0 + chrono::Duration::days(a_len);
        let b0 = base + chrono::Duration::days(b_start);
        let b1 = b0 + chrono::Duration::days(b_len);

        let period = Period::create(Uuid::new_v4(), "A", a0, a1, now()).unwrap();
        let disjoint = a1 < b0 || b1 < a0;
        prop_assert_eq!(period.overlaps(b0, b1), !disjoint);
    }

    /// Invariant 11: `JournalLine::new` accepts a booking amount within
    /// 0.0001 of `original_amount * exchange_rate` and rejects anything
    /// further off.
    #[test]
    fn exchange_rate_tolerance_is_enforced(
        original_cents in 1i64..1_000_000,
        rate_hundredths in 50i64..200,
        drift_hundredths in -50i64..50,
    ) {
        let original = Decimal::new(original_cents, 2);
        let rate = Decimal::new(rate_hundredths, 2);
        let converted = Amount::new(original * rate).unwrap();
        let drift = Decimal::new(drift_hundredths, 4);
        let booked = Amount::new(converted.inner() + drift).unwrap();

        let result = JournalLine::new(
            1,
            "1000-cash",
            "fx",
            Money::new(booked, CurrencyCode::EUR),
            eur(0),
            CurrencyCode::EUR,
            Money::new(Amount::new(original).unwrap(), CurrencyCode::EUR),
            rate,
            None,
            None,
            None,
        );

        let within_tolerance = (converted.inner() - booked.inner()).abs() <= Decimal::new(1, 4);
        prop_assert_eq!(result.is_ok(), within_tolerance);
    }

    /// Invariant 12: every `Amount`'s canonical rendering carries exactly 4
    /// fractional digits, and the rounding matches round-half-to-even at
    /// that scale regardless of how many digits the input carried.
    #[test]
    fn amounts_always_round_to_scale_four(whole in 0i64..1_000_000, micros in 0i64..1_000_000) {
        let value = Decimal::new(whole, 0) + Decimal::new(micros, 6);
        let amount = Amount::new(value).unwrap();
        let rendered = amount.to_fixed_string();
        let fractional_digits = rendered.split('.').nth(1).unwrap().len();
        prop_assert_eq!(fractional_digits, 4);

        let expected = value.round_dp_with_strategy(4, rust_decimal::RoundingStrategy::MidpointNearestEven);
        prop_assert_eq!(amount.inner(), expected);
    }
}

/// Invariant 6 & 8: the hash chain stays valid across several posted
/// journals, and repeated verification calls agree.
#[tokio::test]
async fn hash_chain_integrity_and_verification_idempotence() {
    let periods = in_memory_period_repository();
    let journals = in_memory_journal_repository();
    let period_service = PeriodService::new(periods.clone());
    let journal_service = JournalService::new(journals.clone(), periods.clone());
    let posting_service = PostingService::new(journals.clone(), periods.clone());
    let hash_service = HashService::new(journals.clone());

    let org = Uuid::new_v4();
    let period = period_service.create_period(org, "2024-Q2", ymd(2024, 4, 1), ymd(2024, 6, 30), now()).await.unwrap();

    for i in 0..5 {
        let lines = balanced_lines(10_000 + i * 37, &[3_000, 2_000]);
        let draft = journal_service
            .create_draft(org, period.id(), format!("JRN-{i:04}"), "seq", None, ymd(2024, 5, 15), CurrencyCode::EUR, lines, None, "alice", now())
            .await
            .unwrap();
        posting_service.post(org, draft.id(), "alice", now()).await.unwrap();
    }

    let first = hash_service.verify_organization_chain(org).await.unwrap();
    let second = hash_service.verify_organization_chain(org).await.unwrap();
    assert!(first.is_valid);
    assert_eq!(first.total_journals, 5);
    assert_eq!(first.is_valid, second.is_valid);
    assert_eq!(first.total_journals, second.total_journals);
    assert_eq!(first.invalid_journals, second.invalid_journals);
    assert_eq!(first.broken_chain_at, second.broken_chain_at);

    let posted = journal_service.find_by_period(org, period.id()).await.unwrap();
    let mut chained: Vec<_> = posted.into_iter().collect();
    chained.sort_by_key(|j| j.journal_number().to_string());
    for (i, journal) in chained.iter().enumerate() {
        if i == 0 {
            assert!(journal.hash_prev().is_none());
        } else {
            assert_eq!(journal.hash_prev(), chained[i - 1].hash_self());
        }
    }
}

/// Invariant 9: reversing a posted journal mirrors every line and links
/// both journals correctly.
#[tokio::test]
async fn reversal_mirrors_every_line() {
    let periods = in_memory_period_repository();
    let journals = in_memory_journal_repository();
    let period_service = PeriodService::new(periods.clone());
    let journal_service = JournalService::new(journals.clone(), periods.clone());
    let posting_service = PostingService::new(journals.clone(), periods.clone());

    let org = Uuid::new_v4();
    let period = period_service.create_period(org, "2024-Q2", ymd(2024, 4, 1), ymd(2024, 6, 30), now()).await.unwrap();
    let lines = balanced_lines(54_321, &[10_000, 20_000]);
    let draft = journal_service
        .create_draft(org, period.id(), "JRN-0001", "orig", None, ymd(2024, 5, 15), CurrencyCode::EUR, lines, None, "alice", now())
        .await
        .unwrap();
    let posted = posting_service.post(org, draft.id(), "alice", now()).await.unwrap();

    let reversal = posting_service
        .reverse(org, posted.id(), "correction", ymd(2024, 5, 20), "bob", now())
        .await
        .unwrap();

    let mut original_lines = posted.lines().to_vec();
    original_lines.sort_by_key(JournalLine::line_number);
    let mut reversal_lines = reversal.lines().to_vec();
    reversal_lines.sort_by_key(JournalLine::line_number);

    for (original, mirrored) in original_lines.iter().zip(reversal_lines.iter()) {
        assert_eq!(mirrored.debit_amount(), original.credit_amount());
        assert_eq!(mirrored.credit_amount(), original.debit_amount());
    }
    let (original_debit, original_credit) = posted.totals().unwrap();
    let (reversal_debit, reversal_credit) = reversal.totals().unwrap();
    assert_eq!(reversal_debit, original_credit);
    assert_eq!(reversal_credit, original_debit);
    assert_eq!(reversal.currency(), posted.currency());

    let original_reloaded = journal_service.find_by_id(org, posted.id()).await.unwrap();
    assert_eq!(original_reloaded.status(), JournalStatus::Reversed);
    assert_eq!(original_reloaded.reversal_journal_id(), Some(reversal.id()));
    assert_eq!(reversal.original_journal_id(), Some(posted.id()));
}

/// Invariant 10: no repository lookup scoped to org A returns rows created
/// under org B.
#[tokio::test]
async fn tenants_are_fully_isolated() {
    let periods = in_memory_period_repository();
    let journals = in_memory_journal_repository();
    let period_service = PeriodService::new(periods.clone());
    let journal_service = JournalService::new(journals.clone(), periods.clone());
    let posting_service = PostingService::new(journals.clone(), periods.clone());
    let hash_service = HashService::new(journals.clone());

    let org_a = Uuid::new_v4();
    let org_b = Uuid::new_v4();

    let period_a = period_service.create_period(org_a, "A-Q2", ymd(2024, 4, 1), ymd(2024, 6, 30), now()).await.unwrap();
    let period_b = period_service.create_period(org_b, "B-Q2", ymd(2024, 4, 1), ymd(2024, 6, 30), now()).await.unwrap();

    let draft_a = journal_service
        .create_draft(org_a, period_a.id(), "JRN-A-0001", "a's journal", None, ymd(2024, 5, 15), CurrencyCode::EUR, balanced_lines(10_000, &[10_000]), None, "alice", now())
        .await
        .unwrap();
    posting_service.post(org_a, draft_a.id(), "alice", now()).await.unwrap();

    // org B resolves its own period for the shared date range, never org A's.
    let resolved = period_service.find_period_for_posting(org_b, ymd(2024, 5, 15)).await.unwrap();
    assert_eq!(resolved.id(), period_b.id());
    assert!(journal_service.find_by_id(org_b, draft_a.id()).await.is_err());
    assert!(journals.find_by_period(org_b, period_a.id()).await.unwrap().is_empty());

    let verification_b = hash_service.verify_organization_chain(org_b).await.unwrap();
    assert_eq!(verification_b.total_journals, 0);
    assert!(verification_b.is_valid);

    // Creating an overlapping period name in org B never collides with org A's period.
    let period_b2 = period_service.create_period(org_b, "B-Q3", ymd(2024, 7, 1), ymd(2024, 9, 30), now()).await.unwrap();
    assert_ne!(period_b2.organization_id(), org_a);
    assert_eq!(period_b.organization_id(), org_b);

    assert!(!journals.exists_by_journal_number(org_b, "JRN-A-0001").await.unwrap());
}
