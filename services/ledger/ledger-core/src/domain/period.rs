//! The accounting period state machine.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::error::{LedgerError, LedgerResult};

const MAX_PERIOD_DURATION_DAYS: i64 = 365 * 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodStatus {
    Open,
    Closing,
    Closed,
}

impl PeriodStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closing => "closing",
            Self::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> LedgerResult<Self> {
        match s {
            "open" => Ok(Self::Open),
            "closing" => Ok(Self::Closing),
            "closed" => Ok(Self::Closed),
            other => Err(LedgerError::Infrastructure(format!("unknown period status {other:?}"))),
        }
    }
}

/// An accounting time interval. Only `Open` periods accept postings or
/// edits; only `Closing` periods may become `Closed` or revert to `Open`.
#[derive(Debug, Clone)]
pub struct Period {
    id: Uuid,
    organization_id: Uuid,
    name: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    status: PeriodStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Period {
    /// Rehydrates a `Period` from storage without rerunning the creation
    /// invariants: they were already enforced when the row was written.
    #[allow(clippy::too_many_arguments)]
    pub const fn from_persisted(
        id: Uuid,
        organization_id: Uuid,
        name: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
        status: PeriodStatus,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            organization_id,
            name,
            start_date,
            end_date,
            status,
            created_at,
            updated_at,
        }
    }

    pub fn create(
        organization_id: Uuid,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> LedgerResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LedgerError::validation("period name must not be empty"));
        }
        validate_range(start_date, end_date)?;

        Ok(Self {
            id: Uuid::new_v4(),
            organization_id,
            name,
            start_date,
            end_date,
            status: PeriodStatus::Open,
            created_at: now,
            updated_at: now,
        })
    }

    pub const fn id(&self) -> Uuid {
        self.id
    }

    pub const fn organization_id(&self) -> Uuid {
        self.organization_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub const fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub const fn status(&self) -> PeriodStatus {
        self.status
    }

    pub fn is_open(&self) -> bool {
        self.status == PeriodStatus::Open
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Inclusive-interval overlap test: `a.start <= b.end && b.start <= a.end`.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && start <= self.end_date
    }

    pub fn validate_for_posting(&self) -> LedgerResult<()> {
        if !self.is_open() {
            return Err(LedgerError::PeriodClosed { period_id: self.id });
        }
        Ok(())
    }

    /// Only permitted while `Open`; the caller is responsible for checking
    /// overlap against sibling periods first via the repository.
    pub fn update(&mut self, name: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate, now: DateTime<Utc>) -> LedgerResult<()> {
        if !self.is_open() {
            return Err(LedgerError::business_rule("period can only be edited while open"));
        }
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LedgerError::validation("period name must not be empty"));
        }
        validate_range(start_date, end_date)?;

        self.name = name;
        self.start_date = start_date;
        self.end_date = end_date;
        self.updated_at = now;
        Ok(())
    }

    pub fn start_closing(&mut self, now: DateTime<Utc>) -> LedgerResult<()> {
        self.transition(PeriodStatus::Open, PeriodStatus::Closing, now)
    }

    pub fn close(&mut self, now: DateTime<Utc>) -> LedgerResult<()> {
        self.transition(PeriodStatus::Closing, PeriodStatus::Closed, now)
    }

    pub fn reopen(&mut self, now: DateTime<Utc>) -> LedgerResult<()> {
        self.transition(PeriodStatus::Closing, PeriodStatus::Open, now)
    }

    fn transition(&mut self, from: PeriodStatus, to: PeriodStatus, now: DateTime<Utc>) -> LedgerResult<()> {
        if self.status != from {
            return Err(LedgerError::business_rule(format!(
                "cannot transition period from {:?} to {:?}: currently {:?}",
                from, to, self.status
            )));
        }
        self.status = to;
        self.updated_at = now;
        Ok(())
    }
}

fn validate_range(start_date: NaiveDate, end_date: NaiveDate) -> LedgerResult<()> {
    if start_date >= end_date {
        return Err(LedgerError::validation("period start_date must precede end_date"));
    }
    if (end_date - start_date).num_days() > MAX_PERIOD_DURATION_DAYS {
        return Err(LedgerError::validation("period duration must not exceed 2 years"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap().with_timezone(&Utc)
    }

    #[test]
    fn create_lands_in_open() {
        let p = Period::create(Uuid::new_v4(), "2024-Q2", ymd(2024, 4, 1), ymd(2024, 6, 30), now()).unwrap();
        assert!(p.is_open());
    }

    #[test]
    fn rejects_inverted_range() {
        let err = Period::create(Uuid::new_v4(), "bad", ymd(2024, 6, 30), ymd(2024, 4, 1), now());
        assert!(err.is_err());
    }

    #[test]
    fn rejects_duration_over_two_years() {
        let err = Period::create(Uuid::new_v4(), "too-long", ymd(2024, 1, 1), ymd(2027, 1, 1), now());
        assert!(err.is_err());
    }

    #[test]
    fn overlap_detects_inclusive_intersection() {
        let p = Period::create(Uuid::new_v4(), "Q1", ymd(2024, 1, 1), ymd(2024, 3, 31), now()).unwrap();
        assert!(p.overlaps(ymd(2024, 3, 15), ymd(2024, 4, 30)));
        assert!(!p.overlaps(ymd(2024, 4, 1), ymd(2024, 6, 30)));
    }

    #[test]
    fn full_lifecycle() {
        let mut p = Period::create(Uuid::new_v4(), "Q2", ymd(2024, 4, 1), ymd(2024, 6, 30), now()).unwrap();
        p.start_closing(now()).unwrap();
        assert_eq!(p.status(), PeriodStatus::Closing);
        p.close(now()).unwrap();
        assert_eq!(p.status(), PeriodStatus::Closed);
    }

    #[test]
    fn reopen_only_from_closing() {
        let mut p = Period::create(Uuid::new_v4(), "Q2", ymd(2024, 4, 1), ymd(2024, 6, 30), now()).unwrap();
        assert!(p.reopen(now()).is_err());
        p.start_closing(now()).unwrap();
        p.reopen(now()).unwrap();
        assert_eq!(p.status(), PeriodStatus::Open);
    }

    #[test]
    fn closed_is_terminal() {
        let mut p = Period::create(Uuid::new_v4(), "Q2", ymd(2024, 4, 1), ymd(2024, 6, 30), now()).unwrap();
        p.start_closing(now()).unwrap();
        p.close(now()).unwrap();
        assert!(p.reopen(now()).is_err());
        assert!(p.start_closing(now()).is_err());
    }

    #[test]
    fn update_only_while_open() {
        let mut p = Period::create(Uuid::new_v4(), "Q2", ymd(2024, 4, 1), ymd(2024, 6, 30), now()).unwrap();
        p.start_closing(now()).unwrap();
        assert!(p.update("Q2", ymd(2024, 4, 1), ymd(2024, 6, 30), now()).is_err());
    }
}
