//! Row <-> aggregate conversion for the Postgres repositories.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::error::{LedgerError, LedgerResult};
use crate::domain::journal::{Journal, JournalStatus};
use crate::domain::journal_line::JournalLine;
use crate::domain::period::{Period, PeriodStatus};
use ledger_primitives::{Amount, CurrencyCode, JournalHash, Money};

#[derive(FromRow)]
pub struct PeriodRow {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PeriodRow {
    pub fn into_domain(self) -> LedgerResult<Period> {
        Ok(Period::from_persisted(
            self.id,
            self.organization_id,
            self.name,
            self.start_date,
            self.end_date,
            PeriodStatus::parse(&self.status)?,
            self.created_at,
            self.updated_at,
        ))
    }
}

#[derive(FromRow)]
pub struct JournalRow {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub period_id: Uuid,
    pub journal_number: String,
    pub description: String,
    pub reference: Option<String>,
    pub posting_date: NaiveDate,
    pub status: String,
    pub currency: String,
    pub hash_prev: Option<String>,
    pub hash_self: Option<String>,
    pub reversal_journal_id: Option<Uuid>,
    pub original_journal_id: Option<Uuid>,
    pub ext_uid: Option<String>,
    pub created_by: String,
    pub posted_by: Option<String>,
    pub posted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
pub struct JournalLineRow {
    pub line_number: i32,
    pub account_id: String,
    pub description: String,
    pub debit_amount: Decimal,
    pub credit_amount: Decimal,
    pub original_amount: Decimal,
    pub original_currency: String,
    pub exchange_rate: Decimal,
    pub tax_code: Option<String>,
    pub tax_amount: Option<Decimal>,
    pub tax_rate: Option<Decimal>,
}

impl JournalLineRow {
    pub fn into_domain(self, journal_currency: CurrencyCode) -> LedgerResult<JournalLine> {
        let original_currency =
            CurrencyCode::new(&self.original_currency).map_err(|e| LedgerError::Infrastructure(e.to_string()))?;
        Ok(JournalLine::from_persisted(
            self.line_number as u32,
            self.account_id,
            self.description,
            Money::new(Amount::new(self.debit_amount).map_err(|e| LedgerError::Infrastructure(e.to_string()))?, journal_currency),
            Money::new(Amount::new(self.credit_amount).map_err(|e| LedgerError::Infrastructure(e.to_string()))?, journal_currency),
            Money::new(Amount::new(self.original_amount).map_err(|e| LedgerError::Infrastructure(e.to_string()))?, original_currency),
            self.exchange_rate,
            self.tax_code,
            self.tax_amount
                .map(Amount::new)
                .transpose()
                .map_err(|e| LedgerError::Infrastructure(e.to_string()))?,
            self.tax_rate,
        ))
    }
}

impl JournalRow {
    pub fn into_domain(self, lines: Vec<JournalLineRow>) -> LedgerResult<Journal> {
        let currency = CurrencyCode::new(&self.currency).map_err(|e| LedgerError::Infrastructure(e.to_string()))?;
        let lines = lines
            .into_iter()
            .map(|row| row.into_domain(currency))
            .collect::<LedgerResult<Vec<_>>>()?;

        Ok(Journal::from_persisted(
            self.id,
            self.organization_id,
            self.period_id,
            self.journal_number,
            self.description,
            self.reference,
            self.posting_date,
            JournalStatus::parse(&self.status)?,
            currency,
            lines,
            self.hash_prev.map(|h| JournalHash::from_hex(&h)).transpose().map_err(|e| LedgerError::Infrastructure(e.to_string()))?,
            self.hash_self.map(|h| JournalHash::from_hex(&h)).transpose().map_err(|e| LedgerError::Infrastructure(e.to_string()))?,
            self.reversal_journal_id,
            self.original_journal_id,
            self.ext_uid,
            self.created_by,
            self.posted_by,
            self.posted_at,
            self.created_at,
            self.updated_at,
        ))
    }
}
