//! Postgres-backed repositories, gated behind the `persistence` feature.
//!
//! Schema (see `migrations/`):
//!
//! ```sql
//! CREATE TABLE periods (
//!     id UUID PRIMARY KEY,
//!     organization_id UUID NOT NULL,
//!     name TEXT NOT NULL,
//!     start_date DATE NOT NULL,
//!     end_date DATE NOT NULL,
//!     status TEXT NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL,
//!     updated_at TIMESTAMPTZ NOT NULL
//! );
//!
//! CREATE TABLE journals (
//!     id UUID PRIMARY KEY,
//!     organization_id UUID NOT NULL,
//!     period_id UUID NOT NULL REFERENCES periods(id),
//!     journal_number TEXT NOT NULL,
//!     description TEXT NOT NULL,
//!     reference TEXT,
//!     posting_date DATE NOT NULL,
//!     status TEXT NOT NULL,
//!     currency CHAR(3) NOT NULL,
//!     hash_prev CHAR(64),
//!     hash_self CHAR(64),
//!     reversal_journal_id UUID,
//!     original_journal_id UUID,
//!     ext_uid TEXT,
//!     created_by TEXT NOT NULL,
//!     posted_by TEXT,
//!     posted_at TIMESTAMPTZ,
//!     created_at TIMESTAMPTZ NOT NULL,
//!     updated_at TIMESTAMPTZ NOT NULL,
//!     UNIQUE (organization_id, journal_number),
//!     UNIQUE (organization_id, ext_uid)
//! );
//!
//! CREATE TABLE journal_lines (
//!     journal_id UUID NOT NULL REFERENCES journals(id) ON DELETE CASCADE,
//!     line_number INTEGER NOT NULL,
//!     account_id TEXT NOT NULL,
//!     description TEXT NOT NULL,
//!     debit_amount NUMERIC(22, 4) NOT NULL,
//!     credit_amount NUMERIC(22, 4) NOT NULL,
//!     original_amount NUMERIC(22, 4) NOT NULL,
//!     original_currency CHAR(3) NOT NULL,
//!     exchange_rate NUMERIC(18, 6) NOT NULL,
//!     tax_code TEXT,
//!     tax_amount NUMERIC(22, 4),
//!     tax_rate NUMERIC(5, 4),
//!     PRIMARY KEY (journal_id, line_number)
//! );
//! ```

mod journal_repository;
mod period_repository;
mod rows;

pub use journal_repository::PgJournalRepository;
pub use period_repository::PgPeriodRepository;
