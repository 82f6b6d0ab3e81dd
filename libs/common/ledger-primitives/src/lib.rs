//! Numeric and cryptographic primitives shared by the ledger core.
//!
//! ## Core types
//! - [`Amount`] — fixed-precision decimal, 18 integer + 4 fractional digits, banker's rounding.
//! - [`Money`] — an [`Amount`] paired with its [`CurrencyCode`]; arithmetic across currencies is a hard error.
//! - [`JournalHash`] — a SHA-256 link in the per-organization tamper-evident hash chain.

mod amount;
mod currency;
mod error;
mod journal_hash;
mod money;

pub use amount::{Amount, AMOUNT_SCALE};
pub use currency::CurrencyCode;
pub use error::{PrimitiveError, PrimitiveResult};
pub use journal_hash::JournalHash;
pub use money::Money;
