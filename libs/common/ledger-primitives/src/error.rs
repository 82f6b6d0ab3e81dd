//! Error types raised while constructing or combining primitive values.

use thiserror::Error;

/// Errors raised by the primitive value types (`Amount`, `Money`, `CurrencyCode`, `JournalHash`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    #[error("invalid currency code: {0}, must be a 3-letter ISO 4217 code")]
    InvalidCurrencyCode(String),

    #[error("amount {0} exceeds the 18 integer digit bound")]
    AmountOutOfRange(String),

    #[error("invalid amount literal: {0}")]
    InvalidAmount(String),

    #[error("currency mismatch: expected {expected}, got {actual}")]
    CurrencyMismatch { expected: String, actual: String },

    #[error("exchange rate must be strictly positive, got {0}")]
    NonPositiveExchangeRate(String),

    #[error("invalid hash literal: {0}, must be 64 lowercase hex characters")]
    InvalidHash(String),
}

pub type PrimitiveResult<T> = Result<T, PrimitiveError>;
