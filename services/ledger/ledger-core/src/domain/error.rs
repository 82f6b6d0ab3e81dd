//! The canonical error taxonomy surfaced by the ledger core.

use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Structured context attached to an error, e.g. overlapping period ids or
/// duplicate numbers. Kept as a string map so it can be rendered to callers
/// without leaking internal types.
pub type ErrorDetails = HashMap<String, String>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("validation failed: {message}")]
    ValidationFailed {
        message: String,
        details: ErrorDetails,
    },

    #[error("business rule violation: {message}")]
    BusinessRuleViolation {
        message: String,
        details: ErrorDetails,
    },

    #[error("{entity} {id} not found")]
    EntityNotFound { entity: &'static str, id: String },

    #[error("period {period_id} is not open")]
    PeriodClosed { period_id: Uuid },

    #[error("journal {journal_id} is already posted")]
    JournalAlreadyPosted { journal_id: Uuid },

    #[error("unbalanced journal: debit {total_debit} != credit {total_credit}")]
    UnbalancedJournal {
        total_debit: String,
        total_credit: String,
        details: ErrorDetails,
    },

    #[error("hash chain verification failed for journal {journal_id}")]
    InvalidHashChain { journal_id: Uuid },

    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl LedgerError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
            details: ErrorDetails::new(),
        }
    }

    pub fn business_rule(message: impl Into<String>) -> Self {
        Self::BusinessRuleViolation {
            message: message.into(),
            details: ErrorDetails::new(),
        }
    }

    pub fn unbalanced_journal(total_debit: impl Into<String>, total_credit: impl Into<String>) -> Self {
        let total_debit = total_debit.into();
        let total_credit = total_credit.into();
        let mut details = ErrorDetails::new();
        details.insert("totalDebit".to_string(), total_debit.clone());
        details.insert("totalCredit".to_string(), total_credit.clone());
        Self::UnbalancedJournal {
            total_debit,
            total_credit,
            details,
        }
    }

    pub fn with_details(mut self, key: &str, value: impl Into<String>) -> Self {
        let details = match &mut self {
            Self::ValidationFailed { details, .. } | Self::BusinessRuleViolation { details, .. } => details,
            _ => return self,
        };
        details.insert(key.to_string(), value.into());
        self
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
