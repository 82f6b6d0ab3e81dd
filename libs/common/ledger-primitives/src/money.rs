//! Money: an `Amount` paired with its currency. Arithmetic is only defined
//! between values of the same currency.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::amount::Amount;
use crate::currency::CurrencyCode;
use crate::error::{PrimitiveError, PrimitiveResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Amount,
    currency: CurrencyCode,
}

impl Money {
    pub const fn new(amount: Amount, currency: CurrencyCode) -> Self {
        Self { amount, currency }
    }

    pub fn zero(currency: CurrencyCode) -> Self {
        Self {
            amount: Amount::zero(),
            currency,
        }
    }

    pub const fn amount(&self) -> Amount {
        self.amount
    }

    pub const fn currency(&self) -> CurrencyCode {
        self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    fn require_same_currency(&self, other: &Self) -> PrimitiveResult<()> {
        if self.currency != other.currency {
            return Err(PrimitiveError::CurrencyMismatch {
                expected: self.currency.to_string(),
                actual: other.currency.to_string(),
            });
        }
        Ok(())
    }

    pub fn add(&self, other: &Self) -> PrimitiveResult<Self> {
        self.require_same_currency(other)?;
        Ok(Self {
            amount: self.amount.checked_add(other.amount)?,
            currency: self.currency,
        })
    }

    pub fn subtract(&self, other: &Self) -> PrimitiveResult<Self> {
        self.require_same_currency(other)?;
        Ok(Self {
            amount: self.amount.checked_sub(other.amount)?,
            currency: self.currency,
        })
    }

    /// Multiplies the amount by a scalar, as used to convert an
    /// `original_amount` by an `exchange_rate`.
    pub fn multiply(&self, scalar: Decimal) -> PrimitiveResult<Self> {
        Ok(Self {
            amount: self.amount.checked_mul(scalar)?,
            currency: self.currency,
        })
    }

    /// Absolute difference between two same-currency amounts, used for
    /// exchange-rate tolerance checks.
    pub fn abs_difference(&self, other: &Self) -> PrimitiveResult<Amount> {
        let diff = self.subtract(other)?;
        Ok(diff.amount.abs())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount.to_fixed_string(), self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eur(v: &str) -> Money {
        Money::new(Amount::from_str_exact(v).unwrap(), CurrencyCode::EUR)
    }

    #[test]
    fn add_same_currency() {
        let total = eur("1500.00").add(&eur("0.50")).unwrap();
        assert_eq!(total.amount().to_fixed_string(), "1500.5000");
    }

    #[test]
    fn add_rejects_currency_mismatch() {
        let usd = Money::new(Amount::from_str_exact("1").unwrap(), CurrencyCode::USD);
        assert!(eur("1").add(&usd).is_err());
    }

    #[test]
    fn display_renders_trailing_zeros() {
        assert_eq!(eur("100").to_string(), "100.0000 EUR");
    }
}
