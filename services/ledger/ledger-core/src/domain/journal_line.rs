//! A single debit or credit entry within a journal.

use ledger_primitives::{Amount, CurrencyCode, Money};
use rust_decimal::Decimal;

use crate::domain::error::{LedgerError, LedgerResult};

/// Tolerance (in the booking currency) between `original_amount * exchange_rate`
/// and the booked amount.
const EXCHANGE_TOLERANCE: &str = "0.0001";

#[derive(Debug, Clone)]
pub struct JournalLine {
    line_number: u32,
    account_id: String,
    description: String,
    debit_amount: Money,
    credit_amount: Money,
    original_amount: Money,
    exchange_rate: Decimal,
    tax_code: Option<String>,
    tax_amount: Option<Amount>,
    tax_rate: Option<Decimal>,
}

impl JournalLine {
    /// Rehydrates a `JournalLine` from storage without rerunning the
    /// creation invariants: they were already enforced when the row was
    /// written.
    #[allow(clippy::too_many_arguments)]
    pub const fn from_persisted(
        line_number: u32,
        account_id: String,
        description: String,
        debit_amount: Money,
        credit_amount: Money,
        original_amount: Money,
        exchange_rate: Decimal,
        tax_code: Option<String>,
        tax_amount: Option<Amount>,
        tax_rate: Option<Decimal>,
    ) -> Self {
        Self {
            line_number,
            account_id,
            description,
            debit_amount,
            credit_amount,
            original_amount,
            exchange_rate,
            tax_code,
            tax_amount,
            tax_rate,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        line_number: u32,
        account_id: impl Into<String>,
        description: impl Into<String>,
        debit_amount: Money,
        credit_amount: Money,
        journal_currency: CurrencyCode,
        original_amount: Money,
        exchange_rate: Decimal,
        tax_code: Option<String>,
        tax_amount: Option<Amount>,
        tax_rate: Option<Decimal>,
    ) -> LedgerResult<Self> {
        if line_number == 0 {
            return Err(LedgerError::validation("line_number must be >= 1"));
        }
        if exchange_rate <= Decimal::ZERO {
            return Err(LedgerError::validation(format!(
                "exchange_rate must be strictly positive, got {exchange_rate}"
            )));
        }
        if let Some(rate) = tax_rate {
            if !(Decimal::ZERO..=Decimal::ONE).contains(&rate) {
                return Err(LedgerError::validation("tax_rate must be within [0, 1]"));
            }
        }
        if debit_amount.currency() != journal_currency || credit_amount.currency() != journal_currency {
            return Err(LedgerError::validation(
                "debit_amount and credit_amount must be denominated in the journal's currency",
            ));
        }

        let debit_nonzero = !debit_amount.is_zero();
        let credit_nonzero = !credit_amount.is_zero();
        if debit_nonzero == credit_nonzero {
            return Err(LedgerError::validation(
                "exactly one of debit_amount/credit_amount must be non-zero",
            ));
        }

        let booking_amount = if debit_nonzero { debit_amount.amount() } else { credit_amount.amount() };
        let converted = original_amount
            .amount()
            .checked_mul(exchange_rate)
            .map_err(|e| LedgerError::validation(e.to_string()))?;
        let tolerance = Amount::from_str_exact(EXCHANGE_TOLERANCE).expect("static tolerance parses");
        let difference = (converted.inner() - booking_amount.inner()).abs();
        if difference > tolerance.inner() {
            return Err(LedgerError::validation(format!(
                "exchange rate tolerance exceeded: |{} * {} - {}| > {}",
                original_amount.amount(),
                exchange_rate,
                booking_amount,
                EXCHANGE_TOLERANCE
            )));
        }

        Ok(Self {
            line_number,
            account_id: account_id.into(),
            description: description.into(),
            debit_amount,
            credit_amount,
            original_amount,
            exchange_rate,
            tax_code,
            tax_amount,
            tax_rate,
        })
    }

    pub const fn line_number(&self) -> u32 {
        self.line_number
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub const fn debit_amount(&self) -> Money {
        self.debit_amount
    }

    pub const fn credit_amount(&self) -> Money {
        self.credit_amount
    }

    pub const fn original_amount(&self) -> Money {
        self.original_amount
    }

    pub const fn exchange_rate(&self) -> Decimal {
        self.exchange_rate
    }

    pub fn tax_code(&self) -> Option<&str> {
        self.tax_code.as_deref()
    }

    pub const fn tax_amount(&self) -> Option<Amount> {
        self.tax_amount
    }

    pub const fn tax_rate(&self) -> Option<Decimal> {
        self.tax_rate
    }

    pub const fn is_debit(&self) -> bool {
        !self.debit_amount.amount().is_zero()
    }

    /// Builds the mirror of this line for a reversal journal: debit/credit
    /// swapped, description prefixed, everything else unchanged.
    pub fn reversed(&self) -> Self {
        Self {
            line_number: self.line_number,
            account_id: self.account_id.clone(),
            description: format!("REVERSAL: {}", self.description),
            debit_amount: self.credit_amount,
            credit_amount: self.debit_amount,
            original_amount: self.original_amount,
            exchange_rate: self.exchange_rate,
            tax_code: self.tax_code.clone(),
            tax_amount: self.tax_amount,
            tax_rate: self.tax_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn eur(v: &str) -> Money {
        Money::new(Amount::from_str_exact(v).unwrap(), CurrencyCode::EUR)
    }

    #[test]
    fn accepts_balanced_debit_line() {
        let line = JournalLine::new(
            1,
            "1000-cash",
            "cash receipt",
            eur("1500.00"),
            eur("0"),
            CurrencyCode::EUR,
            eur("1500.00"),
            dec!(1.0),
            None,
            None,
            None,
        )
        .unwrap();
        assert!(line.is_debit());
    }

    #[test]
    fn rejects_both_debit_and_credit_set() {
        let err = JournalLine::new(
            1,
            "1000",
            "bad",
            eur("10"),
            eur("10"),
            CurrencyCode::EUR,
            eur("10"),
            dec!(1.0),
            None,
            None,
            None,
        );
        assert!(err.is_err());
    }

    #[test]
    fn rejects_zero_line_number() {
        let err = JournalLine::new(
            0,
            "1000",
            "bad",
            eur("10"),
            eur("0"),
            CurrencyCode::EUR,
            eur("10"),
            dec!(1.0),
            None,
            None,
            None,
        );
        assert!(err.is_err());
    }

    #[test]
    fn rejects_non_positive_exchange_rate() {
        let err = JournalLine::new(
            1,
            "1000",
            "bad",
            eur("10"),
            eur("0"),
            CurrencyCode::EUR,
            eur("10"),
            dec!(0),
            None,
            None,
            None,
        );
        assert!(err.is_err());
    }

    #[test]
    fn rejects_exchange_tolerance_violation() {
        let err = JournalLine::new(
            1,
            "1000",
            "bad rate",
            eur("100.00"),
            eur("0"),
            CurrencyCode::EUR,
            eur("90.00"),
            dec!(1.0),
            None,
            None,
            None,
        );
        assert!(err.is_err());
    }

    #[test]
    fn reversal_swaps_debit_and_credit() {
        let line = JournalLine::new(
            1,
            "4000-revenue",
            "sale",
            eur("0"),
            eur("1500.00"),
            CurrencyCode::EUR,
            eur("1500.00"),
            dec!(1.0),
            None,
            None,
            None,
        )
        .unwrap();
        let reversed = line.reversed();
        assert_eq!(reversed.debit_amount(), eur("1500.00"));
        assert_eq!(reversed.credit_amount(), eur("0"));
        assert!(reversed.description().starts_with("REVERSAL: "));
    }
}
