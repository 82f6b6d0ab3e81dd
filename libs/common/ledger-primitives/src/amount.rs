//! Fixed-precision decimal amount: 18 integer digits, 4 fractional digits,
//! banker's rounding on every arithmetic result.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

use crate::error::{PrimitiveError, PrimitiveResult};

/// Number of fractional digits every `Amount` is rescaled to.
pub const AMOUNT_SCALE: u32 = 4;

/// Largest representable magnitude: 18 integer digits at scale 4.
fn max_magnitude() -> Decimal {
    Decimal::from_str("999999999999999999.9999").expect("literal fits in Decimal")
}

/// A signed fixed-point decimal with 18 integer digits and 4 fractional
/// digits. All arithmetic rounds to scale 4 using round-half-to-even
/// (banker's rounding).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(Decimal);

impl Amount {
    pub const fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Builds an `Amount`, rescaling to 4 fractional digits with banker's
    /// rounding and rejecting magnitudes beyond 18 integer digits.
    pub fn new(value: Decimal) -> PrimitiveResult<Self> {
        let rounded = value.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointNearestEven);
        if rounded.abs() > max_magnitude() {
            return Err(PrimitiveError::AmountOutOfRange(rounded.to_string()));
        }
        Ok(Self(rounded))
    }

    pub fn from_str_exact(s: &str) -> PrimitiveResult<Self> {
        let value = Decimal::from_str(s).map_err(|_| PrimitiveError::InvalidAmount(s.to_string()))?;
        Self::new(value)
    }

    pub const fn inner(&self) -> Decimal {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn checked_add(self, other: Self) -> PrimitiveResult<Self> {
        Self::new(self.0 + other.0)
    }

    pub fn checked_sub(self, other: Self) -> PrimitiveResult<Self> {
        Self::new(self.0 - other.0)
    }

    /// Multiplies by a scalar (e.g. an exchange rate), rounding the result.
    pub fn checked_mul(self, scalar: Decimal) -> PrimitiveResult<Self> {
        Self::new(self.0 * scalar)
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Renders the amount with exactly `AMOUNT_SCALE` fractional digits,
    /// independent of trailing zeros in the stored representation. This is
    /// the canonical form used by the hash-chain serialization.
    pub fn to_fixed_string(&self) -> String {
        format!("{:.prec$}", self.0, prec = AMOUNT_SCALE as usize)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fixed_string())
    }
}

impl FromStr for Amount {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_exact(s)
    }
}

impl TryFrom<String> for Amount {
    type Error = PrimitiveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str_exact(&value)
    }
}

impl From<Amount> for String {
    fn from(value: Amount) -> Self {
        value.to_fixed_string()
    }
}

impl PartialEq for Amount {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for Amount {}

impl PartialOrd for Amount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Amount {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl Add for Amount {
    type Output = PrimitiveResult<Self>;
    fn add(self, rhs: Self) -> Self::Output {
        self.checked_add(rhs)
    }
}

impl Sub for Amount {
    type Output = PrimitiveResult<Self>;
    fn sub(self, rhs: Self) -> Self::Output {
        self.checked_sub(rhs)
    }
}

impl Neg for Amount {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}
