//! ISO 4217 currency codes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{PrimitiveError, PrimitiveResult};

/// A three-letter ISO 4217 currency code, stored without heap allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode {
    code: [u8; 3],
}

impl CurrencyCode {
    pub const USD: Self = Self::from_static(b"USD");
    pub const EUR: Self = Self::from_static(b"EUR");
    pub const GBP: Self = Self::from_static(b"GBP");
    pub const JPY: Self = Self::from_static(b"JPY");
    pub const CNY: Self = Self::from_static(b"CNY");

    const fn from_static(bytes: &[u8; 3]) -> Self {
        Self { code: *bytes }
    }

    /// Validates and builds a currency code from a 3-letter uppercase string.
    pub fn new(code: &str) -> PrimitiveResult<Self> {
        let bytes = code.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_uppercase) {
            return Err(PrimitiveError::InvalidCurrencyCode(code.to_string()));
        }
        Ok(Self {
            code: [bytes[0], bytes[1], bytes[2]],
        })
    }

    pub fn as_str(&self) -> &str {
        // SAFETY-free: constructed only from validated ASCII uppercase bytes.
        std::str::from_utf8(&self.code).expect("currency code is always valid ASCII")
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = PrimitiveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_codes() {
        assert_eq!(CurrencyCode::new("EUR").unwrap().as_str(), "EUR");
    }

    #[test]
    fn rejects_lowercase() {
        assert!(CurrencyCode::new("eur").is_err());
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(CurrencyCode::new("EU").is_err());
        assert!(CurrencyCode::new("EURO").is_err());
    }

    #[test]
    fn roundtrips_through_display() {
        let c = CurrencyCode::new("GBP").unwrap();
        assert_eq!(c.to_string(), "GBP");
    }
}
