//! Tamper-evident hash chain links.
//!
//! Each posted journal seals a SHA-256 digest of its immutable fields folded
//! together with the previous journal's digest, producing a per-organization
//! hash chain: breaking any sealed journal breaks verification of every
//! journal posted after it.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::{PrimitiveError, PrimitiveResult};

/// A 32-byte SHA-256 digest, carried as 64-char lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JournalHash([u8; 32]);

impl JournalHash {
    /// Computes `H(serialized, hash_prev_or_empty)`: the digest of the
    /// serialized payload concatenated with the previous link's hex (or
    /// nothing, for the chain head).
    pub fn compute(serialized: &[u8], hash_prev: Option<&Self>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(serialized);
        if let Some(prev) = hash_prev {
            hasher.update(prev.to_hex().as_bytes());
        }
        let digest = hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    pub fn to_hex(&self) -> String {
        hex_encode(&self.0)
    }

    pub fn from_hex(hex: &str) -> PrimitiveResult<Self> {
        if hex.len() != 64 || !hex.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()) {
            return Err(PrimitiveError::InvalidHash(hex.to_string()));
        }
        let mut bytes = [0u8; 32];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let s = std::str::from_utf8(chunk).unwrap();
            bytes[i] = u8::from_str_radix(s, 16).map_err(|_| PrimitiveError::InvalidHash(hex.to_string()))?;
        }
        Ok(Self(bytes))
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

impl fmt::Display for JournalHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for JournalHash {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for JournalHash {
    type Error = PrimitiveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<JournalHash> for String {
    fn from(value: JournalHash) -> Self {
        value.to_hex()
    }
}
