//! Strong type definitions for ledger identities.
//!
//! All identifiers are newtypes to prevent misuse at compile time.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::fingerprint::keccak256;

/// A 20-byte ledger address: an issuer, or the registry contract itself.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Create a new Address from raw bytes.
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Derive the address owned by a public key: the trailing 20 bytes of
    /// Keccak-256 over the key bytes.
    pub fn from_public_key(key: &[u8]) -> Self {
        let digest = keccak256(key);
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&digest[12..]);
        Self(arr)
    }

    /// Convert to `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse from `0x`-prefixed hex.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let digits = strip_0x(s)
            .ok_or_else(|| CoreError::MalformedIdentifier(format!("address {s:?} lacks 0x")))?;
        let mut arr = [0u8; 20];
        hex::decode_to_slice(digits, &mut arr)
            .map_err(|e| CoreError::MalformedIdentifier(format!("address {s:?}: {e}")))?;
        Ok(Self(arr))
    }

    /// The zero address (used as a sentinel).
    pub const ZERO: Self = Self([0u8; 20]);
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Address {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_hex(&text).map_err(serde::de::Error::custom)
    }
}

/// A 32-byte transaction hash returned once a ledger write is final.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxHash(pub [u8; 32]);

impl TxHash {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hash the canonical bytes of a signed transaction.
    pub fn of(signed_bytes: &[u8]) -> Self {
        Self(keccak256(signed_bytes))
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to `0x`-prefixed hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({}...)", &self.to_hex()[..18])
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let digits = strip_0x(&text)
            .ok_or_else(|| serde::de::Error::custom("transaction hash lacks 0x"))?;
        let mut arr = [0u8; 32];
        hex::decode_to_slice(digits, &mut arr).map_err(serde::de::Error::custom)?;
        Ok(Self(arr))
    }
}

fn strip_0x(s: &str) -> Option<&str> {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_hex_roundtrip() {
        let addr = Address::from_bytes([0x42; 20]);
        let hex = addr.to_hex();
        assert_eq!(hex.len(), 42);
        assert_eq!(Address::from_hex(&hex).unwrap(), addr);
    }

    #[test]
    fn test_address_rejects_bad_input() {
        assert!(Address::from_hex("4242").is_err());
        assert!(Address::from_hex("0x4242").is_err());
        assert!(Address::from_hex(&format!("0x{}", "zz".repeat(20))).is_err());
    }

    #[test]
    fn test_address_from_public_key_is_keccak_tail() {
        let key = [0x07u8; 32];
        let digest = keccak256(&key);
        assert_eq!(Address::from_public_key(&key).as_bytes()[..], digest[12..]);
    }

    #[test]
    fn test_tx_hash_display() {
        let tx = TxHash::from_bytes([0xab; 32]);
        assert_eq!(tx.to_string(), format!("0x{}", "ab".repeat(32)));
        assert!(format!("{:?}", tx).starts_with("TxHash(0xabab"));
    }
}
