//! The fingerprint engine: document bytes to a ledger key.
//!
//! A fingerprint is the Keccak-256 digest of the raw document bytes, rendered
//! as `0x` followed by 64 lowercase hex digits. The same digest is the
//! `bytes32` key of the on-ledger registry, so the rendering here is frozen.

use std::fmt;
use std::io::Read;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};

use crate::error::{CoreError, FormatError};

/// Prefix marking a string as a fingerprint rather than arbitrary hex.
pub const FINGERPRINT_PREFIX: &str = "0x";

/// Number of hex digits after the prefix.
pub const FINGERPRINT_HEX_LEN: usize = 64;

/// Compute Keccak-256 over a byte string.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Fingerprint a document held in memory.
///
/// Pure and total: every byte sequence, including the empty one, has a
/// fingerprint.
pub fn fingerprint(document: &[u8]) -> Fingerprint {
    Fingerprint(keccak256(document))
}

/// Fingerprint a document read from a stream.
///
/// Produces exactly the value [`fingerprint`] would on the concatenated bytes.
pub fn fingerprint_reader<R: Read>(mut reader: R) -> Result<Fingerprint, CoreError> {
    let mut hasher = FingerprintHasher::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize())
}

/// Incremental fingerprinting for documents that arrive in chunks.
#[derive(Clone, Default)]
pub struct FingerprintHasher {
    inner: Keccak256,
}

impl FingerprintHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, chunk: &[u8]) -> &mut Self {
        self.inner.update(chunk);
        self
    }

    pub fn finalize(self) -> Fingerprint {
        Fingerprint(self.inner.finalize().into())
    }
}

/// A 32-byte document fingerprint.
///
/// Immutable once computed. Its [`Display`](fmt::Display) form is the
/// canonical `0x`-prefixed lowercase string, which is also what serde
/// produces and what the QR payload carries.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    /// Create from raw digest bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw digest bytes (the on-ledger `bytes32`).
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Canonical text form: `0x` + 64 lowercase hex digits.
    pub fn to_hex(&self) -> String {
        format!("{FINGERPRINT_PREFIX}{}", hex::encode(self.0))
    }

    /// Parse user- or scanner-supplied text.
    ///
    /// Surrounding whitespace is ignored. The prefix is required (`0x` or
    /// `0X`), hex digits may be either case.
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(FormatError::Empty);
        }

        let digits = text
            .strip_prefix(FINGERPRINT_PREFIX)
            .or_else(|| text.strip_prefix("0X"))
            .ok_or(FormatError::MissingPrefix)?;

        if let Some((i, c)) = digits.char_indices().find(|(_, c)| !c.is_ascii_hexdigit()) {
            return Err(FormatError::NonHex {
                position: FINGERPRINT_PREFIX.len() + i,
                found: c,
            });
        }

        if digits.len() != FINGERPRINT_HEX_LEN {
            return Err(FormatError::WrongLength {
                expected: FINGERPRINT_HEX_LEN,
                actual: digits.len(),
            });
        }

        let mut arr = [0u8; 32];
        hex::decode_to_slice(digits, &mut arr).map_err(|_| FormatError::WrongLength {
            expected: FINGERPRINT_HEX_LEN,
            actual: digits.len(),
        })?;
        Ok(Self(arr))
    }

    /// The all-zero fingerprint. Well-formed, but no document hashes to it
    /// in practice.
    pub const ZERO: Self = Self([0u8; 32]);
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({}...)", &self.to_hex()[..18])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Fingerprint {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<[u8]> for Fingerprint {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Fingerprint {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EMPTY_KECCAK: &str =
        "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470";

    #[test]
    fn test_empty_document() {
        assert_eq!(fingerprint(b"").to_hex(), EMPTY_KECCAK);
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            fingerprint(b"abc").to_hex(),
            "0x4e03657aea45a94fc7d47ba826c8d667c0d1e6e33a64a036ec44f58fa12d6c45"
        );
    }

    #[test]
    fn test_rendering_shape() {
        let text = fingerprint(b"anything").to_string();
        assert_eq!(text.len(), 66);
        assert!(text.starts_with("0x"));
        assert!(text[2..].chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
    }

    #[test]
    fn test_parse_accepts_uppercase_and_whitespace() {
        let fp = fingerprint(b"doc");
        let shouted = format!("  0X{}\n", hex::encode_upper(fp.as_bytes()));
        assert_eq!(Fingerprint::parse(&shouted).unwrap(), fp);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Fingerprint::parse("   "), Err(FormatError::Empty));
        assert_eq!(
            Fingerprint::parse("not-a-hash"),
            Err(FormatError::MissingPrefix)
        );
        assert_eq!(
            Fingerprint::parse(&"a".repeat(64)),
            Err(FormatError::MissingPrefix)
        );
        assert_eq!(
            Fingerprint::parse("0xabc"),
            Err(FormatError::WrongLength {
                expected: 64,
                actual: 3
            })
        );
        assert_eq!(
            Fingerprint::parse(&format!("0x{}", "0".repeat(66))),
            Err(FormatError::WrongLength {
                expected: 64,
                actual: 66
            })
        );
        assert_eq!(
            Fingerprint::parse(&format!("0x{}g", "0".repeat(63))),
            Err(FormatError::NonHex {
                position: 65,
                found: 'g'
            })
        );
    }

    #[test]
    fn test_zero_fingerprint_is_well_formed() {
        let text = format!("0x{}", "0".repeat(64));
        assert_eq!(Fingerprint::parse(&text).unwrap(), Fingerprint::ZERO);
    }

    #[test]
    fn test_streaming_matches_one_shot() {
        let doc: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
        let mut hasher = FingerprintHasher::new();
        for chunk in doc.chunks(777) {
            hasher.update(chunk);
        }
        assert_eq!(hasher.finalize(), fingerprint(&doc));
        assert_eq!(fingerprint_reader(&doc[..]).unwrap(), fingerprint(&doc));
    }

    #[test]
    fn test_serde_uses_canonical_string() {
        let fp = fingerprint(b"serde");
        let json = serde_json::to_string(&fp).unwrap();
        assert_eq!(json, format!("\"{}\"", fp.to_hex()));
        let back: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fp);
        assert!(serde_json::from_str::<Fingerprint>("\"0x12\"").is_err());
    }

    proptest! {
        #[test]
        fn prop_deterministic(doc in prop::collection::vec(any::<u8>(), 0..2048)) {
            prop_assert_eq!(fingerprint(&doc), fingerprint(&doc));
        }

        #[test]
        fn prop_distinct_documents_distinct_fingerprints(
            a in prop::collection::vec(any::<u8>(), 0..512),
            b in prop::collection::vec(any::<u8>(), 0..512),
        ) {
            prop_assume!(a != b);
            prop_assert_ne!(fingerprint(&a), fingerprint(&b));
        }

        #[test]
        fn prop_text_form_parses_back(bytes in any::<[u8; 32]>()) {
            let fp = Fingerprint::from_bytes(bytes);
            prop_assert_eq!(Fingerprint::parse(&fp.to_hex()).unwrap(), fp);
        }
    }
}
