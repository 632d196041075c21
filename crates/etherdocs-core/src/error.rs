//! Error types for Etherdocs Core.

use thiserror::Error;

/// Why a piece of text is not a well-formed fingerprint.
///
/// Returned by [`Fingerprint::parse`](crate::Fingerprint::parse). Each variant
/// names the first rule the text broke, in checking order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("empty input")]
    Empty,

    #[error("missing 0x prefix")]
    MissingPrefix,

    #[error("expected {expected} hex digits, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("non-hex character {found:?} at position {position}")]
    NonHex { position: usize, found: char },
}

/// Core errors that can occur outside fingerprint parsing.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("value has no canonical encoding: {0}")]
    NonCanonical(&'static str),

    #[error("malformed identifier: {0}")]
    MalformedIdentifier(String),

    #[error("I/O error while hashing: {0}")]
    Io(#[from] std::io::Error),
}
