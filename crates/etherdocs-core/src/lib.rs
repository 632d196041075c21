//! # Etherdocs Core
//!
//! Pure primitives for Etherdocs: document fingerprints, ledger identities,
//! and the signing keys behind a wallet.
//!
//! This crate contains no I/O, no storage, no networking. It is pure computation
//! over byte strings.
//!
//! ## Key Types
//!
//! - [`Fingerprint`] - Keccak-256 digest of a document, the document's on-ledger identity
//! - [`Address`] - 20-byte issuer identity
//! - [`TxHash`] - Identifier of a submitted ledger transaction
//! - [`Keypair`] - Ed25519 signing capability
//!
//! ## Fingerprints
//!
//! ```rust
//! use etherdocs_core::{fingerprint, Fingerprint};
//!
//! let fp = fingerprint(b"diploma.pdf contents");
//! let text = fp.to_string();
//! assert_eq!(text.len(), 66);
//! assert_eq!(text.parse::<Fingerprint>().unwrap(), fp);
//! ```

pub mod canonical;
pub mod crypto;
pub mod error;
pub mod fingerprint;
pub mod types;

pub use canonical::encode_canonical;
pub use crypto::{Keypair, PublicKey, Signature};
pub use error::{CoreError, FormatError};
pub use fingerprint::{
    fingerprint, fingerprint_reader, keccak256, Fingerprint, FingerprintHasher,
    FINGERPRINT_HEX_LEN, FINGERPRINT_PREFIX,
};
pub use types::{Address, TxHash};
