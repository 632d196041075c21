//! # Etherdocs QR
//!
//! Moves a [`Fingerprint`](etherdocs_core::Fingerprint) out-of-band: the
//! issuer prints or displays a QR symbol, the verifier scans or uploads an
//! image of it and gets the fingerprint back.
//!
//! ## Key Types
//!
//! - [`QrCodec`] - Encoder/decoder with configurable module size and error correction
//! - [`QrPayload`] - An encoded fingerprint ready for display or PNG download
//! - [`DecodeError`] - Why a raster did not yield a fingerprint
//!
//! ## Usage
//!
//! ```rust,no_run
//! use etherdocs_core::fingerprint;
//! use etherdocs_qr::QrCodec;
//!
//! let codec = QrCodec::default();
//! let fp = fingerprint(b"transcript");
//! let payload = codec.encode(&fp).unwrap();
//! let png = payload.to_png().unwrap();
//!
//! assert_eq!(codec.decode_bytes(&png).unwrap(), fp);
//! ```
//!
//! ## Design Notes
//!
//! - **Payload is the fingerprint text only**: no framing, no metadata, so any
//!   generic QR reader shows the same string the verifier can type by hand.
//! - **Decode failures are values**: missing symbol, unreadable symbol, and
//!   non-fingerprint text are distinct [`DecodeError`] variants.

pub mod codec;
pub mod error;
pub mod payload;

pub use codec::{EcLevel, QrCodec, QrConfig, MAX_RASTER_SIDE, MIN_QUIET_ZONE};
pub use error::{DecodeError, EncodeError};
pub use payload::QrPayload;
