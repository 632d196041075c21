//! Error types for the QR codec.

use etherdocs_core::FormatError;
use thiserror::Error;

/// Why a raster did not yield a fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// No QR finder pattern was located in the image.
    #[error("no QR code found in image")]
    NoCodeFound,

    /// A symbol was located but error correction could not recover it.
    #[error("QR code is unreadable: {0}")]
    UnreadableCode(String),

    /// The symbol decoded, but its text is not fingerprint-shaped.
    #[error("QR code text {decoded:?} is not a fingerprint: {reason}")]
    NotAFingerprint { decoded: String, reason: FormatError },

    /// The supplied bytes are not an image file we can read.
    #[error("malformed image: {0}")]
    MalformedImage(String),
}

/// Errors while producing a QR payload.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("QR symbol construction failed: {0}")]
    Symbol(String),

    #[error("raster too large: {0} pixels per side")]
    RasterTooLarge(u64),

    #[error("PNG encoding failed: {0}")]
    Png(#[from] image::ImageError),
}
