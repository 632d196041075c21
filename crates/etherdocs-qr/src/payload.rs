//! The encoded form of a fingerprint handed to the presentation layer.

use std::io::Cursor;

use etherdocs_core::Fingerprint;
use image::{GrayImage, ImageFormat};

use crate::error::EncodeError;

/// A fingerprint rendered as a QR raster.
///
/// Carries nothing but the fingerprint; the raster is a pure function of it
/// and the codec configuration.
#[derive(Debug, Clone)]
pub struct QrPayload {
    fingerprint: Fingerprint,
    raster: GrayImage,
}

impl QrPayload {
    pub(crate) fn new(fingerprint: Fingerprint, raster: GrayImage) -> Self {
        Self {
            fingerprint,
            raster,
        }
    }

    /// The fingerprint this symbol carries.
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// The greyscale raster (square, quiet zone included).
    pub fn raster(&self) -> &GrayImage {
        &self.raster
    }

    pub fn into_raster(self) -> GrayImage {
        self.raster
    }

    /// Side length in pixels.
    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    /// Encode the raster as a PNG file.
    pub fn to_png(&self) -> Result<Vec<u8>, EncodeError> {
        let mut out = Cursor::new(Vec::new());
        self.raster.write_to(&mut out, ImageFormat::Png)?;
        Ok(out.into_inner())
    }

    /// Suggested download name, e.g. `document-0x3fa2b1c4.png`.
    pub fn file_name(&self) -> String {
        format!("document-{}.png", &self.fingerprint.to_hex()[..10])
    }
}
