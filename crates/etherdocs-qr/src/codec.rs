//! QR encode/decode for fingerprints.

use etherdocs_core::Fingerprint;
use image::{GrayImage, Luma};
use qrcode::{Color, QrCode};
use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, EncodeError};
use crate::payload::QrPayload;

/// Smallest quiet zone (in modules) the QR standard allows.
pub const MIN_QUIET_ZONE: u32 = 4;

/// Largest raster side, in pixels, the encoder will allocate.
pub const MAX_RASTER_SIDE: u32 = 16_384;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// Error-correction level of the emitted symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EcLevel {
    /// ~7% recovery.
    L,
    /// ~15% recovery.
    #[default]
    M,
    /// ~25% recovery.
    Q,
    /// ~30% recovery.
    H,
}

impl From<EcLevel> for qrcode::EcLevel {
    fn from(level: EcLevel) -> Self {
        match level {
            EcLevel::L => qrcode::EcLevel::L,
            EcLevel::M => qrcode::EcLevel::M,
            EcLevel::Q => qrcode::EcLevel::Q,
            EcLevel::H => qrcode::EcLevel::H,
        }
    }
}

/// Configuration for the emitted raster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QrConfig {
    /// Side length of one module in pixels.
    pub module_px: u32,
    /// Light border around the symbol, in modules. Values below
    /// [`MIN_QUIET_ZONE`] are raised to it. Geometry whose raster would
    /// exceed [`MAX_RASTER_SIDE`] fails at encode time.
    pub quiet_zone: u32,
    /// Error-correction level.
    pub ec_level: EcLevel,
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            module_px: 8,
            quiet_zone: MIN_QUIET_ZONE,
            ec_level: EcLevel::M,
        }
    }
}

/// Encoder and decoder for fingerprint QR symbols.
///
/// Stateless apart from its configuration; share freely.
#[derive(Debug, Clone, Default)]
pub struct QrCodec {
    config: QrConfig,
}

impl QrCodec {
    /// Create a codec, normalizing out-of-range settings.
    pub fn new(mut config: QrConfig) -> Self {
        config.module_px = config.module_px.max(1);
        config.quiet_zone = config.quiet_zone.max(MIN_QUIET_ZONE);
        Self { config }
    }

    /// The effective configuration.
    pub fn config(&self) -> &QrConfig {
        &self.config
    }

    /// Encode a fingerprint as a greyscale QR raster.
    pub fn encode(&self, fingerprint: &Fingerprint) -> Result<QrPayload, EncodeError> {
        let raster = self.render_text(&fingerprint.to_hex())?;
        tracing::debug!(
            fingerprint = %fingerprint,
            side = raster.width(),
            "encoded fingerprint QR"
        );
        Ok(QrPayload::new(*fingerprint, raster))
    }

    /// Decode the fingerprint carried by a raster.
    pub fn decode(&self, image: &GrayImage) -> Result<Fingerprint, DecodeError> {
        let text = decode_text(image)?;
        Fingerprint::parse(&text)
            .map_err(|reason| DecodeError::NotAFingerprint { decoded: text, reason })
    }

    /// Decode the fingerprint carried by an encoded image file (PNG, JPEG).
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<Fingerprint, DecodeError> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| DecodeError::MalformedImage(e.to_string()))?;
        self.decode(&image.to_luma8())
    }

    /// Render arbitrary text as a QR raster using this codec's geometry.
    pub fn render_text(&self, text: &str) -> Result<GrayImage, EncodeError> {
        let code =
            QrCode::with_error_correction_level(text.as_bytes(), self.config.ec_level.into())
                .map_err(|e| EncodeError::Symbol(e.to_string()))?;

        let modules = code.width() as u32;
        let colors = code.to_colors();
        let quiet = self.config.quiet_zone;
        let px = self.config.module_px;

        let side = raster_side(modules, quiet, px)?;

        Ok(GrayImage::from_fn(side, side, |x, y| {
            let (mx, my) = (x / px, y / px);
            if mx < quiet || my < quiet || mx >= quiet + modules || my >= quiet + modules {
                return LIGHT;
            }
            let index = ((my - quiet) * modules + (mx - quiet)) as usize;
            match colors[index] {
                Color::Dark => DARK,
                Color::Light => LIGHT,
            }
        }))
    }
}

/// Pixel side of a raster; computed wide so no geometry can overflow.
fn raster_side(modules: u32, quiet: u32, px: u32) -> Result<u32, EncodeError> {
    let side = u64::from(quiet)
        .checked_mul(2)
        .and_then(|border| border.checked_add(u64::from(modules)))
        .and_then(|span| span.checked_mul(u64::from(px)))
        .unwrap_or(u64::MAX);
    if side > u64::from(MAX_RASTER_SIDE) {
        return Err(EncodeError::RasterTooLarge(side));
    }
    Ok(side as u32)
}

/// Locate and decode the first readable symbol in a raster.
fn decode_text(image: &GrayImage) -> Result<String, DecodeError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(DecodeError::NoCodeFound);
    }

    let mut prepared =
        rqrr::PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
            image.get_pixel(x as u32, y as u32).0[0]
        });
    let grids = prepared.detect_grids();
    if grids.is_empty() {
        return Err(DecodeError::NoCodeFound);
    }

    let mut last_failure = String::new();
    for grid in &grids {
        match grid.decode() {
            Ok((_meta, content)) => return Ok(content),
            Err(e) => last_failure = format!("{e:?}"),
        }
    }

    tracing::debug!(symbols = grids.len(), %last_failure, "QR symbols located but none decoded");
    Err(DecodeError::UnreadableCode(last_failure))
}
