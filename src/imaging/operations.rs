//! High-level image operations.
//!
//! These functions combine calculations with pixel work or codec calls.
//! [`compose_cover`] is the synchronous middle stage of the transform;
//! [`image_info`] and [`validate_dimensions`] are the checks the server side
//! runs on an upload independently of the transform.

use super::backend::{BackendError, ImageCodec};
use super::calculations::{CoverPlacement, calculate_cover_placement};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage, RgbImage};
use thiserror::Error;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Scale `source` to cover a square canvas of side `edge`, centre it, and
/// flatten it onto opaque white.
///
/// Only the visible centred square of the source is resampled: the cost is
/// proportional to `min(W, H)²` whatever the aspect ratio, and nothing larger
/// than that square or the canvas is allocated. Transparent source pixels
/// show the white background. The returned canvas is always exactly
/// `edge × edge`.
pub fn compose_cover(source: &DynamicImage, edge: u32) -> (RgbImage, CoverPlacement) {
    let placement = calculate_cover_placement((source.width(), source.height()), edge);

    let visible = source
        .crop_imm(
            placement.crop_x,
            placement.crop_y,
            placement.crop_side,
            placement.crop_side,
        )
        .to_rgba8();
    let scaled = imageops::resize(&visible, edge, edge, FilterType::Lanczos3);

    let mut canvas = RgbaImage::from_pixel(edge, edge, WHITE);
    imageops::overlay(&mut canvas, &scaled, 0, 0);

    (DynamicImage::ImageRgba8(canvas).to_rgb8(), placement)
}

/// Facts about an uploaded image, as reported to the server-side checks.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: String,
    /// Colour layout after decode, e.g. `"Rgba8"`.
    pub color: String,
    /// Encoded size in KiB, rounded to two decimals.
    pub size_kb: f64,
}

/// Decode `bytes` and describe the image.
pub fn image_info(codec: &impl ImageCodec, bytes: &[u8]) -> Result<ImageInfo> {
    let identified = codec.identify(bytes)?;
    let decoded = codec.decode(bytes)?;
    Ok(ImageInfo {
        width: identified.dimensions.width,
        height: identified.dimensions.height,
        format: identified.format,
        color: format!("{:?}", decoded.color()),
        size_kb: (bytes.len() as f64 / 1024.0 * 100.0).round() / 100.0,
    })
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CheckError {
    #[error("Image too small: {width}x{height}px (minimum {min}x{min}px)")]
    TooSmall { width: u32, height: u32, min: u32 },
}

/// Reject images with either side below `min_edge` pixels.
pub fn validate_dimensions(info: &ImageInfo, min_edge: u32) -> std::result::Result<(), CheckError> {
    if info.width < min_edge || info.height < min_edge {
        return Err(CheckError::TooSmall {
            width: info.width,
            height: info.height,
            min: min_edge,
        });
    }
    Ok(())
}
