//! Pure Rust codec built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::ImageReader::with_guessed_format` + `into_dimensions` |
//! | Decode (JPEG, PNG, BMP) | `ImageReader::decode` (format sniffed from the bytes, not the declared type) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder::new_with_quality` |

use super::backend::{BackendError, Dimensions, Identified, ImageCodec};
use super::params::{OutputFormat, Quality};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader, RgbImage};
use std::io::Cursor;

/// Formats whose decoders are compiled in.
const DECODABLE: &[ImageFormat] = &[ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::Bmp];

/// Pure Rust codec using the `image` crate.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustCodec;

impl RustCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustCodec {
    fn default() -> Self {
        Self::new()
    }
}

fn guessed_reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, BackendError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(BackendError::Io)?;
    match reader.format() {
        Some(fmt) if DECODABLE.contains(&fmt) => Ok(reader),
        Some(fmt) => Err(BackendError::ProcessingFailed(format!(
            "No decoder for {:?}",
            fmt
        ))),
        None => Err(BackendError::ProcessingFailed(
            "Unrecognised image data".to_string(),
        )),
    }
}

impl ImageCodec for RustCodec {
    fn identify(&self, bytes: &[u8]) -> Result<Identified, BackendError> {
        let reader = guessed_reader(bytes)?;
        let format = reader
            .format()
            .map(|f| format!("{:?}", f))
            .unwrap_or_default();
        let (width, height) = reader.into_dimensions().map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
        })?;
        Ok(Identified {
            dimensions: Dimensions { width, height },
            format,
        })
    }

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError> {
        let img = guessed_reader(bytes)?
            .decode()
            .map_err(|e| BackendError::ProcessingFailed(format!("Failed to decode: {}", e)))?;
        if img.width() == 0 || img.height() == 0 {
            return Err(BackendError::ProcessingFailed(
                "Decoded image has no pixels".to_string(),
            ));
        }
        Ok(img)
    }

    fn encode(
        &self,
        canvas: &RgbImage,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError> {
        let mut buffer = Vec::new();
        match format {
            OutputFormat::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.encoder_value());
                canvas.write_with_encoder(encoder).map_err(|e| {
                    BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e))
                })?;
            }
        }
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageEncoder, Rgb, RgbaImage};

    /// Encode a small gradient as JPEG.
    fn test_jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let mut out = Vec::new();
        JpegEncoder::new(&mut out)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .unwrap();
        out
    }

    fn test_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::new(width, height);
        let mut out = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn identify_synthetic_jpeg() {
        let codec = RustCodec::new();
        let id = codec.identify(&test_jpeg(200, 150)).unwrap();
        assert_eq!(id.dimensions, Dimensions { width: 200, height: 150 });
        assert_eq!(id.format, "Jpeg");
    }

    #[test]
    fn identify_synthetic_png() {
        let codec = RustCodec::new();
        let id = codec.identify(&test_png(30, 40)).unwrap();
        assert_eq!(id.dimensions, Dimensions { width: 30, height: 40 });
        assert_eq!(id.format, "Png");
    }

    #[test]
    fn identify_garbage_errors() {
        let codec = RustCodec::new();
        assert!(codec.identify(b"definitely not an image").is_err());
    }

    #[test]
    fn decode_synthetic_jpeg() {
        let codec = RustCodec::new();
        let img = codec.decode(&test_jpeg(64, 48)).unwrap();
        assert_eq!((img.width(), img.height()), (64, 48));
    }

    #[test]
    fn decode_png_keeps_alpha() {
        let codec = RustCodec::new();
        let img = codec.decode(&test_png(10, 10)).unwrap();
        assert!(img.color().has_alpha());
    }

    #[test]
    fn decode_truncated_jpeg_errors() {
        let codec = RustCodec::new();
        let mut bytes = test_jpeg(64, 64);
        bytes.truncate(40);
        assert!(codec.decode(&bytes).is_err());
    }

    #[test]
    fn decode_gif_signature_errors() {
        let codec = RustCodec::new();
        let result = codec.decode(b"GIF89a\x01\x00\x01\x00\x00\x00\x00;");
        assert!(result.is_err());
    }

    #[test]
    fn encode_jpeg_roundtrips_dimensions() {
        let codec = RustCodec::new();
        let canvas = RgbImage::from_pixel(32, 32, Rgb([255, 255, 255]));
        let bytes = codec
            .encode(&canvas, OutputFormat::Jpeg, Quality::default())
            .unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

        let id = codec.identify(&bytes).unwrap();
        assert_eq!(id.dimensions, Dimensions { width: 32, height: 32 });
    }

    #[test]
    fn lower_quality_produces_smaller_file() {
        let codec = RustCodec::new();
        let canvas = RgbImage::from_fn(128, 128, |x, y| {
            Rgb([(x * 2) as u8, (y * 2) as u8, ((x + y) % 256) as u8])
        });
        let high = codec
            .encode(&canvas, OutputFormat::Jpeg, Quality::new(0.95))
            .unwrap();
        let low = codec
            .encode(&canvas, OutputFormat::Jpeg, Quality::new(0.2))
            .unwrap();
        assert!(low.len() < high.len());
    }
}
