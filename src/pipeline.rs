//! The cover-photo transform.
//!
//! Turns one user-selected image into a fixed-size square JPEG suitable for
//! the course "cover photo" slot, preserving aspect ratio by cropping rather
//! than distorting.
//!
//! ## Stages
//!
//! ```text
//! validate ─► decode ─► compose ─► encode
//!   sync      await      await     await
//! ```
//!
//! Validation runs before anything is decoded, in a fixed order (first
//! failure wins):
//!
//! 1. declared media type must be on the allow-list → [`TransformError::UnsupportedFormat`]
//! 2. byte length must not exceed the maximum → [`TransformError::FileTooLarge`]
//!
//! Decode, compositing ([`compose_cover`]) and encode all run on Tokio's
//! blocking pool. Compositing resamples the visible `min(W, H)²` square of
//! the source, so its cost grows with the upload and it must not hold up the
//! runtime: a caller's timeout has to be able to fire while it runs.
//!
//! ## Failure handling
//!
//! Every failure comes back as a [`TransformError`] value. A blocking task
//! that panics is reported as the failure of its stage instead of unwinding
//! into the caller: `DecodeFailed` for decode, `EncodeFailed` for compositing
//! and encode. A decoder that hands back an image with no pixels is a
//! `DecodeFailed` too. Nothing is retried.
//!
//! ## Concurrency
//!
//! A pipeline holds no mutable state. Each call owns its raster and canvas,
//! so independent candidates can be transformed concurrently from the same
//! pipeline.

use crate::imaging::{ImageCodec, OutputFormat, TargetSpec, compose_cover};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Largest upload accepted by default: 5 MiB.
pub const DEFAULT_MAX_BYTES: u64 = 5 * 1024 * 1024;

/// Declared media types accepted by default, as browsers report them.
pub const DEFAULT_ALLOWED_TYPES: &[&str] = &["image/jpeg", "image/png", "image/jpg", "image/bmp"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("Unsupported file format: {media_type}")]
    UnsupportedFormat { media_type: String },
    #[error("File too large: {size} bytes (maximum {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },
    #[error("Could not decode image: {0}")]
    DecodeFailed(String),
    #[error("Could not encode image: {0}")]
    EncodeFailed(String),
}

/// A file the user picked, before any processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCandidate {
    pub name: String,
    /// Media type as declared by whoever supplied the file, e.g. `image/png`.
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl UploadCandidate {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    pub fn byte_length(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Read a candidate from disk.
    ///
    /// Without an explicit `media_type`, the type is derived from the file
    /// extension the way a browser file picker does it.
    pub async fn read(path: &Path, media_type: Option<&str>) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let media_type = media_type
            .map(str::to_string)
            .unwrap_or_else(|| media_type_for_path(path).to_string());
        Ok(Self::new(name, media_type, bytes))
    }
}

/// Media type a browser would declare for a file with this extension.
pub fn media_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" | "jpe" | "jfif" => "image/jpeg",
        "png" => "image/png",
        "bmp" | "dib" => "image/bmp",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Which uploads the pipeline accepts at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadLimits {
    pub allowed_types: Vec<String>,
    pub max_bytes: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            allowed_types: DEFAULT_ALLOWED_TYPES.iter().map(|t| t.to_string()).collect(),
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

impl UploadLimits {
    /// Check a candidate without decoding it. Format is checked before size.
    pub fn check(&self, candidate: &UploadCandidate) -> Result<(), TransformError> {
        if !self.allows(&candidate.media_type) {
            return Err(TransformError::UnsupportedFormat {
                media_type: candidate.media_type.clone(),
            });
        }
        let size = candidate.byte_length();
        if size > self.max_bytes {
            return Err(TransformError::FileTooLarge {
                size,
                max: self.max_bytes,
            });
        }
        Ok(())
    }

    fn allows(&self, media_type: &str) -> bool {
        self.allowed_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(media_type))
    }
}

/// A successfully transformed upload, ready to replace the original file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformedUpload {
    /// Name of the original file.
    pub name: String,
    pub format: OutputFormat,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// When the transformed file was produced.
    pub modified: DateTime<Utc>,
}

impl TransformedUpload {
    pub fn byte_length(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// File name for the transformed image: `<stem>-cover.<ext>`.
    ///
    /// ```
    /// # use course_cover::pipeline::TransformedUpload;
    /// # use course_cover::imaging::OutputFormat;
    /// let upload = TransformedUpload {
    ///     name: "Summer School.png".into(),
    ///     format: OutputFormat::Jpeg,
    ///     bytes: vec![],
    ///     width: 1080,
    ///     height: 1080,
    ///     modified: chrono::Utc::now(),
    /// };
    /// assert_eq!(upload.suggested_file_name(), "Summer School-cover.jpg");
    /// ```
    pub fn suggested_file_name(&self) -> String {
        let stem = Path::new(&self.name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "upload".to_string());
        format!("{}-cover.{}", stem, self.format.extension())
    }
}

/// Outcome of one [`ImageTransformPipeline::transform`] call.
pub type TransformResult = Result<TransformedUpload, TransformError>;

/// Validates, decodes, cover-fits and re-encodes uploads.
pub struct ImageTransformPipeline<C> {
    codec: Arc<C>,
    limits: UploadLimits,
}

impl<C: ImageCodec + 'static> ImageTransformPipeline<C> {
    pub fn new(codec: C, limits: UploadLimits) -> Self {
        Self {
            codec: Arc::new(codec),
            limits,
        }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Transform one candidate into a `spec.edge() × spec.edge()` image.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn transform(
        &self,
        candidate: UploadCandidate,
        spec: &TargetSpec,
    ) -> TransformResult {
        self.limits.check(&candidate)?;

        let UploadCandidate {
            name,
            media_type,
            bytes,
        } = candidate;
        log::debug!("decoding {} ({}, {} bytes)", name, media_type, bytes.len());

        let codec = Arc::clone(&self.codec);
        let raster = tokio::task::spawn_blocking(move || codec.decode(&bytes))
            .await
            .map_err(|e| TransformError::DecodeFailed(format!("decoder task failed: {}", e)))?
            .map_err(|e| TransformError::DecodeFailed(e.to_string()))?;

        let (source_w, source_h) = (raster.width(), raster.height());
        if source_w == 0 || source_h == 0 {
            return Err(TransformError::DecodeFailed(format!(
                "decoded image has no pixels ({}x{})",
                source_w, source_h
            )));
        }

        let edge = spec.edge();
        let (canvas, placement) = tokio::task::spawn_blocking(move || compose_cover(&raster, edge))
            .await
            .map_err(|e| TransformError::EncodeFailed(format!("compositing task failed: {}", e)))?;
        log::debug!(
            "{}: {}x{} scaled by {:.4} to {:.0}x{:.0}, offset ({:.1}, {:.1})",
            name,
            source_w,
            source_h,
            placement.scale,
            placement.scaled_width,
            placement.scaled_height,
            placement.x,
            placement.y
        );

        let (width, height) = canvas.dimensions();
        let (format, quality) = (spec.format(), spec.quality());
        let codec = Arc::clone(&self.codec);
        let encoded = tokio::task::spawn_blocking(move || codec.encode(&canvas, format, quality))
            .await
            .map_err(|e| TransformError::EncodeFailed(format!("encoder task failed: {}", e)))?
            .map_err(|e| TransformError::EncodeFailed(e.to_string()))?;

        if encoded.is_empty() {
            return Err(TransformError::EncodeFailed(
                "encoder produced no bytes".to_string(),
            ));
        }
        log::debug!("{}: encoded {} bytes as {}", name, encoded.len(), format);

        Ok(TransformedUpload {
            name,
            format,
            bytes: encoded,
            width,
            height,
            modified: Utc::now(),
        })
    }
}
