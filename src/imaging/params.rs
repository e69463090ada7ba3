//! Parameter types for the cover transform.
//!
//! These structs describe *what* to produce, not *how*. They are the interface
//! between the [`pipeline`](crate::pipeline) (which decides what the output
//! must look like) and the [`backend`](super::backend) (which does the actual
//! pixel and codec work).
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality factor in `[0, 1]` (default 0.92). Clamped on construction.
//! - [`OutputFormat`]: The output encoding. Only JPEG, since the canvas carries no alpha.
//! - [`TargetSpec`]: Full description of the output: square edge, format, quality.

use super::calculations::encoder_quality;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quality factor for lossy image encoding, in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quality(f32);

impl Quality {
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// The 1-100 scale codecs expect.
    pub fn encoder_value(self) -> u8 {
        encoder_quality(self.0)
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(0.92)
    }
}

/// Output encoding of the transformed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    #[default]
    Jpeg,
}

impl OutputFormat {
    /// Parse a MIME type. Returns `None` for anything we cannot encode.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Fixed description of the square output every upload is turned into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSpec {
    edge: u32,
    format: OutputFormat,
    quality: Quality,
}

impl TargetSpec {
    /// Build a target. Returns `None` when `edge` is zero.
    pub fn new(edge: u32, format: OutputFormat, quality: Quality) -> Option<Self> {
        (edge > 0).then_some(Self {
            edge,
            format,
            quality,
        })
    }

    pub fn edge(&self) -> u32 {
        self.edge
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }
}

impl Default for TargetSpec {
    /// 1080×1080 JPEG at quality 0.92.
    fn default() -> Self {
        Self {
            edge: 1080,
            format: OutputFormat::Jpeg,
            quality: Quality::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(-1.0).value(), 0.0);
        assert_eq!(Quality::new(0.5).value(), 0.5);
        assert_eq!(Quality::new(1.5).value(), 1.0);
    }

    #[test]
    fn quality_nan_falls_back_to_default() {
        assert_eq!(Quality::new(f32::NAN), Quality::default());
    }

    #[test]
    fn quality_default_is_092() {
        assert_eq!(Quality::default().value(), 0.92);
        assert_eq!(Quality::default().encoder_value(), 92);
    }

    #[test]
    fn output_format_accepts_jpeg_aliases() {
        assert_eq!(OutputFormat::from_mime("image/jpeg"), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_mime("IMAGE/JPG"), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_mime("image/png"), None);
    }

    #[test]
    fn target_rejects_zero_edge() {
        assert!(TargetSpec::new(0, OutputFormat::Jpeg, Quality::default()).is_none());
        let spec = TargetSpec::new(64, OutputFormat::Jpeg, Quality::new(0.8)).unwrap();
        assert_eq!(spec.edge(), 64);
        assert_eq!(spec.quality().encoder_value(), 80);
    }

    #[test]
    fn target_default_is_reference_geometry() {
        let spec = TargetSpec::default();
        assert_eq!(spec.edge(), 1080);
        assert_eq!(spec.format(), OutputFormat::Jpeg);
        assert_eq!(spec.quality(), Quality::new(0.92));
    }
}
