//! Configuration module.
//!
//! Handles loading, validating, and merging the `course-cover.toml` file.
//! Stock defaults are the reference behaviour of the upload form; a user
//! config file overrides any subset of them.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [target]
//! edge = 1080                # Output width and height in pixels
//! output_type = "image/jpeg" # Output encoding (JPEG only)
//! quality = 0.92             # Lossy quality factor, 0.0-1.0
//!
//! [upload]
//! max_bytes = 5242880        # Largest accepted upload (5 MiB)
//! allowed_types = ["image/jpeg", "image/png", "image/jpg", "image/bmp"]
//!
//! [validation]
//! min_edge = 500             # Smallest side accepted by `check`
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse: override just the values you want:
//!
//! ```toml
//! [target]
//! edge = 720
//! ```
//!
//! Unknown keys are rejected to catch typos early.
//!
//! ## Layering
//!
//! Loading works on raw TOML values: the stock defaults are serialised to a
//! table ([`stock_defaults_value`]), the user file is merged over it
//! ([`merge_toml`]), and only the merged result is deserialised and
//! validated ([`resolve_config`]). Today there is a single user layer, and
//! `#[serde(default)]` alone would fill missing keys for it. The merge step
//! exists so further layers (a system-wide file, per-deployment overrides)
//! can be stacked with `merge_toml` without touching the structs.

use crate::imaging::{OutputFormat, Quality, TargetSpec};
use crate::pipeline::{DEFAULT_ALLOWED_TYPES, DEFAULT_MAX_BYTES, UploadLimits};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "course-cover.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `course-cover.toml`.
///
/// All fields have defaults matching the registration form. Unknown keys are
/// rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoverConfig {
    /// Output geometry and encoding.
    pub target: TargetConfig,
    /// Which uploads are accepted before decoding.
    pub upload: UploadConfig,
    /// Server-side checks run by `check`.
    pub validation: ValidationConfig,
}

impl CoverConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target.edge == 0 {
            return Err(ConfigError::Validation(
                "target.edge must be greater than 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.target.quality) {
            return Err(ConfigError::Validation(
                "target.quality must be 0.0-1.0".into(),
            ));
        }
        if OutputFormat::from_mime(&self.target.output_type).is_none() {
            return Err(ConfigError::Validation(format!(
                "target.output_type {:?} is not supported (use \"image/jpeg\")",
                self.target.output_type
            )));
        }
        if self.upload.allowed_types.is_empty() {
            return Err(ConfigError::Validation(
                "upload.allowed_types must not be empty".into(),
            ));
        }
        if self.upload.max_bytes == 0 {
            return Err(ConfigError::Validation(
                "upload.max_bytes must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// The output description the pipeline should produce.
    pub fn target_spec(&self) -> Result<TargetSpec, ConfigError> {
        let format = OutputFormat::from_mime(&self.target.output_type).ok_or_else(|| {
            ConfigError::Validation(format!(
                "target.output_type {:?} is not supported",
                self.target.output_type
            ))
        })?;
        TargetSpec::new(self.target.edge, format, Quality::new(self.target.quality)).ok_or_else(
            || ConfigError::Validation("target.edge must be greater than 0".into()),
        )
    }

    /// The pre-decode limits the pipeline enforces.
    pub fn upload_limits(&self) -> UploadLimits {
        UploadLimits {
            allowed_types: self.upload.allowed_types.clone(),
            max_bytes: self.upload.max_bytes,
        }
    }
}

/// Output geometry and encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetConfig {
    /// Output width and height in pixels.
    pub edge: u32,
    /// Output MIME type. Only JPEG is supported.
    pub output_type: String,
    /// Lossy quality factor (0.0 = worst, 1.0 = best).
    pub quality: f32,
}

impl Default for TargetConfig {
    fn default() -> Self {
        let spec = TargetSpec::default();
        Self {
            edge: spec.edge(),
            output_type: spec.format().mime_type().to_string(),
            quality: spec.quality().value(),
        }
    }
}

/// Limits checked before an upload is decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    /// Largest accepted upload in bytes.
    pub max_bytes: u64,
    /// Declared media types accepted.
    pub allowed_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            allowed_types: DEFAULT_ALLOWED_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Server-side image checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    /// Smallest width or height accepted, in pixels.
    pub min_edge: u32,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { min_edge: 500 }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(CoverConfig::default()).unwrap_or_else(|_| toml::Value::Table(Default::default()))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<CoverConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: CoverConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the file at `path`.
///
/// A missing file yields the stock defaults. Otherwise user values are merged
/// on top of stock defaults, unknown keys are rejected, and the result is
/// validated.
pub fn load_config(path: &Path) -> Result<CoverConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `course-cover.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Course Cover Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output image
# ---------------------------------------------------------------------------
[target]
# Width and height of the square output, in pixels.
edge = 1080

# Output encoding. Only "image/jpeg" is supported: the canvas has no alpha.
output_type = "image/jpeg"

# Lossy quality factor (0.0 = worst, 1.0 = best).
quality = 0.92

# ---------------------------------------------------------------------------
# Upload limits (checked before decoding, format first)
# ---------------------------------------------------------------------------
[upload]
# Largest accepted upload in bytes (5 MiB).
max_bytes = 5242880

# Media types accepted, as the browser declares them.
allowed_types = ["image/jpeg", "image/png", "image/jpg", "image/bmp"]

# ---------------------------------------------------------------------------
# Server-side checks (used by `course-cover check`)
# ---------------------------------------------------------------------------
[validation]
# Smallest accepted width or height, in pixels.
min_edge = 500
"##
}
