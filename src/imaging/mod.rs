//! Image processing in pure Rust, built on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **Decode** | `image::ImageReader::decode` (JPEG, PNG, BMP) |
//! | **Cover fit** | `imageops::resize` (Lanczos3) + `imageops::overlay` on white |
//! | **Encode** | `JpegEncoder::new_with_quality` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for cover-fit geometry (unit testable)
//! - **Parameters**: Value types describing the output
//! - **Backend**: [`ImageCodec`] trait + [`RustCodec`]
//! - **Operations**: Compositing and upload checks combining calculations + codec

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageCodec};
pub use calculations::{CoverPlacement, calculate_cover_placement};
pub use operations::{CheckError, ImageInfo, compose_cover, image_info, validate_dimensions};
pub use params::{OutputFormat, Quality, TargetSpec};
pub use rust_backend::RustCodec;
