//! Image codec trait and shared types.
//!
//! The [`ImageCodec`] trait defines the three operations every codec must
//! support: identify, decode, and encode. Everything between decode and
//! encode (scaling, cropping, compositing) is plain pixel work in
//! [`operations`](super::operations) and does not go through the codec.
//!
//! The production implementation is
//! [`RustCodec`](super::rust_backend::RustCodec), pure Rust and built on the
//! `image` crate.

use super::params::{OutputFormat, Quality};
use image::{DynamicImage, RgbImage};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Header-level facts about an encoded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identified {
    pub dimensions: Dimensions,
    /// Container format detected from the bytes, e.g. `"Jpeg"`.
    pub format: String,
}

/// Trait for image codecs.
///
/// Implementations must be `Send + Sync`: the pipeline hands the codec to
/// blocking worker threads for decode and encode.
pub trait ImageCodec: Send + Sync {
    /// Detect format and dimensions without a full decode.
    fn identify(&self, bytes: &[u8]) -> Result<Identified, BackendError>;

    /// Decode encoded bytes into a raster.
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError>;

    /// Encode an opaque canvas.
    fn encode(
        &self,
        canvas: &RgbImage,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock codec that records operations and returns canned results.
    /// Uses Mutex (not RefCell) so it is Sync and can cross into blocking tasks.
    #[derive(Default)]
    pub struct MockCodec {
        /// Raster returned by `decode`; `None` makes decode fail.
        pub decoded: Mutex<Option<DynamicImage>>,
        /// When set, `encode` returns an empty buffer.
        pub encode_empty: bool,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Identify { len: usize },
        Decode { len: usize },
        Encode {
            width: u32,
            height: u32,
            format: OutputFormat,
            quality: u8,
        },
    }

    impl MockCodec {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn decoding_to(image: DynamicImage) -> Self {
            Self {
                decoded: Mutex::new(Some(image)),
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }
    }

    impl ImageCodec for MockCodec {
        fn identify(&self, bytes: &[u8]) -> Result<Identified, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Identify { len: bytes.len() });

            self.decoded
                .lock()
                .unwrap()
                .as_ref()
                .map(|img| Identified {
                    dimensions: Dimensions {
                        width: img.width(),
                        height: img.height(),
                    },
                    format: "Mock".to_string(),
                })
                .ok_or_else(|| BackendError::ProcessingFailed("No mock image".to_string()))
        }

        fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Decode { len: bytes.len() });

            self.decoded
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| BackendError::ProcessingFailed("No mock image".to_string()))
        }

        fn encode(
            &self,
            canvas: &RgbImage,
            format: OutputFormat,
            quality: Quality,
        ) -> Result<Vec<u8>, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Encode {
                width: canvas.width(),
                height: canvas.height(),
                format,
                quality: quality.encoder_value(),
            });
            if self.encode_empty {
                Ok(Vec::new())
            } else {
                Ok(vec![0xFF, 0xD8, 0xFF, 0xD9])
            }
        }
    }

    #[test]
    fn mock_records_decode() {
        let codec = MockCodec::decoding_to(DynamicImage::new_rgb8(8, 6));

        let img = codec.decode(&[1, 2, 3]).unwrap();
        assert_eq!((img.width(), img.height()), (8, 6));

        let ops = codec.get_operations();
        assert_eq!(ops, vec![RecordedOp::Decode { len: 3 }]);
    }

    #[test]
    fn mock_without_image_fails_decode() {
        let codec = MockCodec::new();
        assert!(codec.decode(&[0]).is_err());
    }

    #[test]
    fn mock_records_encode() {
        let codec = MockCodec::new();
        let canvas = RgbImage::new(4, 4);

        let bytes = codec
            .encode(&canvas, OutputFormat::Jpeg, Quality::new(0.85))
            .unwrap();
        assert!(!bytes.is_empty());

        let ops = codec.get_operations();
        assert!(matches!(
            &ops[0],
            RecordedOp::Encode {
                width: 4,
                height: 4,
                quality: 85,
                ..
            }
        ));
    }
}
