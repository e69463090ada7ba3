//! # Course Cover
//!
//! Turns the photo an instructor picks for a course into the fixed-size square
//! cover the registration form expects. Any JPEG, PNG or BMP goes in; a
//! 1080×1080 JPEG comes out, scaled to fill the square and centre-cropped so
//! nothing is ever distorted.
//!
//! # Architecture: One Linear Transform
//!
//! ```text
//! UploadCandidate ─► validate ─► decode ─► compose ─► encode ─► TransformedUpload
//!                    (limits)    (codec)   (pixels)   (codec)
//! ```
//!
//! Validation is cheap and runs first, so rejected files are never decoded.
//! Decode, compositing and encode all scale with the size of the upload, so
//! each runs on Tokio's blocking pool and the runtime stays free to fire
//! timeouts.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | The transform itself: limits, candidates, typed failures |
//! | [`upload`] | The upload field: keeps at most one transformed file, emits progress events |
//! | [`imaging`] | Cover-fit geometry, compositing, the codec trait and its `image`-crate implementation |
//! | [`config`] | `course-cover.toml` loading, validation and merging over stock defaults |
//! | [`output`] | CLI output formatting and user-facing failure messages |
//!
//! # Design Decisions
//!
//! ## Cover, Never Contain
//!
//! The source is scaled by `max(edge / W, edge / H)` so the square is always
//! fully covered. The overflowing dimension is cropped equally on both sides.
//! Letterboxing would leave bars on the course card; stretching would distort
//! faces.
//!
//! ## White, Opaque Output
//!
//! JPEG has no alpha channel, so every canvas starts white and transparent
//! PNG regions composite onto it. A logo on a transparent background ends up
//! on white instead of black.
//!
//! ## Failures Clear the Field
//!
//! When a transform fails the upload field is emptied. Submitting the
//! untransformed original would bypass the size and format guarantees the
//! rest of the system relies on.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, resampling (Lanczos3) and JPEG encoding all come from the
//! `image` crate. No system libraries are needed, so the binary runs anywhere.

pub mod config;
pub mod imaging;
pub mod output;
pub mod pipeline;
pub mod upload;
