//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Transform
//!
//! ```text
//! Processing holiday.png
//!     Image resized to 1080x1080px
//!     Size: 214.3 KB
//! ```
//!
//! On failure the second line is the message a user sees next to the upload
//! field, followed by the technical reason:
//!
//! ```text
//! Processing anim.gif
//!     Unsupported file format. Use JPEG, PNG, JPG or BMP.
//!     Reason: Unsupported file format: image/gif
//! ```
//!
//! ## Info / Check
//!
//! ```text
//! holiday.png
//!     Dimensions: 2000x1000
//!     Format: Png (Rgba8)
//!     Size: 812.55 KB
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::imaging::ImageInfo;
use crate::pipeline::TransformError;
use crate::upload::UploadEvent;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable size for limits, e.g. `5MB` or `1.5MB`.
fn format_limit(bytes: u64) -> String {
    let (value, unit) = if bytes >= MIB {
        (bytes as f64 / MIB as f64, "MB")
    } else if bytes >= KIB {
        (bytes as f64 / KIB as f64, "KB")
    } else {
        return format!("{}B", bytes);
    };
    if value.fract() == 0.0 {
        format!("{}{}", value as u64, unit)
    } else {
        format!("{:.1}{}", value, unit)
    }
}

/// The message shown to the user for a rejected upload.
///
/// Decode and encode failures share one message: the user can only retry or
/// pick another file either way.
pub fn user_message(error: &TransformError) -> String {
    match error {
        TransformError::UnsupportedFormat { .. } => {
            "Unsupported file format. Use JPEG, PNG, JPG or BMP.".to_string()
        }
        TransformError::FileTooLarge { max, .. } => {
            format!("File too large. Maximum size: {}", format_limit(*max))
        }
        TransformError::DecodeFailed(_) | TransformError::EncodeFailed(_) => {
            "Could not process image. Try again.".to_string()
        }
    }
}

// ============================================================================
// Transform
// ============================================================================

/// Format a single upload progress event as display lines.
pub fn format_upload_event(event: &UploadEvent) -> Vec<String> {
    match event {
        UploadEvent::ProcessingStarted { name } => vec![format!("Processing {}", name)],
        UploadEvent::Succeeded {
            width,
            height,
            bytes,
            ..
        } => vec![
            format!("{}Image resized to {}x{}px", indent(1), width, height),
            format!("{}Size: {:.1} KB", indent(1), *bytes as f64 / KIB as f64),
        ],
        UploadEvent::Failed { error, .. } => vec![
            format!("{}{}", indent(1), user_message(error)),
            format!("{}Reason: {}", indent(1), error),
        ],
    }
}

pub fn print_upload_event(event: &UploadEvent) {
    for line in format_upload_event(event) {
        println!("{}", line);
    }
}

// ============================================================================
// Info / Check
// ============================================================================

/// Format decoded image facts under the file name.
pub fn format_image_info(name: &str, info: &ImageInfo) -> Vec<String> {
    vec![
        name.to_string(),
        format!("{}Dimensions: {}x{}", indent(1), info.width, info.height),
        format!("{}Format: {} ({})", indent(1), info.format, info.color),
        format!("{}Size: {:.2} KB", indent(1), info.size_kb),
    ]
}

pub fn print_image_info(name: &str, info: &ImageInfo) {
    for line in format_image_info(name, info) {
        println!("{}", line);
    }
}

/// Format the result of `check`: image facts when the file decoded, then
/// one line per problem, or a success line when there are none.
pub fn format_check_output(name: &str, info: Option<&ImageInfo>, problems: &[String]) -> Vec<String> {
    let mut lines = match info {
        Some(info) => format_image_info(name, info),
        None => vec![name.to_string()],
    };
    if problems.is_empty() {
        lines.push("==> Image is valid".to_string());
    } else {
        for problem in problems {
            lines.push(format!("{}Problem: {}", indent(1), problem));
        }
    }
    lines
}

pub fn print_check_output(name: &str, info: Option<&ImageInfo>, problems: &[String]) {
    for line in format_check_output(name, info, problems) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> ImageInfo {
        ImageInfo {
            width: 2000,
            height: 1000,
            format: "Jpeg".to_string(),
            color: "Rgb8".to_string(),
            size_kb: 245.5,
        }
    }

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn format_limit_whole_megabytes() {
        assert_eq!(format_limit(5 * MIB), "5MB");
    }

    #[test]
    fn format_limit_fractional_megabytes() {
        assert_eq!(format_limit(3 * MIB / 2), "1.5MB");
    }

    #[test]
    fn format_limit_small_values() {
        assert_eq!(format_limit(512 * KIB), "512KB");
        assert_eq!(format_limit(100), "100B");
    }

    // =========================================================================
    // User messages
    // =========================================================================

    #[test]
    fn unsupported_format_message() {
        let err = TransformError::UnsupportedFormat {
            media_type: "image/gif".into(),
        };
        assert_eq!(
            user_message(&err),
            "Unsupported file format. Use JPEG, PNG, JPG or BMP."
        );
    }

    #[test]
    fn too_large_message_uses_limit() {
        let err = TransformError::FileTooLarge {
            size: 5 * MIB + 1,
            max: 5 * MIB,
        };
        assert_eq!(user_message(&err), "File too large. Maximum size: 5MB");
    }

    #[test]
    fn codec_failures_share_retry_message() {
        let decode = TransformError::DecodeFailed("bad header".into());
        let encode = TransformError::EncodeFailed("out of memory".into());
        assert_eq!(user_message(&decode), "Could not process image. Try again.");
        assert_eq!(user_message(&decode), user_message(&encode));
    }

    // =========================================================================
    // Upload event formatting tests
    // =========================================================================

    #[test]
    fn format_started() {
        let event = UploadEvent::ProcessingStarted {
            name: "holiday.png".into(),
        };
        assert_eq!(format_upload_event(&event), vec!["Processing holiday.png"]);
    }

    #[test]
    fn format_succeeded() {
        let event = UploadEvent::Succeeded {
            name: "holiday.png".into(),
            width: 1080,
            height: 1080,
            bytes: 2048,
        };
        let lines = format_upload_event(&event);
        assert_eq!(lines[0], "    Image resized to 1080x1080px");
        assert_eq!(lines[1], "    Size: 2.0 KB");
    }

    #[test]
    fn format_failed() {
        let event = UploadEvent::Failed {
            name: "anim.gif".into(),
            error: TransformError::UnsupportedFormat {
                media_type: "image/gif".into(),
            },
        };
        let lines = format_upload_event(&event);
        assert_eq!(
            lines,
            vec![
                "    Unsupported file format. Use JPEG, PNG, JPG or BMP.",
                "    Reason: Unsupported file format: image/gif",
            ]
        );
    }

    // =========================================================================
    // Info / check formatting tests
    // =========================================================================

    #[test]
    fn format_info_lines() {
        let lines = format_image_info("photo.jpg", &info());
        assert_eq!(
            lines,
            vec![
                "photo.jpg",
                "    Dimensions: 2000x1000",
                "    Format: Jpeg (Rgb8)",
                "    Size: 245.50 KB",
            ]
        );
    }

    #[test]
    fn format_check_valid() {
        let lines = format_check_output("photo.jpg", Some(&info()), &[]);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[4], "==> Image is valid");
    }

    #[test]
    fn format_check_problems_without_info() {
        let problems = vec!["Could not decode image: truncated".to_string()];
        let lines = format_check_output("broken.jpg", None, &problems);
        assert_eq!(
            lines,
            vec!["broken.jpg", "    Problem: Could not decode image: truncated"]
        );
    }
}
