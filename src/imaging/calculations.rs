//! Pure calculation functions for cover-fit geometry.
//!
//! All functions here are pure and testable without any I/O or images.

/// Where a source image lands on a square canvas under a "cover" fit.
///
/// The exact (fractional) geometry is kept alongside the whole-pixel source
/// crop actually used for compositing: on a square canvas the visible part
/// of the source is always its centred square of side `min(W, H)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverPlacement {
    /// Uniform scale factor `max(edge / W, edge / H)`.
    pub scale: f64,
    /// Scaled source width `W * scale`.
    pub scaled_width: f64,
    /// Scaled source height `H * scale`.
    pub scaled_height: f64,
    /// Horizontal offset `(edge - scaled_width) / 2`. Never positive.
    pub x: f64,
    /// Vertical offset `(edge - scaled_height) / 2`. Never positive.
    pub y: f64,
    /// Left edge of the visible source square, in source pixels.
    pub crop_x: u32,
    /// Top edge of the visible source square, in source pixels.
    pub crop_y: u32,
    /// Side of the visible source square, in source pixels.
    pub crop_side: u32,
}

/// Calculate how a `source` image covers a square canvas of side `edge`.
///
/// The smaller source dimension maps exactly onto the edge; the larger one
/// overflows and is cropped symmetrically on both sides. Both source
/// dimensions must be non-zero.
///
/// The crop is whole source pixels. When `max(W, H) - min(W, H)` is odd the
/// extra pixel comes off the right (or bottom) edge, so the crop sits half a
/// source pixel before the exact centre given by `x` / `y`.
///
/// # Examples
/// ```
/// # use course_cover::imaging::calculate_cover_placement;
/// // 2000x1000 landscape onto 1080: scale 1.08, 2160x1080, shifted left 540px
/// let p = calculate_cover_placement((2000, 1000), 1080);
/// assert_eq!((p.scaled_width, p.scaled_height), (2160.0, 1080.0));
/// assert_eq!((p.x, p.y), (-540.0, 0.0));
/// // which shows the middle 1000x1000 of the source
/// assert_eq!((p.crop_x, p.crop_y, p.crop_side), (500, 0, 1000));
/// ```
pub fn calculate_cover_placement(source: (u32, u32), edge: u32) -> CoverPlacement {
    let (src_w, src_h) = source;
    let target = edge as f64;
    let w = src_w as f64;
    let h = src_h as f64;

    let scale = (target / w).max(target / h);

    // The matched side is pinned to the edge so square and exact-ratio
    // sources produce offsets of exactly zero.
    let (scaled_width, scaled_height) = if src_w >= src_h {
        (target * w / h, target)
    } else {
        (target, target * h / w)
    };

    let crop_side = src_w.min(src_h);

    CoverPlacement {
        scale,
        scaled_width,
        scaled_height,
        x: (target - scaled_width) / 2.0,
        y: (target - scaled_height) / 2.0,
        crop_x: (src_w - crop_side) / 2,
        crop_y: (src_h - crop_side) / 2,
        crop_side,
    }
}

/// Encoder quality (1-100) for a quality factor in `[0, 1]`.
pub fn encoder_quality(factor: f32) -> u8 {
    (factor.clamp(0.0, 1.0) * 100.0).round().clamp(1.0, 100.0) as u8
}
