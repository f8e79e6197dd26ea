//! Target rectangles and the fixed-point coordinate transform.
//!
//! Every peer renders its own copy of the shared element, usually at a
//! different size.  Pointer positions therefore never travel as pixels: the
//! sender expresses a position as a fraction of its element's width and
//! height, scaled to the full `u16` range, and the receiver scales that
//! fraction back up against *its own* element.
//!
//! ```text
//!  sender (100×100)          wire               receiver (200×200)
//!  (50, 50)  ──normalize──►  (32767, 32767)  ──denormalize──►  (100, 100)
//! ```
//!
//! # Fixed-point representation (for beginners)
//!
//! A fraction between 0.0 and 1.0 could be sent as an `f32`, but a `u16`
//! scaled to `0..=65535` is half the size and has more than enough precision
//! for pixel positions: one step is 1/65535 of the element, far below a pixel
//! for any element narrower than 65535 pixels.
//!
//! # Points outside the element
//!
//! Pointer samples can land a little outside the element (the pointer left
//! between two samples).  No clamping is applied.  The scaled value is
//! truncated toward zero and then narrowed to 16 bits with wrap-around, so a
//! point one percent left of the element encodes near the top of the range.

use serde::{Deserialize, Serialize};

/// Largest normalized value; a coordinate on the right or bottom edge.
pub const NORMALIZED_MAX: u16 = u16::MAX;

const SCALE: f64 = NORMALIZED_MAX as f64;

/// Absolute position and size of the element a session is attached to.
///
/// Uses the same unit and origin as the pointer samples (CSS pixels relative
/// to the document in a browser).  A rect is a snapshot: it goes stale as soon
/// as the element moves or resizes, so it is recomputed rather than stored.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TargetRect {
    /// X coordinate of the top-left corner.
    pub x: f64,
    /// Y coordinate of the top-left corner.
    pub y: f64,
    /// Width of the element.
    pub width: f64,
    /// Height of the element.
    pub height: f64,
}

impl TargetRect {
    /// The rect reported when no element is attached.
    pub const ZERO: TargetRect = TargetRect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    /// Creates a rect from its top-left corner and size.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns `true` when the rect has no usable area.
    ///
    /// Zero, negative and NaN extents all count as degenerate.  Normalizing
    /// against such a rect yields meaningless numbers.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// A position expressed as a fraction of a [`TargetRect`], scaled to `u16`.
///
/// `0` is the left/top edge and [`NORMALIZED_MAX`] the right/bottom edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: u16,
    pub y: u16,
}

impl NormalizedPoint {
    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// Converts an absolute point into a [`NormalizedPoint`] relative to `rect`.
///
/// Each axis is computed as `trunc((abs - origin) / extent * 65535)` and then
/// narrowed to 16 bits with wrap-around.  Points outside the rect are not
/// clamped.  A degenerate rect produces an arbitrary value but never panics.
///
/// # Examples
///
/// ```rust
/// use cursor_core::domain::geometry::{normalize, TargetRect};
///
/// let rect = TargetRect::new(0.0, 0.0, 100.0, 100.0);
/// let point = normalize(50.0, 50.0, &rect);
/// assert_eq!((point.x, point.y), (32767, 32767));
/// ```
pub fn normalize(abs_x: f64, abs_y: f64, rect: &TargetRect) -> NormalizedPoint {
    NormalizedPoint {
        x: to_fixed(abs_x - rect.x, rect.width),
        y: to_fixed(abs_y - rect.y, rect.height),
    }
}

/// Converts a [`NormalizedPoint`] back into pixels of the receiver's `rect`.
///
/// The result is relative to the rect's top-left corner, rounded to the
/// nearest whole pixel.  `rect` is normally a different element (on another
/// peer) from the one the point was normalized against.
///
/// # Examples
///
/// ```rust
/// use cursor_core::domain::geometry::{denormalize, NormalizedPoint, TargetRect};
///
/// let larger = TargetRect::new(0.0, 0.0, 200.0, 200.0);
/// assert_eq!(denormalize(NormalizedPoint::new(32767, 32767), &larger), (100, 100));
/// ```
pub fn denormalize(point: NormalizedPoint, rect: &TargetRect) -> (i32, i32) {
    (
        from_fixed(point.x, rect.width),
        from_fixed(point.y, rect.height),
    )
}

fn to_fixed(offset: f64, extent: f64) -> u16 {
    let scaled = (offset / extent * SCALE).trunc();
    // The float cast saturates (NaN becomes 0); the integer cast keeps the
    // low 16 bits, which is the wrap-around for out-of-range points.
    scaled as i64 as u16
}

fn from_fixed(value: u16, extent: f64) -> i32 {
    (f64::from(value) / SCALE * extent).round() as i32
}

// ── Tests ─────────────────────────────────────────────────────────────────────
