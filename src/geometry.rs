//! Geometry value types used in agent replies and gesture payloads.
//!
//! [`Rect`] flattens its origin and extent, so it decodes from the agent's
//! `{x, y, width, height}` object directly.

use serde::{Deserialize, Serialize};

// ============================================================================
// Point
// ============================================================================

/// Integer screen coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate in pixels.
    pub x: i32,
    /// Vertical coordinate in pixels.
    pub y: i32,
}

impl Point {
    /// Sentinel for an unknown location. Zero is a valid location.
    pub const INVALID: Self = Self { x: -1, y: -1 };

    /// Creates a point.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns `false` for the [`Point::INVALID`] sentinel.
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

impl From<Point> for PointF {
    fn from(p: Point) -> Self {
        Self {
            x: f64::from(p.x),
            y: f64::from(p.y),
        }
    }
}

// ============================================================================
// PointF
// ============================================================================

/// Floating point screen coordinate, used by gestures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointF {
    /// Horizontal coordinate in pixels.
    pub x: f64,
    /// Vertical coordinate in pixels.
    pub y: f64,
}

impl PointF {
    /// Creates a point.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

// ============================================================================
// Size
// ============================================================================

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Size {
    /// Sentinel for an unknown size. Zero is a valid size.
    pub const INVALID: Self = Self {
        width: -1,
        height: -1,
    };

    /// Creates a size.
    #[inline]
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Returns `false` for the [`Size::INVALID`] sentinel.
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

// ============================================================================
// Rect
// ============================================================================

/// Bounding box: origin plus extent, nothing else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner.
    #[serde(flatten)]
    pub origin: Point,
    /// Extent.
    #[serde(flatten)]
    pub size: Size,
}

impl Rect {
    /// Sentinel for an unknown bounding box.
    pub const INVALID: Self = Self {
        origin: Point::INVALID,
        size: Size::INVALID,
    };

    /// Creates a rectangle.
    #[inline]
    #[must_use]
    pub const fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// Returns the center point, rounded toward the origin.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2,
            self.origin.y + self.size.height / 2,
        )
    }

    /// Returns `false` when either part is a sentinel.
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.origin.is_valid() && self.size.is_valid()
    }
}

// ============================================================================
// Tests
// ============================================================================
