//! Geometry snapshots: `Rect` and CSS length formatting.

use serde::{Deserialize, Serialize};

use crate::config::WatchedProperty;

/// A bounding box as reported by the rendering surface.
///
/// Coordinates are viewport-relative, matching what a layout engine
/// reports for an element's border box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top edge
    pub top: f64,
    /// Left edge
    pub left: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Rect {
    /// Zero-sized rectangle at the origin.
    pub const ZERO: Self = Self {
        top: 0.0,
        left: 0.0,
        width: 0.0,
        height: 0.0,
    };

    /// Create a new rectangle.
    #[must_use]
    pub const fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Rectangle moved by the given offsets.
    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.top + dy, self.left + dx, self.width, self.height)
    }

    /// Rectangle with a different size at the same position.
    #[must_use]
    pub const fn with_size(&self, width: f64, height: f64) -> Self {
        Self::new(self.top, self.left, width, height)
    }

    /// Value of a dimension property (`width` or `height`).
    ///
    /// `Transform` has no single scalar value and yields `None`.
    #[must_use]
    pub const fn dimension(&self, property: WatchedProperty) -> Option<f64> {
        match property {
            WatchedProperty::Height => Some(self.height),
            WatchedProperty::Width => Some(self.width),
            WatchedProperty::Transform => None,
        }
    }

    /// Whether `property` differs between `self` (before) and `after`.
    ///
    /// Transform tracks position, so it compares the anchor edges rather
    /// than any transform value.
    #[must_use]
    pub fn differs(&self, after: &Self, property: WatchedProperty) -> bool {
        match property {
            WatchedProperty::Transform => self.top != after.top || self.left != after.left,
            WatchedProperty::Height => self.height != after.height,
            WatchedProperty::Width => self.width != after.width,
        }
    }

    /// Offset that moves `after` back onto `self`, as `(dx, dy)`.
    #[must_use]
    pub fn inverse_offset(&self, after: &Self) -> (f64, f64) {
        (self.left - after.left, self.top - after.top)
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Render a number as a CSS pixel length (`50px`, `-12.5px`).
#[must_use]
pub fn px(value: f64) -> String {
    // Avoid emitting "-0px".
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{value}px")
}

/// Render an inverse offset as a CSS translation.
#[must_use]
pub fn translate(dx: f64, dy: f64) -> String {
    format!("translate({}, {})", px(dx), px(dy))
}
