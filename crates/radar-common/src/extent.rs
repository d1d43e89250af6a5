//! Axis-aligned extent types and operations.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box in a geographic or projected coordinate space.
///
/// For geographic coordinates the units are degrees; for Web Mercator map
/// coordinates they are meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    /// Create a new extent from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Width of the extent in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the extent in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Check if this extent overlaps another.
    pub fn intersects(&self, other: &Extent) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }

    /// Check if a point is contained within this extent.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Check if a coordinate lies within the horizontal span of this extent.
    pub fn contains_x(&self, x: f64) -> bool {
        x >= self.min_x && x <= self.max_x
    }

    /// Check if a coordinate lies within the vertical span of this extent.
    pub fn contains_y(&self, y: f64) -> bool {
        y >= self.min_y && y <= self.max_y
    }

    /// Generate a cache key fragment for this extent (quantized to avoid
    /// floating point issues).
    pub fn cache_key(&self) -> String {
        // Adding 0.0 collapses -0.0 into +0.0 so value-equal extents
        // cannot fingerprint differently
        let q = |v: f64| v + 0.0;
        // Quantize to 6 decimal places for cache key stability
        format!(
            "{:.6}_{:.6}_{:.6}_{:.6}",
            q(self.min_x),
            q(self.min_y),
            q(self.max_x),
            q(self.max_y)
        )
    }
}
