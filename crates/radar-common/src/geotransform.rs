//! GDAL-style affine geotransform between product pixel space and
//! product-native geographic space.
//!
//! The six coefficients follow the GDAL convention:
//!
//! ```text
//! geo_x = origin_x + col * pixel_width     + row * row_rotation
//! geo_y = origin_y + col * column_rotation + row * pixel_height
//! ```
//!
//! North-up products have both rotation terms at zero and a negative
//! `pixel_height` (row index grows southward).

use crate::error::{RenderError, RenderResult};
use crate::extent::Extent;
use serde::{Deserialize, Serialize};

/// Determinants below this magnitude are treated as singular.
const SINGULAR_EPSILON: f64 = 1e-12;

/// Affine mapping between pixel coordinates and geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub pixel_width: f64,
    pub row_rotation: f64,
    pub origin_y: f64,
    pub column_rotation: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Build from coefficients in GDAL order:
    /// `[origin_x, pixel_width, row_rotation, origin_y, column_rotation, pixel_height]`.
    pub fn from_coefficients(c: [f64; 6]) -> Self {
        Self {
            origin_x: c[0],
            pixel_width: c[1],
            row_rotation: c[2],
            origin_y: c[3],
            column_rotation: c[4],
            pixel_height: c[5],
        }
    }

    /// A north-up transform with no rotation terms.
    pub fn north_up(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            pixel_width,
            row_rotation: 0.0,
            origin_y,
            column_rotation: 0.0,
            pixel_height,
        }
    }

    /// Apply the transform to a (column, row) pair.
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.origin_x + col * self.pixel_width + row * self.row_rotation,
            self.origin_y + col * self.column_rotation + row * self.pixel_height,
        )
    }

    fn determinant(&self) -> f64 {
        self.pixel_width * self.pixel_height - self.row_rotation * self.column_rotation
    }

    /// Compute the inverse transform, mapping geographic coordinates back to
    /// (column, row). A singular matrix cannot be inverted and is rejected
    /// explicitly rather than producing garbage coordinates.
    pub fn invert(&self) -> RenderResult<GeoTransform> {
        let det = self.determinant();
        if det.abs() < SINGULAR_EPSILON {
            return Err(RenderError::SingularTransform { determinant: det });
        }

        let pixel_width = self.pixel_height / det;
        let row_rotation = -self.row_rotation / det;
        let column_rotation = -self.column_rotation / det;
        let pixel_height = self.pixel_width / det;

        Ok(GeoTransform {
            origin_x: -(pixel_width * self.origin_x + row_rotation * self.origin_y),
            pixel_width,
            row_rotation,
            origin_y: -(column_rotation * self.origin_x + pixel_height * self.origin_y),
            column_rotation,
            pixel_height,
        })
    }

    /// Geographic extent covered by a product of the given pixel dimensions.
    pub fn product_extent(&self, width: u32, height: u32) -> Extent {
        let (w, h) = (f64::from(width), f64::from(height));
        let corners = [
            self.apply(0.0, 0.0),
            self.apply(w, 0.0),
            self.apply(0.0, h),
            self.apply(w, h),
        ];

        let mut ext = Extent::new(corners[0].0, corners[0].1, corners[0].0, corners[0].1);
        for (x, y) in corners {
            ext.min_x = ext.min_x.min(x);
            ext.min_y = ext.min_y.min(y);
            ext.max_x = ext.max_x.max(x);
            ext.max_y = ext.max_y.max(y);
        }
        ext
    }

    /// True when both rotation terms are zero, i.e. the column mapping
    /// depends only on geographic x and the row mapping only on geographic y.
    ///
    /// The renderer's axis-separable fast path is only valid for such
    /// transforms; anything rotated must take the full per-pixel path.
    pub fn is_axis_aligned(&self) -> bool {
        self.row_rotation == 0.0 && self.column_rotation == 0.0
    }
}
