//! Inverse mapping from canvas pixels to product pixels.
//!
//! A `ViewportMapper` is built once per render. It composes three steps:
//! canvas pixel → map coordinate inside the requested extent → lon/lat via
//! inverse Mercator → product pixel via the inverted geotransform.
//!
//! For north-up products the column mapping depends only on the canvas x
//! and the row mapping only on the canvas y, so both can be tabulated once
//! per render instead of recomputed for every pixel. That shortcut is an
//! approximation that breaks for rotated geotransforms, so it is gated on
//! [`GeoTransform::is_axis_aligned`] and callers must fall back to
//! [`ViewportMapper::map_pixel`] when `axis_separable()` is false.

use crate::mercator;
use radar_common::{Extent, GeoTransform, ProductMetadata, RenderResult};

/// Per-render mapping from canvas pixels to product pixels.
#[derive(Debug)]
pub struct ViewportMapper {
    inverse: GeoTransform,
    product_width: u32,
    product_height: u32,
    product_map_extent: Extent,
    canvas_extent: Extent,
    canvas_width: u32,
    canvas_height: u32,
    axis_separable: bool,
}

impl ViewportMapper {
    /// Build a mapper for one render.
    ///
    /// Fails only when the product's geotransform is singular.
    pub fn new(
        metadata: &ProductMetadata,
        canvas_extent: Extent,
        canvas_width: u32,
        canvas_height: u32,
    ) -> RenderResult<Self> {
        let inverse = metadata.transform.invert()?;
        let product_geo_extent = metadata
            .transform
            .product_extent(metadata.width, metadata.height);
        let product_map_extent = mercator::to_map_extent(&product_geo_extent);

        Ok(Self {
            inverse,
            product_width: metadata.width,
            product_height: metadata.height,
            product_map_extent,
            canvas_extent,
            canvas_width,
            canvas_height,
            axis_separable: metadata.transform.is_axis_aligned(),
        })
    }

    /// Product coverage in map coordinates.
    pub fn product_map_extent(&self) -> &Extent {
        &self.product_map_extent
    }

    /// Whether the viewport overlaps the product's coverage at all.
    pub fn intersects_product(&self) -> bool {
        self.canvas_extent.intersects(&self.product_map_extent)
    }

    /// Whether the per-axis lookup tables are valid for this product.
    pub fn axis_separable(&self) -> bool {
        self.axis_separable
    }

    /// Map x coordinate at the center of canvas column `x`.
    fn map_x(&self, x: u32) -> f64 {
        self.canvas_extent.min_x
            + (f64::from(x) + 0.5) / f64::from(self.canvas_width) * self.canvas_extent.width()
    }

    /// Map y coordinate at the center of canvas row `y` (row 0 is north).
    fn map_y(&self, y: u32) -> f64 {
        self.canvas_extent.max_y
            - (f64::from(y) + 0.5) / f64::from(self.canvas_height) * self.canvas_extent.height()
    }

    fn clamp_column(&self, col: f64) -> Option<u32> {
        let col = col.floor();
        if col < 0.0 || col >= f64::from(self.product_width) {
            None
        } else {
            Some(col as u32)
        }
    }

    fn clamp_row(&self, row: f64) -> Option<u32> {
        let row = row.floor();
        if row < 0.0 || row >= f64::from(self.product_height) {
            None
        } else {
            Some(row as u32)
        }
    }

    /// Full inverse mapping for one canvas pixel. Valid for any
    /// geotransform; `None` means the pixel falls outside the product.
    pub fn map_pixel(&self, x: u32, y: u32) -> Option<(u32, u32)> {
        let (lon, lat) = mercator::inverse(self.map_x(x), self.map_y(y));
        let (col, row) = self.inverse.apply(lon, lat);
        Some((self.clamp_column(col)?, self.clamp_row(row)?))
    }

    /// Product column for each canvas column, computed once per render.
    ///
    /// Only meaningful when `axis_separable()` holds: the row term of the
    /// inverse transform is zero, so the latitude contribution drops out.
    pub fn column_table(&self) -> Vec<Option<u32>> {
        (0..self.canvas_width)
            .map(|x| {
                let lon = mercator::inverse_x(self.map_x(x));
                let (col, _) = self.inverse.apply(lon, 0.0);
                self.clamp_column(col)
            })
            .collect()
    }

    /// Product row for each canvas row, computed once per render.
    ///
    /// Only meaningful when `axis_separable()` holds.
    pub fn row_table(&self) -> Vec<Option<u32>> {
        (0..self.canvas_height)
            .map(|y| {
                let lat = mercator::inverse_y(self.map_y(y));
                let (_, row) = self.inverse.apply(0.0, lat);
                self.clamp_row(row)
            })
            .collect()
    }
}
