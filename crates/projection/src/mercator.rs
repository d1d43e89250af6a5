//! Spherical Web Mercator (EPSG:3857) projection.
//!
//! Radar products are distributed on a geographic lon/lat grid while web
//! maps composite in Web Mercator meters, so every render crosses this
//! projection once per axis.

use radar_common::Extent;
use std::f64::consts::PI;

/// Earth radius used by the spherical Mercator projection (meters).
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude limit beyond which the projection diverges.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Project a longitude (degrees) to a Mercator x coordinate (meters).
pub fn forward_x(lon_deg: f64) -> f64 {
    EARTH_RADIUS * lon_deg.to_radians()
}

/// Project a latitude (degrees) to a Mercator y coordinate (meters).
///
/// Latitudes are clamped to the projection's valid range.
pub fn forward_y(lat_deg: f64) -> f64 {
    let lat = lat_deg.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    EARTH_RADIUS * (PI / 4.0 + lat / 2.0).tan().ln()
}

/// Project a lon/lat pair (degrees) to Mercator meters.
pub fn forward(lon_deg: f64, lat_deg: f64) -> (f64, f64) {
    (forward_x(lon_deg), forward_y(lat_deg))
}

/// Unproject a Mercator x coordinate (meters) to a longitude (degrees).
pub fn inverse_x(x: f64) -> f64 {
    (x / EARTH_RADIUS).to_degrees()
}

/// Unproject a Mercator y coordinate (meters) to a latitude (degrees).
pub fn inverse_y(y: f64) -> f64 {
    (2.0 * (y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees()
}

/// Unproject Mercator meters to a lon/lat pair (degrees).
pub fn inverse(x: f64, y: f64) -> (f64, f64) {
    (inverse_x(x), inverse_y(y))
}

/// Convert a geographic lon/lat extent into a Mercator map extent.
pub fn to_map_extent(geo: &Extent) -> Extent {
    Extent::new(
        forward_x(geo.min_x),
        forward_y(geo.min_y),
        forward_x(geo.max_x),
        forward_y(geo.max_y),
    )
}
