//! Value-to-color resolution for radar products.

use radar_common::{DataScale, DataType};

/// Color value in RGBA format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Channel bytes in RGBA order.
    pub const fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Color for samples outside the radar's scanned coverage.
///
/// Doubles as the pre-fill value for the output buffer, so the pixel loop
/// skips writes that resolve to it.
pub const NOT_SCANNED: Color = Color::new(211, 211, 211, 76);

/// Linear color interpolation.
fn interpolate_color(color1: Color, color2: Color, t: f64) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;

    Color::new(
        ((f64::from(color1.r) * t_inv) + (f64::from(color2.r) * t)) as u8,
        ((f64::from(color1.g) * t_inv) + (f64::from(color2.g) * t)) as u8,
        ((f64::from(color1.b) * t_inv) + (f64::from(color2.b) * t)) as u8,
        ((f64::from(color1.a) * t_inv) + (f64::from(color2.a) * t)) as u8,
    )
}

/// Piecewise-linear ramp over (breakpoint, color) stops sorted by value.
fn ramp(stops: &[(f64, Color)], value: f64) -> Color {
    let (first_value, first_color) = stops[0];
    if value <= first_value {
        return first_color;
    }
    for window in stops.windows(2) {
        let (lo_value, lo_color) = window[0];
        let (hi_value, hi_color) = window[1];
        if value <= hi_value {
            let t = (value - lo_value) / (hi_value - lo_value);
            return interpolate_color(lo_color, hi_color, t);
        }
    }
    stops[stops.len() - 1].1
}

/// Reflectivity color stops in dBZ, loosely following the common
/// weather-radar palette: cyan drizzle through green/yellow/red to
/// magenta for extreme cores.
const REFLECTIVITY_STOPS: &[(f64, Color)] = &[
    (-10.0, Color::new(80, 200, 255, 90)),
    (5.0, Color::new(0, 150, 255, 160)),
    (20.0, Color::new(0, 200, 0, 200)),
    (35.0, Color::new(255, 255, 0, 220)),
    (50.0, Color::new(255, 60, 0, 240)),
    (65.0, Color::new(255, 0, 255, 255)),
    (75.0, Color::new(255, 255, 255, 255)),
];

/// Generic ramp over the normalized byte range, for products without a
/// dedicated palette.
const GENERIC_STOPS: &[(f64, Color)] = &[
    (0.05, Color::new(70, 100, 220, 120)),
    (0.35, Color::new(0, 200, 180, 180)),
    (0.65, Color::new(255, 220, 0, 220)),
    (1.0, Color::new(220, 0, 40, 255)),
];

/// Resolve a reflectivity sample to a color.
///
/// Returns [`NOT_SCANNED`] for the scale's reserved code and transparent
/// for echoes below the display threshold.
pub fn resolve_reflectivity(scale: &DataScale, value: u8) -> Color {
    if value == scale.not_scanned {
        return NOT_SCANNED;
    }
    let dbz = scale.to_physical(value);
    if dbz < -10.0 {
        return Color::transparent();
    }
    ramp(REFLECTIVITY_STOPS, dbz)
}

/// Resolve a sample of any other product type to a color.
pub fn resolve_generic(scale: &DataScale, value: u8) -> Color {
    if value == scale.not_scanned {
        return NOT_SCANNED;
    }
    let max = f64::from(scale.max_data_value().max(1));
    let t = f64::from(value) / max;
    if t < 0.02 {
        return Color::transparent();
    }
    ramp(GENERIC_STOPS, t)
}

/// Colormap variant, selected once per frame rather than per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorResolver {
    Reflectivity,
    Generic,
}

impl ColorResolver {
    /// Pick the resolver for a product data type. Unrecognized types fall
    /// back to the generic colormap.
    pub fn for_data_type(data_type: &DataType) -> Self {
        match data_type {
            DataType::Reflectivity => ColorResolver::Reflectivity,
            DataType::Other(code) => {
                tracing::debug!(code = %code, "unknown data type, using generic colormap");
                ColorResolver::Generic
            }
            _ => ColorResolver::Generic,
        }
    }

    pub fn resolve(self, scale: &DataScale, value: u8) -> Color {
        match self {
            ColorResolver::Reflectivity => resolve_reflectivity(scale, value),
            ColorResolver::Generic => resolve_generic(scale, value),
        }
    }
}

/// Fill an RGBA buffer with the [`NOT_SCANNED`] color in one bulk pass.
pub fn fill_with_not_scanned(buffer: &mut [u8]) {
    let bytes = NOT_SCANNED.to_bytes();
    for pixel in buffer.chunks_exact_mut(4) {
        pixel.copy_from_slice(&bytes);
    }
}
