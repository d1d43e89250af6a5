//! Radar product metadata and sample data.

use crate::error::{RenderError, RenderResult};
use crate::geotransform::GeoTransform;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Physical quantity encoded in a product's sample bytes.
///
/// A closed enumeration instead of free-form type strings: unrecognized
/// codes collapse into `Other` and render with the generic colormap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Reflectivity,
    RadialVelocity,
    Precipitation,
    EchoTop,
    Other(String),
}

impl DataType {
    /// Parse a product data-type code as found in product metadata.
    pub fn from_code(code: &str) -> Self {
        match code {
            "REFLECTIVITY" => DataType::Reflectivity,
            "RADIAL_VELOCITY" => DataType::RadialVelocity,
            "PRECIPITATION" => DataType::Precipitation,
            "ECHO_TOP" => DataType::EchoTop,
            other => DataType::Other(other.to_string()),
        }
    }

    /// Canonical code for cache key construction.
    pub fn code(&self) -> &str {
        match self {
            DataType::Reflectivity => "REFLECTIVITY",
            DataType::RadialVelocity => "RADIAL_VELOCITY",
            DataType::Precipitation => "PRECIPITATION",
            DataType::EchoTop => "ECHO_TOP",
            DataType::Other(code) => code,
        }
    }
}

/// Linear mapping from raw sample bytes to physical values.
///
/// `physical = offset + step * raw`. One byte value is reserved to mark
/// samples outside the radar's scanned coverage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataScale {
    pub offset: f64,
    pub step: f64,
    /// Raw value marking "not scanned" samples.
    pub not_scanned: u8,
}

impl DataScale {
    pub fn new(offset: f64, step: f64, not_scanned: u8) -> Self {
        Self {
            offset,
            step,
            not_scanned,
        }
    }

    /// Convert a raw sample byte to its physical value.
    pub fn to_physical(&self, raw: u8) -> f64 {
        self.offset + self.step * f64::from(raw)
    }

    /// Largest raw value that carries data (everything above collapses to
    /// the reserved code in practice, so the generic colormap normalizes
    /// against this).
    pub fn max_data_value(&self) -> u8 {
        self.not_scanned.saturating_sub(1)
    }

    /// Canonical bucket identifier for color caching. Two scales that
    /// quantize to the same identifier share a color cache bucket.
    pub fn bucket_id(&self) -> String {
        format!("{:.4}_{:.4}_{}", self.offset, self.step, self.not_scanned)
    }
}

impl Default for DataScale {
    /// The common dBZ byte scale: `dBZ = raw / 2 - 32`, 255 reserved.
    fn default() -> Self {
        Self {
            offset: -32.0,
            step: 0.5,
            not_scanned: 255,
        }
    }
}

/// Immutable description of one radar product raster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMetadata {
    /// Pixel-to-geographic affine transform.
    pub transform: GeoTransform,
    /// Product width in pixels.
    pub width: u32,
    /// Product height in pixels.
    pub height: u32,
    pub data_type: DataType,
    pub data_scale: DataScale,
}

/// Raw product samples, column-major: the byte for product pixel
/// `(px, py)` lives at index `px * rows + py`.
#[derive(Debug)]
pub struct SampleBuffer {
    data: Bytes,
    /// Samples per column (the column stride).
    rows: usize,
    reads: AtomicU64,
}

impl SampleBuffer {
    pub fn new(data: Bytes, rows: usize) -> Self {
        Self {
            data,
            rows,
            reads: AtomicU64::new(0),
        }
    }

    /// Total number of sample bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read the sample for product pixel (px, py), if in range.
    pub fn sample(&self, px: u32, py: u32) -> Option<u8> {
        let index = (px as usize).checked_mul(self.rows)? + py as usize;
        let value = self.data.get(index).copied();
        if value.is_some() {
            self.reads.fetch_add(1, Ordering::Relaxed);
        }
        value
    }

    /// Number of successful sample reads, for diagnostics and tests.
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }
}

/// A renderable product: metadata plus its sample buffer.
#[derive(Debug)]
pub struct RadarProduct {
    pub metadata: ProductMetadata,
    pub samples: SampleBuffer,
}

impl RadarProduct {
    /// Pair metadata with samples, validating that the buffer actually
    /// covers the advertised raster.
    pub fn new(metadata: ProductMetadata, samples: SampleBuffer) -> RenderResult<Self> {
        let expected = metadata.width as usize * metadata.height as usize;
        if samples.len() < expected {
            return Err(RenderError::UndersizedSampleBuffer {
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self { metadata, samples })
    }
}
