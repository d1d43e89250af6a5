//! Error types for the radar rendering crates.

use thiserror::Error;

/// Result type alias using RenderError.
pub type RenderResult<T> = Result<T, RenderError>;

/// Primary error type for render operations.
///
/// Most abnormal conditions in the render path (missing product data,
/// unknown data types, out-of-coverage pixels) are handled locally and
/// never surface as errors. The variants here are the genuinely invalid
/// inputs that cannot be rendered around.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Geotransform is singular (determinant {determinant}) and cannot be inverted")]
    SingularTransform { determinant: f64 },

    #[error("Invalid output size: {width}x{height}")]
    InvalidOutputSize { width: u32, height: u32 },

    #[error("Sample buffer holds {actual} bytes but the product needs {expected}")]
    UndersizedSampleBuffer { expected: usize, actual: usize },

    #[error("Invalid render configuration: {0}")]
    InvalidConfig(String),
}
