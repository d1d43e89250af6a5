//! Common types shared across the radar rendering crates.

pub mod config;
pub mod error;
pub mod extent;
pub mod geotransform;
pub mod product;

pub use config::RenderConfig;
pub use error::{RenderError, RenderResult};
pub use extent::Extent;
pub use geotransform::GeoTransform;
pub use product::{DataScale, DataType, ProductMetadata, RadarProduct, SampleBuffer};
