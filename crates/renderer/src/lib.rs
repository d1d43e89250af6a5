//! Viewport rendering for radar raster products.
//!
//! Reprojects product-space samples into screen-space RGBA pixels:
//! - value→color resolution with per-scale memoization
//! - an LRU+TTL cache of finished frames
//! - the per-pixel inverse-reprojection engine with an axis-separable
//!   fast path for north-up products

pub mod color;
pub mod color_cache;
pub mod engine;
pub mod key;
pub mod render_cache;

pub use color::{Color, ColorResolver, NOT_SCANNED};
pub use color_cache::ColorCache;
pub use engine::{RenderEngine, RenderOutcome, RenderRequest, SkipReason};
pub use key::RenderKey;
pub use render_cache::RenderCache;
