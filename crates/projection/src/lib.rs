//! Coordinate mapping between product rasters and map viewports.
//!
//! Implements the spherical Web Mercator projection from scratch and the
//! composed inverse mapping from destination canvas pixels back to product
//! pixels used by the render loop.

pub mod mercator;
pub mod viewport;

pub use viewport::ViewportMapper;
