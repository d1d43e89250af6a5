//! The reprojection engine: renders a radar product into a map viewport.
//!
//! A render walks every destination pixel, inverse-maps it to a product
//! pixel, resolves the sample's color through the color cache and writes
//! RGBA bytes. Finished frames land in the render cache keyed by the
//! request fingerprint; repeated requests for the same viewport are
//! served without touching the pixel loop.

use crate::color::{self, ColorResolver, NOT_SCANNED};
use crate::color_cache::ColorCache;
use crate::key::RenderKey;
use crate::render_cache::RenderCache;
use bytes::Bytes;
use projection::ViewportMapper;
use radar_common::{Extent, RadarProduct, RenderConfig, RenderError, RenderResult};
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// One render request from the host map layer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    /// Which product is selected (site and quantity), opaque to the engine.
    pub selection: String,
    /// Product timestamp, opaque to the engine.
    pub time: String,
    /// Requested viewport extent in map coordinates.
    pub extent: Extent,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Map units per pixel. Derivable from extent and size; not part of
    /// the cache key.
    pub resolution: f64,
    /// Device pixel ratio. Not part of the cache key.
    pub pixel_ratio: f64,
    /// Rendering projection identifier, e.g. "EPSG:3857".
    pub projection: String,
}

/// Why a render call performed no pixel work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No product data was supplied; the caller should keep displaying
    /// its previous frame.
    MissingProduct,
    /// The sample buffer does not cover the product raster.
    UndersizedSampleBuffer,
}

/// Result of a render call.
#[derive(Debug)]
pub enum RenderOutcome {
    /// Frame computed by this call and committed to the render cache.
    Rendered(Bytes),
    /// Frame computed, but a newer request arrived mid-render; the frame
    /// is returned for display but not cached.
    Superseded(Bytes),
    /// Frame served from the render cache; no pixel work performed.
    CachedHit(Bytes),
    /// No render performed.
    Skipped(SkipReason),
}

impl RenderOutcome {
    /// The pixel buffer, if one was produced.
    pub fn frame(&self) -> Option<&Bytes> {
        match self {
            RenderOutcome::Rendered(frame)
            | RenderOutcome::Superseded(frame)
            | RenderOutcome::CachedHit(frame) => Some(frame),
            RenderOutcome::Skipped(_) => None,
        }
    }
}

/// Render counters, primarily for tests and diagnostics.
#[derive(Debug, Default)]
pub struct EngineStats {
    frames_rendered: AtomicU64,
    cache_hits: AtomicU64,
    skipped: AtomicU64,
}

impl EngineStats {
    /// Frames produced by the pixel loop (cache hits excluded).
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered.load(Ordering::Relaxed)
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }
}

/// Reprojection engine owning the render cache and the color cache.
///
/// All mutable state lives here explicitly; construct one engine per
/// rendered layer and share it across render calls.
pub struct RenderEngine {
    frames: RenderCache,
    colors: ColorCache,
    generation: AtomicU64,
    stats: EngineStats,
}

impl RenderEngine {
    pub fn new(config: &RenderConfig) -> RenderResult<Self> {
        Ok(Self {
            frames: RenderCache::new(config)?,
            colors: ColorCache::new(),
            generation: AtomicU64::new(0),
            stats: EngineStats::default(),
        })
    }

    /// Render a product into the requested viewport.
    ///
    /// Returns the RGBA buffer (row-major, 4 bytes per pixel) wrapped in a
    /// [`RenderOutcome`]. Missing product data is a non-fatal skip; the
    /// only hard failure is a singular geotransform or invalid output
    /// geometry.
    pub fn render(
        &self,
        request: &RenderRequest,
        product: Option<&RadarProduct>,
    ) -> RenderResult<RenderOutcome> {
        if request.width == 0 || request.height == 0 {
            return Err(RenderError::InvalidOutputSize {
                width: request.width,
                height: request.height,
            });
        }

        let key = RenderKey::from_request(request);
        if let Some(frame) = self.frames.get(&key) {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(RenderOutcome::CachedHit(frame));
        }

        let Some(product) = product else {
            warn!(
                selection = %request.selection,
                time = %request.time,
                "not rendering: no product data"
            );
            self.stats.skipped.fetch_add(1, Ordering::Relaxed);
            return Ok(RenderOutcome::Skipped(SkipReason::MissingProduct));
        };

        let metadata = &product.metadata;
        let expected = metadata.width as usize * metadata.height as usize;
        if product.samples.len() < expected {
            warn!(
                selection = %request.selection,
                expected,
                actual = product.samples.len(),
                "not rendering: sample buffer does not cover the raster"
            );
            self.stats.skipped.fetch_add(1, Ordering::Relaxed);
            return Ok(RenderOutcome::Skipped(SkipReason::UndersizedSampleBuffer));
        }

        let generation = self.begin_generation();
        let started = Instant::now();

        let resolver = ColorResolver::for_data_type(&metadata.data_type);
        let scale = metadata.data_scale;
        let bucket = self.colors.bucket(&metadata.data_type, &scale);

        let mapper = ViewportMapper::new(metadata, request.extent, request.width, request.height)?;

        let row_bytes = request.width as usize * 4;
        let mut buffer = vec![0u8; row_bytes * request.height as usize];
        color::fill_with_not_scanned(&mut buffer);

        if mapper.intersects_product() {
            let samples = &product.samples;

            if mapper.axis_separable() {
                // Fast path: one coordinate transform per column and per
                // row instead of one per pixel.
                let columns = mapper.column_table();
                let rows = mapper.row_table();

                buffer
                    .par_chunks_exact_mut(row_bytes)
                    .enumerate()
                    .for_each(|(y, row)| {
                        let Some(py) = rows[y] else { return };
                        for (x, pixel) in row.chunks_exact_mut(4).enumerate() {
                            let Some(px) = columns[x] else { continue };
                            let Some(value) = samples.sample(px, py) else {
                                continue;
                            };
                            let color = bucket.resolve(resolver, &scale, value);
                            if color != NOT_SCANNED {
                                pixel.copy_from_slice(&color.to_bytes());
                            }
                        }
                    });
            } else {
                // Rotated product: the separable shortcut would misalign
                // output, so every pixel gets the full inverse mapping.
                buffer
                    .par_chunks_exact_mut(row_bytes)
                    .enumerate()
                    .for_each(|(y, row)| {
                        for (x, pixel) in row.chunks_exact_mut(4).enumerate() {
                            let Some((px, py)) = mapper.map_pixel(x as u32, y as u32) else {
                                continue;
                            };
                            let Some(value) = samples.sample(px, py) else {
                                continue;
                            };
                            let color = bucket.resolve(resolver, &scale, value);
                            if color != NOT_SCANNED {
                                pixel.copy_from_slice(&color.to_bytes());
                            }
                        }
                    });
            }
        } else {
            debug!(
                selection = %request.selection,
                "viewport does not overlap product coverage"
            );
        }

        self.stats.frames_rendered.fetch_add(1, Ordering::Relaxed);

        let elapsed = started.elapsed();
        let pixel_count = u64::from(request.width) * u64::from(request.height);
        let kpx_per_s = pixel_count as f64 / elapsed.as_secs_f64().max(1e-9) / 1000.0;
        info!(
            elapsed_ms = elapsed.as_millis() as u64,
            kpx_per_s = kpx_per_s as u64,
            width = request.width,
            height = request.height,
            "rendered product frame"
        );

        let frame = Bytes::from(buffer);
        if self.commit_if_current(generation, key, frame.clone()) {
            Ok(RenderOutcome::Rendered(frame))
        } else {
            debug!(
                selection = %request.selection,
                "render superseded by a newer request; frame not cached"
            );
            Ok(RenderOutcome::Superseded(frame))
        }
    }

    /// Stamp a new render generation. The most recently started render is
    /// the only one allowed to commit its frame to the cache.
    fn begin_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Commit a finished frame unless a newer render has started since
    /// `generation` was stamped. Returns whether the frame was cached.
    fn commit_if_current(&self, generation: u64, key: RenderKey, frame: Bytes) -> bool {
        if self.generation.load(Ordering::SeqCst) == generation {
            self.frames.insert(key, frame);
            true
        } else {
            false
        }
    }

    /// The rendered-frame cache.
    pub fn render_cache(&self) -> &RenderCache {
        &self.frames
    }

    /// The value→color cache.
    pub fn color_cache(&self) -> &ColorCache {
        &self.colors
    }

    /// Render counters.
    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radar_common::{DataScale, DataType, GeoTransform, ProductMetadata, SampleBuffer};

    fn request() -> RenderRequest {
        RenderRequest {
            selection: "fivan:DBZ".to_string(),
            time: "2024-03-01T12:05:00Z".to_string(),
            extent: Extent::new(0.0, 0.0, 100.0, 100.0),
            width: 4,
            height: 4,
            resolution: 25.0,
            pixel_ratio: 1.0,
            projection: "EPSG:3857".to_string(),
        }
    }

    #[test]
    fn test_zero_output_size_is_an_error() {
        let engine = RenderEngine::new(&RenderConfig::default()).unwrap();
        let mut r = request();
        r.width = 0;
        assert!(matches!(
            engine.render(&r, None),
            Err(RenderError::InvalidOutputSize { .. })
        ));
    }

    #[test]
    fn test_missing_product_skips() {
        let engine = RenderEngine::new(&RenderConfig::default()).unwrap();
        let outcome = engine.render(&request(), None).unwrap();
        assert!(matches!(
            outcome,
            RenderOutcome::Skipped(SkipReason::MissingProduct)
        ));
        assert_eq!(engine.stats().skipped(), 1);
        assert_eq!(engine.stats().frames_rendered(), 0);
    }

    #[test]
    fn test_undersized_buffer_skips() {
        let engine = RenderEngine::new(&RenderConfig::default()).unwrap();
        let product = RadarProduct {
            metadata: ProductMetadata {
                transform: GeoTransform::north_up(20.0, 65.0, 0.25, -0.25),
                width: 8,
                height: 8,
                data_type: DataType::Reflectivity,
                data_scale: DataScale::default(),
            },
            samples: SampleBuffer::new(bytes::Bytes::from(vec![0u8; 10]), 8),
        };
        let outcome = engine.render(&request(), Some(&product)).unwrap();
        assert!(matches!(
            outcome,
            RenderOutcome::Skipped(SkipReason::UndersizedSampleBuffer)
        ));
    }

    #[test]
    fn test_superseded_generation_is_not_cached() {
        let engine = RenderEngine::new(&RenderConfig::default()).unwrap();
        let key_a = RenderKey::from_request(&request());

        let older = engine.begin_generation();
        let newer = engine.begin_generation();

        // The older render finishes after the newer one started
        assert!(!engine.commit_if_current(older, key_a.clone(), Bytes::from_static(&[0; 4])));
        assert!(engine.render_cache().get(&key_a).is_none());

        // The newest render commits normally
        assert!(engine.commit_if_current(newer, key_a.clone(), Bytes::from_static(&[0; 4])));
        assert!(engine.render_cache().get(&key_a).is_some());
    }
}
