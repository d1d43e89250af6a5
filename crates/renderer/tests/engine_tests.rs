//! End-to-end render scenarios for the reprojection engine.

use bytes::Bytes;
use projection::{mercator, ViewportMapper};
use radar_common::{
    DataScale, DataType, Extent, GeoTransform, ProductMetadata, RadarProduct, RenderConfig,
    SampleBuffer,
};
use rand::{Rng, SeedableRng};
use renderer::color::resolve_reflectivity;
use renderer::{RenderEngine, RenderOutcome, RenderRequest, NOT_SCANNED};

const PRODUCT_SIZE: u32 = 8;

fn metadata(data_type: DataType) -> ProductMetadata {
    ProductMetadata {
        // lon 20..22, lat 63..65, north-up
        transform: GeoTransform::north_up(20.0, 65.0, 0.25, -0.25),
        width: PRODUCT_SIZE,
        height: PRODUCT_SIZE,
        data_type,
        data_scale: DataScale::default(),
    }
}

fn uniform_product(data_type: DataType, value: u8) -> RadarProduct {
    let metadata = metadata(data_type);
    let samples = SampleBuffer::new(
        Bytes::from(vec![value; (PRODUCT_SIZE * PRODUCT_SIZE) as usize]),
        PRODUCT_SIZE as usize,
    );
    RadarProduct::new(metadata, samples).unwrap()
}

fn product_map_extent() -> Extent {
    let m = metadata(DataType::Reflectivity);
    let geo = m.transform.product_extent(m.width, m.height);
    mercator::to_map_extent(&geo)
}

fn request(extent: Extent, size: u32) -> RenderRequest {
    RenderRequest {
        selection: "fivan:DBZ".to_string(),
        time: "2024-03-01T12:05:00Z".to_string(),
        extent,
        width: size,
        height: size,
        resolution: extent.width() / f64::from(size),
        pixel_ratio: 1.0,
        projection: "EPSG:3857".to_string(),
    }
}

fn rendered(outcome: RenderOutcome) -> Bytes {
    match outcome {
        RenderOutcome::Rendered(frame) => frame,
        other => panic!("expected a freshly rendered frame, got {other:?}"),
    }
}

#[test]
fn full_coverage_renders_every_pixel() {
    // Scenario: extent exactly matching the product's map-coordinate
    // extent, uniform reflectivity samples.
    let engine = RenderEngine::new(&RenderConfig::default()).unwrap();
    let product = uniform_product(DataType::Reflectivity, 5);
    let req = request(product_map_extent(), 4);

    let frame = rendered(engine.render(&req, Some(&product)).unwrap());
    assert_eq!(frame.len(), 4 * 4 * 4);

    let expected = resolve_reflectivity(&product.metadata.data_scale, 5).to_bytes();
    for pixel in frame.chunks_exact(4) {
        assert_eq!(pixel, expected);
        assert_ne!(pixel, NOT_SCANNED.to_bytes());
    }
    // One sample read per destination pixel
    assert_eq!(product.samples.reads(), 16);
}

#[test]
fn repeated_request_is_a_cache_hit_with_no_pixel_work() {
    let engine = RenderEngine::new(&RenderConfig::default()).unwrap();
    let product = uniform_product(DataType::Reflectivity, 120);
    let req = request(product_map_extent(), 4);

    let first = rendered(engine.render(&req, Some(&product)).unwrap());
    let reads_after_first = product.samples.reads();
    let bucket = engine
        .color_cache()
        .bucket(&product.metadata.data_type, &product.metadata.data_scale);
    let computations_after_first = bucket.computations();

    let second = engine.render(&req, Some(&product)).unwrap();
    let RenderOutcome::CachedHit(cached) = second else {
        panic!("expected a cache hit");
    };

    assert_eq!(first, cached);
    assert_eq!(engine.stats().frames_rendered(), 1);
    // No sample reads, no color computation on the hit path
    assert_eq!(product.samples.reads(), reads_after_first);
    assert_eq!(bucket.computations(), computations_after_first);
}

#[test]
fn disjoint_extent_renders_only_the_sentinel() {
    // Scenario: viewport entirely outside the product's coverage.
    let engine = RenderEngine::new(&RenderConfig::default()).unwrap();
    let product = uniform_product(DataType::Reflectivity, 200);
    // Far south-west of the product
    let req = request(Extent::new(-3_000_000.0, 0.0, -2_000_000.0, 1_000_000.0), 4);

    let frame = rendered(engine.render(&req, Some(&product)).unwrap());
    for pixel in frame.chunks_exact(4) {
        assert_eq!(pixel, NOT_SCANNED.to_bytes());
    }
    assert_eq!(product.samples.reads(), 0);
}

#[test]
fn pixels_outside_coverage_stay_sentinel_regardless_of_samples() {
    // Viewport twice the product's width: the east half maps out of
    // bounds whatever the sample buffer contains.
    let engine = RenderEngine::new(&RenderConfig::default()).unwrap();

    let meta = metadata(DataType::Reflectivity);
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    let noise: Vec<u8> = (0..(PRODUCT_SIZE * PRODUCT_SIZE))
        .map(|_| rng.gen())
        .collect();
    let product = RadarProduct::new(
        meta.clone(),
        SampleBuffer::new(Bytes::from(noise), PRODUCT_SIZE as usize),
    )
    .unwrap();

    let coverage = product_map_extent();
    let wide = Extent::new(
        coverage.min_x,
        coverage.min_y,
        coverage.max_x + coverage.width(),
        coverage.max_y,
    );
    let size = 8u32;
    let req = request(wide, size);
    let frame = rendered(engine.render(&req, Some(&product)).unwrap());

    let mapper = ViewportMapper::new(&meta, wide, size, size).unwrap();
    let mut outside = 0;
    for y in 0..size {
        for x in 0..size {
            if mapper.map_pixel(x, y).is_none() {
                let offset = ((y * size + x) * 4) as usize;
                assert_eq!(&frame[offset..offset + 4], NOT_SCANNED.to_bytes());
                outside += 1;
            }
        }
    }
    assert!(outside > 0, "expected part of the viewport out of coverage");
}

#[test]
fn cache_key_ignores_fields_that_do_not_affect_pixels() {
    // Scenario: second request differs only in resolution and pixel
    // ratio, which the canonical key excludes.
    let engine = RenderEngine::new(&RenderConfig::default()).unwrap();
    let product = uniform_product(DataType::Reflectivity, 140);

    let req = request(product_map_extent(), 4);
    rendered(engine.render(&req, Some(&product)).unwrap());

    let mut variant = req.clone();
    variant.resolution *= 2.0;
    variant.pixel_ratio = 2.0;
    assert!(matches!(
        engine.render(&variant, Some(&product)).unwrap(),
        RenderOutcome::CachedHit(_)
    ));

    // Changing the extent produces a different key and a fresh render
    let mut moved = req.clone();
    moved.extent.min_x += 50_000.0;
    assert!(matches!(
        engine.render(&moved, Some(&product)).unwrap(),
        RenderOutcome::Rendered(_)
    ));
}

#[test]
fn missing_product_skips_and_leaves_other_entries_cached() {
    // Scenario: sample data absent; previously cached frames for other
    // keys survive untouched.
    let engine = RenderEngine::new(&RenderConfig::default()).unwrap();
    let product = uniform_product(DataType::Reflectivity, 100);

    let cached_req = request(product_map_extent(), 4);
    rendered(engine.render(&cached_req, Some(&product)).unwrap());

    let mut other = cached_req.clone();
    other.time = "2024-03-01T12:10:00Z".to_string();
    assert!(matches!(
        engine.render(&other, None).unwrap(),
        RenderOutcome::Skipped(_)
    ));

    assert!(matches!(
        engine.render(&cached_req, Some(&product)).unwrap(),
        RenderOutcome::CachedHit(_)
    ));
}

#[test]
fn unknown_data_type_renders_with_generic_colormap() {
    let engine = RenderEngine::new(&RenderConfig::default()).unwrap();
    let product = uniform_product(DataType::Other("MYSTERY".to_string()), 180);
    let req = request(product_map_extent(), 4);

    let frame = rendered(engine.render(&req, Some(&product)).unwrap());
    let expected = renderer::color::resolve_generic(&product.metadata.data_scale, 180).to_bytes();
    for pixel in frame.chunks_exact(4) {
        assert_eq!(pixel, expected);
    }
}

#[test]
fn rotated_product_takes_the_full_mapping_path() {
    let engine = RenderEngine::new(&RenderConfig::default()).unwrap();

    let mut meta = metadata(DataType::Reflectivity);
    meta.transform = GeoTransform::from_coefficients([20.0, 0.25, 0.02, 65.0, 0.0, -0.25]);
    let samples = SampleBuffer::new(
        Bytes::from(vec![150u8; (PRODUCT_SIZE * PRODUCT_SIZE) as usize]),
        PRODUCT_SIZE as usize,
    );
    let product = RadarProduct::new(meta.clone(), samples).unwrap();

    let geo = meta.transform.product_extent(meta.width, meta.height);
    let req = request(mercator::to_map_extent(&geo), 6);

    let frame = rendered(engine.render(&req, Some(&product)).unwrap());
    let expected = resolve_reflectivity(&meta.data_scale, 150).to_bytes();
    // The viewport center always falls inside a rotated product's extent
    let center = ((3 * 6 + 3) * 4) as usize;
    assert_eq!(&frame[center..center + 4], expected);
}

#[test]
fn singular_transform_is_an_explicit_failure() {
    let engine = RenderEngine::new(&RenderConfig::default()).unwrap();

    let mut meta = metadata(DataType::Reflectivity);
    meta.transform = GeoTransform::north_up(20.0, 65.0, 0.0, -0.25);
    let samples = SampleBuffer::new(
        Bytes::from(vec![0u8; (PRODUCT_SIZE * PRODUCT_SIZE) as usize]),
        PRODUCT_SIZE as usize,
    );
    let product = RadarProduct {
        metadata: meta,
        samples,
    };

    let req = request(product_map_extent(), 4);
    assert!(engine.render(&req, Some(&product)).is_err());
}
