#![allow(dead_code)]

use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use yolokit::ir::{BBoxXYXY, Pixel};

/// Six decimals in the label file bound the round-trip error per pixel of
/// image extent.
pub fn eps_label(image_w: u32, image_h: u32) -> f64 {
    image_w.max(image_h) as f64 * 1e-6
}

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

pub fn arb_image_size() -> impl Strategy<Value = (u32, u32)> {
    (1u32..=4096, 1u32..=4096)
}

/// A box with `0 <= min <= max <= dim` on both axes.
pub fn arb_bbox_within(width: u32, height: u32) -> BoxedStrategy<BBoxXYXY<Pixel>> {
    (0.0..=1.0f64, 0.0..=1.0f64, 0.0..=1.0f64, 0.0..=1.0f64)
        .prop_map(move |(a, b, c, d)| {
            let (w, h) = (width as f64, height as f64);
            BBoxXYXY::from_xyxy(a.min(b) * w, c.min(d) * h, a.max(b) * w, c.max(d) * h)
        })
        .boxed()
}

/// A box that may lie partly or wholly outside the image, or be inverted.
pub fn arb_bbox_unbounded(width: u32, height: u32) -> BoxedStrategy<BBoxXYXY<Pixel>> {
    let (w, h) = (width as f64, height as f64);
    (-w..=2.0 * w, -h..=2.0 * h, -w..=2.0 * w, -h..=2.0 * h)
        .prop_map(|(xmin, ymin, xmax, ymax)| BBoxXYXY::from_xyxy(xmin, ymin, xmax, ymax))
        .boxed()
}

pub fn arb_image_with_bbox() -> impl Strategy<Value = (u32, u32, BBoxXYXY<Pixel>)> {
    arb_image_size().prop_flat_map(|(w, h)| (Just(w), Just(h), arb_bbox_within(w, h)))
}

pub fn arb_image_with_unbounded_bbox() -> impl Strategy<Value = (u32, u32, BBoxXYXY<Pixel>)> {
    arb_image_size().prop_flat_map(|(w, h)| (Just(w), Just(h), arb_bbox_unbounded(w, h)))
}

pub fn arb_class_name() -> impl Strategy<Value = String> {
    "[a-z][a-z_]{0,11}"
}
