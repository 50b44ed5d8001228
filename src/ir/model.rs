//! Record types shared by the VOC reader, the converter and the YOLO writer.

use std::fmt;

use serde::Serialize;

use super::bbox::BBoxXYXY;
use super::space::{Normalized, Pixel};

/// One Pascal VOC annotation file.
#[derive(Clone, Debug, PartialEq)]
pub struct VocAnnotation {
    /// The `<filename>` element, when present. Image lookup goes by the XML
    /// file stem, not by this value.
    pub filename: Option<String>,

    /// Image width in pixels. Always > 0 once parsed.
    pub width: u32,

    /// Image height in pixels. Always > 0 once parsed.
    pub height: u32,

    pub objects: Vec<VocObject>,
}

/// A single `<object>` entry.
#[derive(Clone, Debug, PartialEq)]
pub struct VocObject {
    pub name: String,
    pub bbox: BBoxXYXY<Pixel>,
}

/// One line of a YOLO label file.
///
/// All four coordinates are normalized and clamped to `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct YoloLabel {
    pub class_id: usize,
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
}

impl YoloLabel {
    /// Converts a pixel box, clamping each output value to `[0, 1]`.
    pub fn from_pixel_box(
        class_id: usize,
        bbox: &BBoxXYXY<Pixel>,
        image_width: u32,
        image_height: u32,
    ) -> Self {
        let (cx, cy, w, h) = bbox.to_normalized_cxcywh(image_width as f64, image_height as f64);
        Self {
            class_id,
            cx: clamp_unit(cx),
            cy: clamp_unit(cy),
            w: clamp_unit(w),
            h: clamp_unit(h),
        }
    }

    pub fn normalized_box(&self) -> BBoxXYXY<Normalized> {
        BBoxXYXY::from_cxcywh(self.cx, self.cy, self.w, self.h)
    }

    pub fn pixel_box(&self, image_width: u32, image_height: u32) -> BBoxXYXY<Pixel> {
        self.normalized_box()
            .to_pixel(image_width as f64, image_height as f64)
    }
}

/// Renders `<class_id> <cx> <cy> <w> <h>` with six decimals.
impl fmt::Display for YoloLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.6} {:.6} {:.6} {:.6}",
            self.class_id, self.cx, self.cy, self.w, self.h
        )
    }
}

fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}
