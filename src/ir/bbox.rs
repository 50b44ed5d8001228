//! Axis-aligned bounding boxes in XYXY form.

use std::marker::PhantomData;

use super::space::{Normalized, Pixel};

/// An axis-aligned bounding box stored as (xmin, ymin, xmax, ymax).
///
/// The `TSpace` parameter is [`Pixel`] or [`Normalized`]. Construction does
/// not check that min <= max; VOC files in the wild contain inverted and
/// out-of-bounds boxes, and the converter decides what to do with them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBoxXYXY<TSpace> {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    _space: PhantomData<TSpace>,
}

impl<TSpace> BBoxXYXY<TSpace> {
    #[inline]
    pub fn from_xyxy(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
            _space: PhantomData,
        }
    }

    /// May be negative if the box is inverted.
    #[inline]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// May be negative if the box is inverted.
    #[inline]
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }
}

impl BBoxXYXY<Pixel> {
    /// Center/size form normalized by the image dimensions.
    ///
    /// Returns `(cx, cy, w, h)` computed as `center = (min + max) / 2 / dim`
    /// and `size = (max - min) / dim`. No clamping happens here.
    pub fn to_normalized_cxcywh(&self, image_width: f64, image_height: f64) -> (f64, f64, f64, f64) {
        (
            (self.xmin + self.xmax) / 2.0 / image_width,
            (self.ymin + self.ymax) / 2.0 / image_height,
            self.width() / image_width,
            self.height() / image_height,
        )
    }
}

impl BBoxXYXY<Normalized> {
    /// Builds a box from YOLO center/size values.
    pub fn from_cxcywh(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self::from_xyxy(cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0)
    }

    /// Scales back to pixel coordinates.
    pub fn to_pixel(&self, image_width: f64, image_height: f64) -> BBoxXYXY<Pixel> {
        BBoxXYXY::from_xyxy(
            self.xmin * image_width,
            self.ymin * image_height,
            self.xmax * image_width,
            self.ymax * image_height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_follow_corners() {
        let bbox: BBoxXYXY<Pixel> = BBoxXYXY::from_xyxy(10.0, 20.0, 100.0, 80.0);
        assert_eq!(bbox.width(), 90.0);
        assert_eq!(bbox.height(), 60.0);

        let inverted: BBoxXYXY<Pixel> = BBoxXYXY::from_xyxy(100.0, 80.0, 10.0, 20.0);
        assert_eq!(inverted.width(), -90.0);
        assert_eq!(inverted.to_normalized_cxcywh(100.0, 100.0).2, -0.9);
    }

    #[test]
    fn normalized_cxcywh_matches_voc_to_yolo_formula() {
        let bbox: BBoxXYXY<Pixel> = BBoxXYXY::from_xyxy(10.0, 20.0, 50.0, 80.0);
        let (cx, cy, w, h) = bbox.to_normalized_cxcywh(100.0, 200.0);
        assert!((cx - 0.3).abs() < 1e-12);
        assert!((cy - 0.25).abs() < 1e-12);
        assert!((w - 0.4).abs() < 1e-12);
        assert!((h - 0.3).abs() < 1e-12);
    }

    #[test]
    fn cxcywh_back_to_pixels() {
        let bbox = BBoxXYXY::<Normalized>::from_cxcywh(0.5, 0.5, 0.5, 0.25);
        let px = bbox.to_pixel(200.0, 100.0);
        assert_eq!(px, BBoxXYXY::from_xyxy(50.0, 37.5, 150.0, 62.5));
    }
}
