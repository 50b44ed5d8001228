//! Annotation records and the file formats they are read from and written to.
//!
//! Boxes carry their coordinate space in the type: VOC files are read into
//! [`BBoxXYXY<Pixel>`] and YOLO labels hold normalized center/size values, so
//! the two cannot be mixed up on the way through the converter.
//!
//! # Example
//!
//! ```
//! use yolokit::ir::{BBoxXYXY, Pixel, YoloLabel};
//!
//! let bbox = BBoxXYXY::<Pixel>::from_xyxy(10.0, 20.0, 50.0, 80.0);
//! let label = YoloLabel::from_pixel_box(0, &bbox, 100, 200);
//! assert_eq!(label.to_string(), "0 0.300000 0.250000 0.400000 0.300000");
//! ```

mod bbox;
pub mod io_voc_xml;
pub mod io_yolo;
mod model;
mod space;

pub use bbox::BBoxXYXY;
pub use model::{VocAnnotation, VocObject, YoloLabel};
pub use space::{Normalized, Pixel};
