//! VOC to YOLO annotation conversion.
//!
//! Turns one parsed [`VocAnnotation`] into YOLO label rows using a fixed
//! [`ClassRegistry`]. Objects whose class is not registered are dropped and
//! reported back; they never fail the conversion.

use std::path::Path;

use crate::classes::ClassRegistry;
use crate::error::YolokitError;
use crate::ir::io_voc_xml;
use crate::ir::{VocAnnotation, YoloLabel};

/// Labels produced for one annotation, plus the class names that were dropped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConvertedAnnotation {
    pub labels: Vec<YoloLabel>,
    /// Unregistered class names, one entry per dropped object.
    pub unknown_classes: Vec<String>,
}

impl ConvertedAnnotation {
    /// True when nothing is left to write; the image is excluded from output.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Convert every object of `annotation` whose class is registered.
pub fn convert_annotation(annotation: &VocAnnotation, registry: &ClassRegistry) -> ConvertedAnnotation {
    let mut converted = ConvertedAnnotation::default();

    for object in &annotation.objects {
        match registry.index_of(&object.name) {
            Some(class_id) => converted.labels.push(YoloLabel::from_pixel_box(
                class_id,
                &object.bbox,
                annotation.width,
                annotation.height,
            )),
            None => converted.unknown_classes.push(object.name.clone()),
        }
    }

    converted
}

/// Read `xml_path` and convert it, warning once per unknown class name.
pub fn convert_voc_file(
    xml_path: &Path,
    registry: &ClassRegistry,
) -> Result<ConvertedAnnotation, YolokitError> {
    let annotation = io_voc_xml::read_voc_xml(xml_path)?;
    let converted = convert_annotation(&annotation, registry);

    let mut reported: Vec<&str> = Vec::new();
    for name in &converted.unknown_classes {
        if !reported.contains(&name.as_str()) {
            log::warn!(
                "unknown class '{}' in {}; object skipped",
                name,
                xml_path.display()
            );
            reported.push(name.as_str());
        }
    }

    Ok(converted)
}
