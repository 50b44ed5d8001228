//! Pascal VOC XML reader.
//!
//! Reads the flat `annotations/` directory layout: one XML file per image,
//! named after the image stem. Only the fields the YOLO conversion needs are
//! extracted (`size/width`, `size/height`, and each object's `name` and
//! `bndbox`).

use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::Node;
use walkdir::WalkDir;

use super::model::{VocAnnotation, VocObject};
use super::{BBoxXYXY, Pixel};
use crate::error::YolokitError;

const VOC_XML_EXTENSION: &str = "xml";

/// List the `.xml` files directly inside `dir`, sorted by file name.
///
/// The extension match is case-sensitive. XML files one directory down are
/// not part of the layout; they are skipped with a warning.
pub fn collect_xml_files(dir: &Path) -> Result<Vec<PathBuf>, YolokitError> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir).map_err(YolokitError::Io)? {
        let entry = entry.map_err(YolokitError::Io)?;
        let path = entry.path();
        if path.is_file() && has_xml_extension(&path) {
            files.push(path);
        }
    }

    files.sort_by_cached_key(|path| {
        path.file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    });

    let nested = WalkDir::new(dir)
        .min_depth(2)
        .max_depth(2)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && has_xml_extension(entry.path()))
        .count();

    if nested > 0 {
        log::warn!(
            "annotation directory {} is scanned flat; ignoring {} nested .xml file(s)",
            dir.display(),
            nested
        );
    }

    Ok(files)
}

/// Read and parse one VOC XML file.
pub fn read_voc_xml(path: &Path) -> Result<VocAnnotation, YolokitError> {
    let xml = fs::read_to_string(path).map_err(YolokitError::Io)?;
    parse_voc_xml_str(&xml, path)
}

/// Class names of every `<object>` in one file, in document order.
///
/// Only `object/name` is read, so files lacking `<size>` or a complete
/// `<bndbox>` still contribute their names.
pub fn read_voc_class_names(path: &Path) -> Result<Vec<String>, YolokitError> {
    let xml = fs::read_to_string(path).map_err(YolokitError::Io)?;
    let document = roxmltree::Document::parse(&xml).map_err(|source| YolokitError::VocXmlParse {
        path: path.to_path_buf(),
        message: source.to_string(),
    })?;

    document
        .root_element()
        .children()
        .filter(|node| node.is_element() && node.tag_name().name() == "object")
        .map(|object| required_child_text(object, "name", path, "<object>"))
        .collect()
}

/// Parse VOC XML from a UTF-8 string.
pub fn from_voc_xml_str(xml: &str) -> Result<VocAnnotation, YolokitError> {
    parse_voc_xml_str(xml, Path::new("<memory>"))
}

/// Parse VOC XML from bytes. The input must be valid UTF-8.
pub fn from_voc_xml_slice(bytes: &[u8]) -> Result<VocAnnotation, YolokitError> {
    let xml = std::str::from_utf8(bytes).map_err(|source| YolokitError::VocXmlParse {
        path: PathBuf::from("<memory>"),
        message: format!("input is not valid UTF-8: {source}"),
    })?;
    from_voc_xml_str(xml)
}

fn parse_voc_xml_str(xml: &str, path: &Path) -> Result<VocAnnotation, YolokitError> {
    let document = roxmltree::Document::parse(xml).map_err(|source| YolokitError::VocXmlParse {
        path: path.to_path_buf(),
        message: source.to_string(),
    })?;

    let annotation = document.root_element();
    if annotation.tag_name().name() != "annotation" {
        return Err(parse_error(path, "missing <annotation> root element"));
    }

    let filename = optional_child_text(annotation, "filename");

    let size = required_child_element(annotation, "size", path, "<annotation>")?;
    let width = parse_required_dimension(size, "width", path)?;
    let height = parse_required_dimension(size, "height", path)?;

    let mut objects = Vec::new();
    for object in annotation
        .children()
        .filter(|node| node.is_element() && node.tag_name().name() == "object")
    {
        let name = required_child_text(object, "name", path, "<object>")?;
        let bndbox = required_child_element(object, "bndbox", path, "<object>")?;

        let xmin = parse_required_f64(bndbox, "xmin", path)?;
        let ymin = parse_required_f64(bndbox, "ymin", path)?;
        let xmax = parse_required_f64(bndbox, "xmax", path)?;
        let ymax = parse_required_f64(bndbox, "ymax", path)?;

        objects.push(VocObject {
            name,
            bbox: BBoxXYXY::<Pixel>::from_xyxy(xmin, ymin, xmax, ymax),
        });
    }

    Ok(VocAnnotation {
        filename,
        width,
        height,
        objects,
    })
}

fn parse_error(path: &Path, message: impl Into<String>) -> YolokitError {
    YolokitError::VocXmlParse {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

fn required_child_element<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &str,
    path: &Path,
    context: &str,
) -> Result<Node<'a, 'input>, YolokitError> {
    child_element(node, tag).ok_or_else(|| parse_error(path, format!("missing <{tag}> in {context}")))
}

fn required_child_text(
    node: Node<'_, '_>,
    tag: &str,
    path: &Path,
    context: &str,
) -> Result<String, YolokitError> {
    optional_child_text(node, tag)
        .ok_or_else(|| parse_error(path, format!("missing <{tag}> in {context}")))
}

/// Image dimensions must be positive: they are divisors in the conversion.
fn parse_required_dimension(node: Node<'_, '_>, tag: &str, path: &Path) -> Result<u32, YolokitError> {
    let raw = required_child_text(node, tag, path, "<size>")?;
    match raw.parse::<u32>() {
        Ok(0) => Err(parse_error(path, format!("<{tag}> in <size> must be greater than 0"))),
        Ok(value) => Ok(value),
        Err(_) => Err(parse_error(
            path,
            format!("invalid <{tag}> value '{raw}' in <size>; expected u32"),
        )),
    }
}

fn parse_required_f64(node: Node<'_, '_>, tag: &str, path: &Path) -> Result<f64, YolokitError> {
    let raw = required_child_text(node, tag, path, "<bndbox>")?;
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| {
            parse_error(
                path,
                format!("invalid <{tag}> value '{raw}' in <bndbox>; expected a finite number"),
            )
        })
}

fn child_element<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == tag)
}

fn optional_child_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    child_element(node, tag)
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToOwned::to_owned)
}

fn has_xml_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == VOC_XML_EXTENSION)
        .unwrap_or(false)
}
