#![allow(dead_code)]

use std::fs;
use std::path::Path;

pub fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
    let row_stride = (width * 3).div_ceil(4) * 4;
    let pixel_array_size = row_stride * height;
    let file_size = 54 + pixel_array_size;

    let mut bytes = Vec::with_capacity(file_size as usize);
    bytes.extend_from_slice(b"BM");
    bytes.extend_from_slice(&file_size.to_le_bytes());
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(&54u32.to_le_bytes());

    bytes.extend_from_slice(&40u32.to_le_bytes());
    bytes.extend_from_slice(&(width as i32).to_le_bytes());
    bytes.extend_from_slice(&(height as i32).to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&24u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&pixel_array_size.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());

    bytes.resize(file_size as usize, 0);
    bytes
}

pub fn write_bmp(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, bmp_bytes(width, height)).expect("write bmp file");
}

/// One `<object>` entry: class name and `(xmin, ymin, xmax, ymax)`.
pub type VocBox<'a> = (&'a str, [f64; 4]);

pub fn voc_xml(filename: &str, width: u32, height: u32, objects: &[VocBox<'_>]) -> String {
    let mut xml = format!(
        "<annotation>\n  <filename>{filename}</filename>\n  <size>\n    <width>{width}</width>\n    <height>{height}</height>\n    <depth>3</depth>\n  </size>\n"
    );
    for (name, [xmin, ymin, xmax, ymax]) in objects {
        xml.push_str(&format!(
            "  <object>\n    <name>{name}</name>\n    <bndbox>\n      <xmin>{xmin}</xmin>\n      <ymin>{ymin}</ymin>\n      <xmax>{xmax}</xmax>\n      <ymax>{ymax}</ymax>\n    </bndbox>\n  </object>\n"
        ));
    }
    xml.push_str("</annotation>\n");
    xml
}

/// Write `<root>/annotations/<stem>.xml` and, with `image: true`, a BMP at
/// `<root>/images/<stem>.bmp` with the same dimensions.
pub fn write_voc_pair(
    root: &Path,
    stem: &str,
    width: u32,
    height: u32,
    objects: &[VocBox<'_>],
    image: bool,
) {
    let annotations = root.join("annotations");
    fs::create_dir_all(&annotations).expect("create annotations dir");
    fs::create_dir_all(root.join("images")).expect("create images dir");

    let filename = format!("{stem}.bmp");
    fs::write(
        annotations.join(format!("{stem}.xml")),
        voc_xml(&filename, width, height, objects),
    )
    .expect("write annotation");

    if image {
        write_bmp(&root.join("images").join(filename), width, height);
    }
}

/// `count` single-pothole pairs named `potholes0` .. `potholes{count-1}`.
pub fn write_pothole_dataset(root: &Path, count: usize) {
    for idx in 0..count {
        write_voc_pair(
            root,
            &format!("potholes{idx}"),
            40,
            30,
            &[("pothole", [4.0, 3.0, 20.0, 15.0])],
            true,
        );
    }
}
