//! Criterion microbenches for VOC parsing and YOLO label conversion.
//!
//! Run with: `cargo bench`

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;

use yolokit::classes::ClassRegistry;
use yolokit::conversion::convert_annotation;
use yolokit::ir::io_voc_xml::{from_voc_xml_slice, from_voc_xml_str};
use yolokit::ir::io_yolo::format_label_lines;

/// A road image with a handful of objects, one of an unregistered class.
const VOC_FIXTURE: &str = r#"<annotation>
  <folder>potholes</folder>
  <filename>potholes12.png</filename>
  <size><width>600</width><height>400</height><depth>3</depth></size>
  <segmented>0</segmented>
  <object><name>pothole</name><pose>Unspecified</pose><truncated>0</truncated><difficult>0</difficult>
    <bndbox><xmin>12</xmin><ymin>210</ymin><xmax>140</xmax><ymax>298</ymax></bndbox></object>
  <object><name>pothole</name><pose>Unspecified</pose><truncated>0</truncated><difficult>0</difficult>
    <bndbox><xmin>220</xmin><ymin>260</ymin><xmax>361</xmax><ymax>340</ymax></bndbox></object>
  <object><name>crack</name><pose>Unspecified</pose><truncated>1</truncated><difficult>0</difficult>
    <bndbox><xmin>401</xmin><ymin>300</ymin><xmax>612</xmax><ymax>399</ymax></bndbox></object>
  <object><name>manhole</name><pose>Unspecified</pose><truncated>0</truncated><difficult>1</difficult>
    <bndbox><xmin>480</xmin><ymin>120</ymin><xmax>530</xmax><ymax>150</ymax></bndbox></object>
</annotation>
"#;

fn bench_voc_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("voc_parse");
    group.throughput(Throughput::Bytes(VOC_FIXTURE.len() as u64));

    group.bench_function("from_voc_xml_str", |b| {
        b.iter(|| {
            let ann = from_voc_xml_str(black_box(VOC_FIXTURE)).unwrap();
            black_box(ann)
        })
    });

    group.bench_function("from_voc_xml_slice", |b| {
        b.iter(|| {
            let ann = from_voc_xml_slice(black_box(VOC_FIXTURE.as_bytes())).unwrap();
            black_box(ann)
        })
    });

    group.finish();
}

fn bench_convert(c: &mut Criterion) {
    let annotation = from_voc_xml_str(VOC_FIXTURE).expect("parse fixture");
    let registry = ClassRegistry::from_names(["crack", "pothole"]);

    let mut group = c.benchmark_group("convert");
    group.throughput(Throughput::Elements(annotation.objects.len() as u64));

    group.bench_function("convert_annotation", |b| {
        b.iter(|| {
            let converted = convert_annotation(black_box(&annotation), black_box(&registry));
            black_box(converted)
        })
    });

    let converted = convert_annotation(&annotation, &registry);
    group.bench_function("format_label_lines", |b| {
        b.iter(|| {
            let text = format_label_lines(black_box(&converted.labels));
            black_box(text)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_voc_parse, bench_convert);
criterion_main!(benches);
