//! Feeds arbitrary bytes to the VOC annotation parser.

#![no_main]

use libfuzzer_sys::fuzz_target;
use yolokit::classes::ClassRegistry;
use yolokit::conversion::convert_annotation;
use yolokit::ir::io_voc_xml::from_voc_xml_slice;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    // Anything that parses must also convert without panicking.
    if let Ok(annotation) = from_voc_xml_slice(data) {
        let names: Vec<&str> = annotation.objects.iter().map(|o| o.name.as_str()).collect();
        let registry = ClassRegistry::from_names(names);
        let _ = convert_annotation(&annotation, &registry);
    }
});
