//! Feeds arbitrary lines to the label/prediction row parser.

#![no_main]

use libfuzzer_sys::fuzz_target;
use yolokit::ir::io_yolo::fuzz_parse_label_line;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };

    let _ = fuzz_parse_label_line(line);
});
