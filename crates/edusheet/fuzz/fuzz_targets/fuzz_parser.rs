//! Fuzz target for the spreadsheet parser.
//!
//! The same bytes are offered as delimited text and as a workbook; neither
//! path may panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use edusheet::Parser;
use std::io::Write;

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    for suffix in [".csv", ".xlsx"] {
        if let Ok(mut temp_file) = tempfile::Builder::new().suffix(suffix).tempfile() {
            if temp_file.write_all(data).is_ok() {
                let _ = Parser::new().parse_file(temp_file.path());
            }
        }
    }
});
