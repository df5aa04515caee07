//! Fuzz target for the cleaning engine.
//!
//! Parses arbitrary delimited text and runs the default plan. Missing
//! columns are expected errors; a panic or an unsorted result is a bug.

#![no_main]

use libfuzzer_sys::fuzz_target;
use edusheet::{Cleaner, Parser};
use std::io::Write;

fuzz_target!(|data: &[u8]| {
    if data.len() > 50_000 {
        return;
    }

    // Prefix the expected header so most inputs reach the cleaner.
    let mut content = b"Education Institute,Country Name,Region,Field of Study\n".to_vec();
    content.extend_from_slice(data);

    let Ok(mut temp_file) = tempfile::Builder::new().suffix(".csv").tempfile() else {
        return;
    };
    if temp_file.write_all(&content).is_err() {
        return;
    }

    let Ok((mut table, _)) = Parser::new().parse_file(temp_file.path()) else {
        return;
    };
    if Cleaner::new().apply(&mut table).is_ok() {
        assert!(table.rows.iter().flatten().all(|c| !c.is_empty()));
        assert!(table.rows.iter().flatten().all(|c| !c.contains("Total")));
    }
});
