//! Fuzz target for ballot definition XML parsing.
//!
//! This fuzzer feeds arbitrary text to the definition parser, checking for
//! panics, crashes, or hangs.

#![no_main]

use accuvote_convert::definition::parse_definition_str;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Cap input size to avoid excessive memory usage.
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(xml) = std::str::from_utf8(data) {
        let _ = parse_definition_str(xml);
    }
});
