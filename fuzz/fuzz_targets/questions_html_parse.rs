//! Fuzz target for the constitutional question blob parser.
//!
//! Exercises both the HTML fragment walker and the question state machine
//! on its own.

#![no_main]

use accuvote_convert::definition::{fuzz_parse_question_lines, parse_questions_html};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    if let Ok(text) = std::str::from_utf8(data) {
        let _ = parse_questions_html(text);
        let _ = fuzz_parse_question_lines(text);
    }
});
