//! Fuzz target for detector output JSON.
//!
//! Deserializes arbitrary bytes as a detected template and, when that
//! succeeds, exercises grid interpolation on every bubble.

#![no_main]

use accuvote_convert::detect::DetectedTemplate;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(template) = serde_json::from_slice::<DetectedTemplate>(data) {
        for page in &template.pages {
            for &bubble in &page.bubbles {
                let _ = page.grid.point_for_bubble(bubble);
            }
        }
    }
});
