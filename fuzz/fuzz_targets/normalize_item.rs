#![no_main]

use droptrack_core::migrate::{is_valid, normalize_at};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<Value>(data) else {
        return;
    };
    let record = normalize_at(&value, 1_700_000_000_000);
    if !is_valid(&record) {
        return;
    }

    // Normalizing an already-normalized record must be a no-op.
    let Ok(encoded) = serde_json::to_value(&record) else {
        return;
    };
    assert_eq!(normalize_at(&encoded, 0), record);
});
