#![no_main]

use droptrack_core::envelope::{export_envelope, import_envelope};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(items) = import_envelope(text) else {
        return;
    };
    assert!(!items.is_empty());

    let mut ids: Vec<&str> = items.iter().map(|item| item.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), items.len(), "imported ids must be unique");

    let Ok(backup) = export_envelope(&items, 0) else {
        return;
    };
    assert_eq!(import_envelope(&backup).ok(), Some(items));
});
