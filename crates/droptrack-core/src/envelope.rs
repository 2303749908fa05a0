//! Backup/restore envelope.
//!
//! ```json
//! { "version": 3, "exportedAt": 1700000000000, "items": [ ... ] }
//! ```
//!
//! Import accepts envelopes from any generation: elements of `items` go
//! through [`normalize`](crate::migrate::normalize), so a version-1 backup with legacy single-rate
//! records restores into the current shape.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::DropError;
use crate::migrate::normalize_batch;
use crate::model::item::ItemRecord;

/// Envelope version written by [`export_envelope`].
pub const ENVELOPE_VERSION: u32 = 3;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a> {
    version: u32,
    exported_at: i64,
    items: &'a [ItemRecord],
}

/// Serialize `items` into pretty-printed envelope text.
///
/// # Errors
///
/// Only if serialization itself fails, which plain records never do.
pub fn export_envelope(items: &[ItemRecord], exported_at: i64) -> Result<String, DropError> {
    let envelope = Envelope {
        version: ENVELOPE_VERSION,
        exported_at,
        items,
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// Parse envelope text into validated records.
///
/// Invalid elements are dropped without comment. Ids repeated within the
/// backup are replaced so every id in the result is unique.
///
/// # Errors
///
/// - [`DropError::MalformedInput`] when the text is not JSON, not an object,
///   or `items` is not an array
/// - [`DropError::EmptyResult`] when no element survives validation
pub fn import_envelope(text: &str) -> Result<Vec<ItemRecord>, DropError> {
    let parsed: Value = serde_json::from_str(text.trim()).map_err(|err| DropError::MalformedInput {
        reason: err.to_string(),
    })?;

    let Some(object) = parsed.as_object() else {
        return Err(DropError::MalformedInput {
            reason: "expected a JSON object".to_string(),
        });
    };

    let Some(raw_items) = object.get("items").and_then(Value::as_array) else {
        return Err(DropError::MalformedInput {
            reason: "`items` must be an array".to_string(),
        });
    };

    match object.get("version").and_then(Value::as_u64) {
        Some(version) if version == u64::from(ENVELOPE_VERSION) => {}
        other => debug!(version = ?other, "importing envelope from another generation"),
    }

    let items = normalize_batch(raw_items);
    if items.is_empty() {
        return Err(DropError::EmptyResult);
    }

    info!(
        received = raw_items.len(),
        kept = items.len(),
        "parsed backup envelope"
    );
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Vec<ItemRecord> {
        let mut key = ItemRecord::new("id_a", "Boss Key", 64, 256, 1_700_000_000_000);
        key.count = 10;
        key.mark(crate::model::item::EventKind::Drop);
        let orb = ItemRecord::new("id_b", "Orb", 4096, 0, 1_700_000_000_001);
        vec![key, orb]
    }

    #[test]
    fn export_shape() {
        let text = export_envelope(&sample(), 42).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["version"], 3);
        assert_eq!(value["exportedAt"], 42);
        assert_eq!(value["items"].as_array().unwrap().len(), 2);
        assert_eq!(value["items"][0]["dropAt"], 10);
    }

    #[test]
    fn round_trip_preserves_records() {
        let items = sample();
        let text = export_envelope(&items, 42).unwrap();
        assert_eq!(import_envelope(&text).unwrap(), items);
    }

    #[test]
    fn malformed_text_is_rejected() {
        for text in ["", "not json", "[1,2]", "{\"items\": 3}", "{\"version\": 3}", "{\"items\": {}}"] {
            assert!(
                matches!(import_envelope(text), Err(DropError::MalformedInput { .. })),
                "expected malformed for {text:?}"
            );
        }
    }

    #[test]
    fn empty_or_all_invalid_is_empty_result() {
        assert!(matches!(
            import_envelope(r#"{"items":[]}"#),
            Err(DropError::EmptyResult)
        ));
        assert!(matches!(
            import_envelope(r#"{"items":[{"name":""},{"name":"x","denom":0},null]}"#),
            Err(DropError::EmptyResult)
        ));
    }

    #[test]
    fn legacy_v1_backup_migrates() {
        let text = json!({
            "version": 1,
            "exportedAt": 1,
            "items": [
                {"id": "id_old", "name": "Orb", "denom": 128, "count": 40, "dropped": true, "createdAt": 5},
                {"id": "id_bad", "name": "", "denom": 8}
            ]
        })
        .to_string();
        let items = import_envelope(&text).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].drop_denom, 128);
        assert!(items[0].is_fully_resolved());
        assert_eq!(items[0].created_at, 5);
    }

    #[test]
    fn duplicate_ids_are_rekeyed() {
        let text = json!({
            "items": [
                {"id": "same", "name": "A", "dropDenom": 8},
                {"id": "same", "name": "B", "dropDenom": 8}
            ]
        })
        .to_string();
        let items = import_envelope(&text).unwrap();
        assert_eq!(items[0].id, "same");
        assert_ne!(items[1].id, "same");
    }
}
