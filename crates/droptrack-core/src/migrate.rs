//! Record normalization and schema migration.
//!
//! Persisted and imported records come in two shapes:
//!
//! - legacy (`dropToolItems_v2`): `denom`, `count`, `dropped`
//! - canonical (`dropToolItems_v3`): see [`ItemRecord`]
//!
//! [`normalize`] coerces every field of an arbitrary JSON value, then fills
//! each canonical field from its legacy counterpart only when the canonical
//! field is absent. The decision is made field by field on presence alone,
//! so normalizing an already-canonical record changes nothing.
//!
//! The legacy shape has a single completion flag. It is taken to complete
//! both the drop and the rare track; the attempt at which it happened is not
//! recoverable, so `dropAt`/`rareAt` stay empty unless the source has them.

use std::collections::HashSet;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::debug;

use crate::model::item::ItemRecord;
use crate::model::item_id::generate_item_id;

/// Canonical fields, each `None` when absent from the source.
#[derive(Debug, Default)]
struct CanonicalFields {
    drop_denom: Option<u32>,
    rare_denom: Option<u32>,
    drop_done: Option<bool>,
    rare_done: Option<bool>,
    drop_at: Option<u64>,
    rare_at: Option<u64>,
}

/// Fields only the legacy single-rate shape carries.
#[derive(Debug, Default)]
struct LegacyFields {
    denom: Option<u32>,
    dropped: Option<bool>,
}

impl CanonicalFields {
    fn read(map: &Map<String, Value>) -> Self {
        Self {
            drop_denom: present(map, "dropDenom").map(coerce_u32),
            rare_denom: present(map, "rareDenom").map(coerce_u32),
            drop_done: present(map, "dropDone").map(truthy),
            rare_done: present(map, "rareDone").map(truthy),
            drop_at: present(map, "dropAt").and_then(coerce_count),
            rare_at: present(map, "rareAt").and_then(coerce_count),
        }
    }
}

impl LegacyFields {
    fn read(map: &Map<String, Value>) -> Self {
        Self {
            denom: present(map, "denom").map(coerce_u32),
            dropped: present(map, "dropped").map(truthy),
        }
    }
}

/// Normalize an arbitrary value into a canonical record.
///
/// Missing or unusable fields fall back to `0`, `false`, or `""`; a missing
/// id or creation time is generated. The result may still be invalid (see
/// [`is_valid`]).
#[must_use]
pub fn normalize(raw: &Value) -> ItemRecord {
    normalize_at(raw, Utc::now().timestamp_millis())
}

/// [`normalize`] with an explicit "now" for generated creation times.
#[must_use]
pub fn normalize_at(raw: &Value, now_ms: i64) -> ItemRecord {
    let empty = Map::new();
    let map = raw.as_object().unwrap_or(&empty);

    let canonical = CanonicalFields::read(map);
    let legacy = LegacyFields::read(map);

    let id = present(map, "id")
        .map(coerce_string)
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| generate_item_id(now_ms));
    let created_at = present(map, "createdAt")
        .and_then(coerce_timestamp)
        .unwrap_or(now_ms);

    ItemRecord {
        id,
        name: present(map, "name")
            .map(coerce_string)
            .unwrap_or_default()
            .trim()
            .to_string(),
        drop_denom: canonical.drop_denom.or(legacy.denom).unwrap_or(0),
        rare_denom: canonical.rare_denom.unwrap_or(0),
        count: present(map, "count").and_then(coerce_count).unwrap_or(0),
        drop_done: canonical.drop_done.or(legacy.dropped).unwrap_or(false),
        rare_done: canonical.rare_done.or(legacy.dropped).unwrap_or(false),
        drop_at: canonical.drop_at,
        rare_at: canonical.rare_at,
        created_at,
    }
}

/// A record is kept only with a non-blank name and a positive drop rate.
///
/// `count` is an unsigned integer, so it is always a finite number.
#[must_use]
pub fn is_valid(record: &ItemRecord) -> bool {
    !record.name.trim().is_empty() && record.drop_denom > 0
}

/// Normalize every element, silently discarding invalid ones.
///
/// Ids are unique in the result: a repeated id keeps its first holder and
/// later records get a fresh one.
#[must_use]
pub fn normalize_batch(values: &[Value]) -> Vec<ItemRecord> {
    let now_ms = Utc::now().timestamp_millis();
    let mut records: Vec<ItemRecord> = values
        .iter()
        .map(|value| normalize_at(value, now_ms))
        .filter(is_valid)
        .collect();

    let discarded = values.len() - records.len();
    if discarded > 0 {
        debug!(discarded, kept = records.len(), "discarded invalid item records");
    }
    dedupe_ids(&mut records);
    records
}

fn dedupe_ids(records: &mut [ItemRecord]) {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records.iter_mut() {
        while !seen.insert(record.id.clone()) {
            let fresh = generate_item_id(record.created_at);
            debug!(old = %record.id, new = %fresh, "re-keyed duplicate item id");
            record.id = fresh;
        }
    }
}

/// `null` counts as absent.
fn present<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|value| !value.is_null())
}

/// Browser-style truthiness.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "true".to_string(),
        Value::Null | Value::Bool(false) | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// A non-negative integer read from a number, numeric string, or boolean.
///
/// Fractions truncate toward zero, negatives clamp to zero, and anything
/// unparseable yields `None`.
fn coerce_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(|_| 0))
            .or_else(|| n.as_f64().and_then(float_to_count)),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                Some(0)
            } else {
                s.parse::<u64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(float_to_count))
            }
        }
        Value::Bool(b) => Some(u64::from(*b)),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn float_to_count(f: f64) -> Option<u64> {
    if f.is_finite() {
        Some(if f <= 0.0 { 0 } else { f.trunc() as u64 })
    } else {
        None
    }
}

fn coerce_u32(value: &Value) -> u32 {
    coerce_count(value).map_or(0, |n| u32::try_from(n).unwrap_or(u32::MAX))
}

/// Only strictly positive timestamps are kept.
fn coerce_timestamp(value: &Value) -> Option<i64> {
    coerce_count(value)
        .filter(|ms| *ms > 0)
        .map(|ms| i64::try_from(ms).unwrap_or(i64::MAX))
}
