//! Opaque item identifiers.

/// Prefix carried by every generated id.
pub const ITEM_ID_PREFIX: &str = "id_";

/// Generate a fresh id: random hex followed by the creation time in hex.
///
/// Ids are opaque; nothing parses them back.
#[must_use]
pub fn generate_item_id(now_ms: i64) -> String {
    let entropy: u64 = rand::random();
    format!("{ITEM_ID_PREFIX}{entropy:016x}{:x}", now_ms.max(0))
}
