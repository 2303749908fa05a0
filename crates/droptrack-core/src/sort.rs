//! Collection orderings.
//!
//! Both sorts are stable, so items that compare equal keep their previous
//! relative order. Sort direction is chosen by the caller; nothing here
//! remembers the last direction.

use std::cmp::{Ordering, Reverse};

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::model::item::{EventKind, ItemRecord};

/// Sort key for an unset (`0`) denominator: after every real rate.
pub const UNSET_RATE_SENTINEL: u64 = u64::MAX;

/// Multi-level collation key for item names.
///
/// Levels, compared in order:
/// 1. base letters: compatibility-decomposed, accents and voicing marks
///    removed, lowercased, katakana folded onto hiragana
/// 2. accents: as level 1 but keeping combining marks
/// 3. variants: lowercase before uppercase, hiragana before katakana
/// 4. the raw string, so distinct names never compare equal
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CollationKey {
    base: Vec<char>,
    accents: Vec<char>,
    variants: Vec<u8>,
    raw: String,
}

impl CollationKey {
    #[must_use]
    pub fn new(name: &str) -> Self {
        let decomposed: Vec<char> = name.nfkd().collect();

        let accents: Vec<char> = decomposed
            .iter()
            .map(|&c| fold_kana(c))
            .flat_map(char::to_lowercase)
            .collect();
        let base = accents
            .iter()
            .copied()
            .filter(|&c| !is_combining_mark(c))
            .collect();
        let variants = decomposed
            .iter()
            .filter(|&&c| !is_combining_mark(c))
            .map(|&c| u8::from(c.is_uppercase()) | (u8::from(is_katakana(c)) << 1))
            .collect();

        Self {
            base,
            accents,
            variants,
            raw: name.to_string(),
        }
    }
}

/// Collation-aware comparison of two names.
#[must_use]
pub fn compare_names(a: &str, b: &str) -> Ordering {
    CollationKey::new(a).cmp(&CollationKey::new(b))
}

/// Order items by name.
pub fn sort_by_name(items: &mut [ItemRecord], ascending: bool) {
    if ascending {
        items.sort_by_cached_key(|item| CollationKey::new(&item.name));
    } else {
        items.sort_by_cached_key(|item| Reverse(CollationKey::new(&item.name)));
    }
}

/// Numeric key used when ordering by a rate; unset rates sort last when
/// ascending.
#[must_use]
pub fn rate_sort_key(item: &ItemRecord, kind: EventKind) -> u64 {
    match item.denom(kind) {
        0 => UNSET_RATE_SENTINEL,
        denom => u64::from(denom),
    }
}

/// Order items by the denominator of `kind`.
pub fn sort_by_rate(items: &mut [ItemRecord], kind: EventKind, ascending: bool) {
    if ascending {
        items.sort_by_key(|item| rate_sort_key(item, kind));
    } else {
        items.sort_by_key(|item| Reverse(rate_sort_key(item, kind)));
    }
}

const fn is_katakana(c: char) -> bool {
    matches!(c, '\u{30A1}'..='\u{30F6}')
}

fn fold_kana(c: char) -> char {
    if is_katakana(c) {
        char::from_u32(u32::from(c) - 0x60).unwrap_or(c)
    } else {
        c
    }
}
