use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The two independent probability tracks of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Drop,
    Rare,
}

impl EventKind {
    pub const ALL: [Self; 2] = [Self::Drop, Self::Rare];

    const fn as_str(self) -> &'static str {
        match self {
            Self::Drop => "drop",
            Self::Rare => "rare",
        }
    }

    /// Persisted field name of this track's denominator.
    #[must_use]
    pub const fn denom_field(self) -> &'static str {
        match self {
            Self::Drop => "dropDenom",
            Self::Rare => "rareDenom",
        }
    }
}

/// One tracked item (current persisted generation).
///
/// `rare_denom == 0` means the rare track is unset. `drop_at`/`rare_at`
/// record the attempt count at which the matching event was marked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub id: String,
    pub name: String,
    pub drop_denom: u32,
    pub rare_denom: u32,
    pub count: u64,
    pub drop_done: bool,
    pub rare_done: bool,
    pub drop_at: Option<u64>,
    pub rare_at: Option<u64>,
    pub created_at: i64,
}

impl ItemRecord {
    /// A fresh record with zeroed counters and both tracks open.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        drop_denom: u32,
        rare_denom: u32,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            drop_denom,
            rare_denom,
            count: 0,
            drop_done: false,
            rare_done: false,
            drop_at: None,
            rare_at: None,
            created_at,
        }
    }

    #[must_use]
    pub const fn denom(&self, kind: EventKind) -> u32 {
        match kind {
            EventKind::Drop => self.drop_denom,
            EventKind::Rare => self.rare_denom,
        }
    }

    pub const fn set_denom(&mut self, kind: EventKind, denom: u32) {
        match kind {
            EventKind::Drop => self.drop_denom = denom,
            EventKind::Rare => self.rare_denom = denom,
        }
    }

    #[must_use]
    pub const fn is_done(&self, kind: EventKind) -> bool {
        match kind {
            EventKind::Drop => self.drop_done,
            EventKind::Rare => self.rare_done,
        }
    }

    #[must_use]
    pub const fn done_at(&self, kind: EventKind) -> Option<u64> {
        match kind {
            EventKind::Drop => self.drop_at,
            EventKind::Rare => self.rare_at,
        }
    }

    /// Mark `kind` done at the current count.
    ///
    /// Returns `false` (and changes nothing) when the track was already done.
    pub const fn mark(&mut self, kind: EventKind) -> bool {
        if self.is_done(kind) {
            return false;
        }
        let at = Some(self.count);
        match kind {
            EventKind::Drop => {
                self.drop_done = true;
                self.drop_at = at;
            }
            EventKind::Rare => {
                self.rare_done = true;
                self.rare_at = at;
            }
        }
        true
    }

    /// Both tracks have been marked.
    #[must_use]
    pub const fn is_fully_resolved(&self) -> bool {
        self.drop_done && self.rare_done
    }
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drop" => Ok(Self::Drop),
            "rare" => Ok(Self::Rare),
            _ => Err(ParseEnumError {
                expected: "event kind",
                got: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EventKind, ItemRecord};
    use std::str::FromStr;

    fn sample() -> ItemRecord {
        ItemRecord::new("id_1", "Boss Key", 64, 256, 1_700_000_000_000)
    }

    #[test]
    fn serializes_with_camel_case_and_null_at_counts() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["dropDenom"], 64);
        assert_eq!(json["rareDenom"], 256);
        assert_eq!(json["dropDone"], false);
        assert!(json["dropAt"].is_null());
        assert!(json["rareAt"].is_null());
        assert_eq!(json["createdAt"], 1_700_000_000_000_i64);
    }

    #[test]
    fn event_kind_parse_and_display() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_str(&kind.to_string()).unwrap(), kind);
        }
        assert_eq!(EventKind::from_str(" RARE ").unwrap(), EventKind::Rare);
        assert!(EventKind::from_str("legendary").is_err());
    }

    #[test]
    fn mark_records_count_once() {
        let mut item = sample();
        item.count = 10;
        assert!(item.mark(EventKind::Drop));
        assert_eq!(item.drop_at, Some(10));

        item.count = 12;
        assert!(!item.mark(EventKind::Drop));
        assert_eq!(item.drop_at, Some(10));
        assert!(!item.is_fully_resolved());

        assert!(item.mark(EventKind::Rare));
        assert_eq!(item.done_at(EventKind::Rare), Some(12));
        assert!(item.is_fully_resolved());
    }

    #[test]
    fn set_denom_targets_one_track() {
        let mut item = sample();
        item.set_denom(EventKind::Rare, 4096);
        assert_eq!(item.denom(EventKind::Rare), 4096);
        assert_eq!(item.denom(EventKind::Drop), 64);
    }
}
