//! Sort-direction toggles remembered between `dt sort` invocations.
//!
//! Each bare `dt sort name` / `dt sort rate` applies the stored direction and
//! then flips it, so repeated calls alternate ascending and descending.

use droptrack_core::store::KeyValueStore;
use droptrack_core::{DropError, EventKind};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Store key for the toggle state.
pub const UI_KEY: &str = "dropToolUi";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiState {
    pub sort_name_asc: bool,
    pub sort_drop_asc: bool,
    pub sort_rare_asc: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            sort_name_asc: true,
            sort_drop_asc: true,
            sort_rare_asc: true,
        }
    }
}

impl UiState {
    /// Read the stored toggles; missing or unreadable state yields defaults.
    pub fn load(store: &impl KeyValueStore) -> Self {
        match store.get(UI_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(error = %err, "corrupt sort state, using defaults");
                Self::default()
            }),
            Ok(None) => Self::default(),
            Err(err) => {
                warn!(error = %err, "unreadable sort state, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut impl KeyValueStore) -> Result<(), DropError> {
        let blob = serde_json::to_string(self)?;
        store.set(UI_KEY, &blob)?;
        Ok(())
    }

    /// Return the direction to use for a name sort and flip it.
    pub const fn take_name(&mut self) -> bool {
        let ascending = self.sort_name_asc;
        self.sort_name_asc = !ascending;
        ascending
    }

    /// Return the direction to use for a rate sort on `kind` and flip it.
    pub const fn take_rate(&mut self, kind: EventKind) -> bool {
        let slot = match kind {
            EventKind::Drop => &mut self.sort_drop_asc,
            EventKind::Rare => &mut self.sort_rare_asc,
        };
        let ascending = *slot;
        *slot = !ascending;
        ascending
    }

    /// Record an explicit direction so the next toggle goes the other way.
    pub const fn set_name(&mut self, ascending: bool) {
        self.sort_name_asc = !ascending;
    }

    pub const fn set_rate(&mut self, kind: EventKind, ascending: bool) {
        match kind {
            EventKind::Drop => self.sort_drop_asc = !ascending,
            EventKind::Rare => self.sort_rare_asc = !ascending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use droptrack_core::store::MemoryStore;

    #[test]
    fn defaults_to_ascending() {
        let store = MemoryStore::new();
        assert_eq!(UiState::load(&store), UiState::default());
    }

    #[test]
    fn toggles_alternate_and_persist() {
        let mut store = MemoryStore::new();
        let mut state = UiState::load(&store);
        assert!(state.take_name());
        state.save(&mut store).unwrap();

        let mut state = UiState::load(&store);
        assert!(!state.take_name());
        assert!(state.take_rate(EventKind::Rare));
        assert!(state.take_rate(EventKind::Drop));
        assert!(!state.take_rate(EventKind::Rare));
    }

    #[test]
    fn explicit_direction_sets_next_toggle() {
        let mut state = UiState::default();
        state.set_rate(EventKind::Drop, true);
        assert!(!state.take_rate(EventKind::Drop));
        state.set_name(false);
        assert!(state.take_name());
    }

    #[test]
    fn corrupt_state_falls_back() {
        let store = MemoryStore::new().with_entry(UI_KEY, "[1,2");
        assert_eq!(UiState::load(&store), UiState::default());
        let partial = MemoryStore::new().with_entry(UI_KEY, r#"{"sortNameAsc":false}"#);
        let state = UiState::load(&partial);
        assert!(!state.sort_name_asc);
        assert!(state.sort_rare_asc);
    }
}
