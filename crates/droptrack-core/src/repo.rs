//! The item repository: sole owner of the ordered collection.
//!
//! Every mutation is applied in memory first and then written out as a
//! whole under [`CURRENT_KEY`]. A failed write is reported to the caller but
//! does not roll back the in-memory change; there is exactly one write
//! attempt per mutation.
//!
//! Callers borrow the collection through [`Repository::items`] and must
//! re-read it after any mutation: import and migration replace it wholesale.

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::envelope;
use crate::error::{DropError, ValidationError};
use crate::migrate::normalize_batch;
use crate::model::item::{EventKind, ItemRecord};
use crate::model::item_id::{ITEM_ID_PREFIX, generate_item_id};
use crate::model::rate::is_allowed_denominator;
use crate::sort;
use crate::store::KeyValueStore;

/// Key of the current-generation collection blob.
pub const CURRENT_KEY: &str = "dropToolItems_v3";

/// Key of the legacy single-rate collection blob.
pub const LEGACY_KEY: &str = "dropToolItems_v2";

/// Result of [`Repository::mark_event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkOutcome {
    Marked(ItemRecord),
    AlreadyDone(ItemRecord),
    NotFound,
}

/// Where the collection returned by [`Repository::load`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Current,
    MigratedLegacy,
    Empty,
}

#[derive(Debug)]
pub struct Repository<S> {
    store: S,
    items: Vec<ItemRecord>,
    source: LoadSource,
}

impl<S: KeyValueStore> Repository<S> {
    /// A repository over `store` with an empty collection; call
    /// [`load`](Self::load) to read persisted items.
    pub const fn new(store: S) -> Self {
        Self {
            store,
            items: Vec::new(),
            source: LoadSource::Empty,
        }
    }

    /// Read the persisted collection, migrating the legacy blob if needed.
    ///
    /// Never fails: unreadable or corrupt data yields an empty collection.
    /// A legacy collection is written back under [`CURRENT_KEY`] before it
    /// is returned, so the migration happens once. A current blob is written
    /// back when normalization had to repair or drop records, so generated
    /// ids and creation times stay stable across loads.
    pub fn load(&mut self) -> &[ItemRecord] {
        if let Some(current) = self.read_blob(CURRENT_KEY) {
            self.source = LoadSource::Current;
            let Some(values) = current else {
                self.items.clear();
                return &self.items;
            };
            self.items = normalize_batch(&values);
            debug!(items = self.items.len(), "loaded items");
            if !is_canonical(&values, &self.items) {
                info!(
                    stored = values.len(),
                    kept = self.items.len(),
                    "repaired stored items"
                );
                if let Err(err) = self.save() {
                    error!(error = %err, "failed to persist repaired items");
                }
            }
            return &self.items;
        }

        match self.read_blob(LEGACY_KEY) {
            Some(Some(values)) => {
                self.items = normalize_batch(&values);
                self.source = LoadSource::MigratedLegacy;
                info!(
                    legacy = values.len(),
                    migrated = self.items.len(),
                    "migrated legacy items"
                );
                if let Err(err) = self.save() {
                    error!(error = %err, "failed to persist migrated items");
                }
            }
            Some(None) | None => {
                self.items.clear();
                self.source = LoadSource::Empty;
            }
        }
        &self.items
    }

    /// `None` when the key is absent; `Some(None)` when present but
    /// unreadable or not a JSON array.
    fn read_blob(&self, key: &str) -> Option<Option<Vec<Value>>> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(key, error = %err, "unreadable item blob, treating as empty");
                return Some(None);
            }
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(values)) => Some(Some(values)),
            Ok(_) => {
                warn!(key, "item blob is not an array, treating as empty");
                Some(None)
            }
            Err(err) => {
                warn!(key, error = %err, "corrupt item blob, treating as empty");
                Some(None)
            }
        }
    }

    /// Overwrite the current-generation blob with the whole collection.
    ///
    /// # Errors
    ///
    /// [`DropError::Store`] when the write fails.
    pub fn save(&mut self) -> Result<(), DropError> {
        let blob = serde_json::to_string(&self.items)?;
        self.store.set(CURRENT_KEY, &blob)?;
        Ok(())
    }

    fn persist(&mut self) -> Result<(), DropError> {
        self.save().inspect_err(|err| {
            error!(error = %err, "failed to persist items; in-memory change kept");
        })
    }

    #[must_use]
    pub fn items(&self) -> &[ItemRecord] {
        &self.items
    }

    #[must_use]
    pub const fn load_source(&self) -> LoadSource {
        self.source
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ItemRecord> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Resolve a user-typed id: exact match first, then a unique prefix
    /// (with or without the `id_` prefix).
    #[must_use]
    pub fn resolve_id(&self, input: &str) -> Option<&str> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        if let Some(item) = self.get(input) {
            return Some(&item.id);
        }

        let prefixed = if input.starts_with(ITEM_ID_PREFIX) {
            input.to_string()
        } else {
            format!("{ITEM_ID_PREFIX}{input}")
        };
        let mut matches = self
            .items
            .iter()
            .filter(|item| item.id.starts_with(input) || item.id.starts_with(&prefixed));
        match (matches.next(), matches.next()) {
            (Some(item), None) => Some(&item.id),
            _ => None,
        }
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// Append a new item with both tracks open.
    ///
    /// # Errors
    ///
    /// - [`ValidationError`] for the first of: blank name, missing drop rate,
    ///   missing rare rate
    /// - [`DropError::Store`] when persisting fails (the item is still added)
    pub fn add(
        &mut self,
        name: &str,
        drop_denom: u32,
        rare_denom: u32,
    ) -> Result<ItemRecord, DropError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if drop_denom == 0 {
            return Err(ValidationError::MissingDropRate.into());
        }
        if rare_denom == 0 {
            return Err(ValidationError::MissingRareRate.into());
        }

        let now = now_millis();
        let item = ItemRecord::new(generate_item_id(now), name, drop_denom, rare_denom, now);
        self.items.push(item.clone());
        info!(id = %item.id, name = %item.name, drop_denom, rare_denom, "added item");
        self.persist()?;
        Ok(item)
    }

    /// Record one more attempt. `Ok(None)` when `id` is unknown.
    ///
    /// # Errors
    ///
    /// [`DropError::Store`] when persisting fails.
    pub fn increment_count(&mut self, id: &str) -> Result<Option<ItemRecord>, DropError> {
        let Some(index) = self.position(id) else {
            debug!(id, "increment on unknown item ignored");
            return Ok(None);
        };
        let item = &mut self.items[index];
        item.count = item.count.saturating_add(1);
        let snapshot = item.clone();
        self.persist()?;
        Ok(Some(snapshot))
    }

    /// Mark the `kind` event as seen at the current count.
    ///
    /// # Errors
    ///
    /// [`DropError::Store`] when persisting fails.
    pub fn mark_event(&mut self, id: &str, kind: EventKind) -> Result<MarkOutcome, DropError> {
        let Some(index) = self.position(id) else {
            debug!(id, %kind, "mark on unknown item ignored");
            return Ok(MarkOutcome::NotFound);
        };
        let item = &mut self.items[index];
        if !item.mark(kind) {
            return Ok(MarkOutcome::AlreadyDone(item.clone()));
        }
        let snapshot = item.clone();
        info!(id, %kind, at = snapshot.count, "marked event");
        self.persist()?;
        Ok(MarkOutcome::Marked(snapshot))
    }

    /// Change one track's denominator, keeping count and completion state.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::InvalidRate`] when `denom` is not an allowed
    ///   denominator; the item is left unchanged
    /// - [`DropError::Store`] when persisting fails
    pub fn change_rate(
        &mut self,
        id: &str,
        kind: EventKind,
        denom: u32,
    ) -> Result<Option<ItemRecord>, DropError> {
        if !is_allowed_denominator(denom) {
            return Err(ValidationError::InvalidRate { kind, denom }.into());
        }
        let Some(index) = self.position(id) else {
            debug!(id, %kind, "rate change on unknown item ignored");
            return Ok(None);
        };
        let item = &mut self.items[index];
        item.set_denom(kind, denom);
        let snapshot = item.clone();
        info!(id, %kind, denom, "changed rate");
        self.persist()?;
        Ok(Some(snapshot))
    }

    /// Delete an item. `Ok(None)` when `id` is unknown.
    ///
    /// # Errors
    ///
    /// [`DropError::Store`] when persisting fails.
    pub fn remove(&mut self, id: &str) -> Result<Option<ItemRecord>, DropError> {
        let Some(index) = self.position(id) else {
            debug!(id, "remove on unknown item ignored");
            return Ok(None);
        };
        let removed = self.items.remove(index);
        info!(id, name = %removed.name, "removed item");
        self.persist()?;
        Ok(Some(removed))
    }

    /// Reorder by name and persist the new order.
    ///
    /// # Errors
    ///
    /// [`DropError::Store`] when persisting fails.
    pub fn sort_by_name(&mut self, ascending: bool) -> Result<(), DropError> {
        sort::sort_by_name(&mut self.items, ascending);
        self.persist()
    }

    /// Reorder by a track's denominator and persist the new order.
    ///
    /// # Errors
    ///
    /// [`DropError::Store`] when persisting fails.
    pub fn sort_by_rate(&mut self, kind: EventKind, ascending: bool) -> Result<(), DropError> {
        sort::sort_by_rate(&mut self.items, kind, ascending);
        self.persist()
    }

    /// Backup text for the whole collection.
    ///
    /// # Errors
    ///
    /// [`DropError::Encode`] if serialization fails.
    pub fn export_envelope(&self) -> Result<String, DropError> {
        envelope::export_envelope(&self.items, now_millis())
    }

    /// Replace the whole collection from backup text; returns the number of
    /// items restored. On any error the collection is left untouched.
    ///
    /// # Errors
    ///
    /// - [`DropError::MalformedInput`] / [`DropError::EmptyResult`] from
    ///   parsing
    /// - [`DropError::Store`] when persisting fails (the import still
    ///   replaces the in-memory collection)
    pub fn import_envelope(&mut self, text: &str) -> Result<usize, DropError> {
        let items = envelope::import_envelope(text)?;
        let count = items.len();
        self.items = items;
        info!(items = count, "restored items from backup");
        self.persist()?;
        Ok(count)
    }
}

/// True when `items` serialize back to exactly the stored `values`.
fn is_canonical(values: &[Value], items: &[ItemRecord]) -> bool {
    values.len() == items.len()
        && values
            .iter()
            .zip(items)
            .all(|(raw, item)| serde_json::to_value(item).is_ok_and(|value| &value == raw))
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
