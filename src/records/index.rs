//! Record indices for efficient lookups.

use super::log::RecordLog;
use crate::error::{Result, StoreError};
use crate::types::{AttributeLookup, IndexValue, Position, RecordId};
use std::collections::HashMap;

/// Index mapping record IDs to log positions.
///
/// Deleted identifiers stay resolvable until the next rebuild; callers must
/// check the tombstone on the record they land on.
#[derive(Clone, Debug, Default)]
pub struct PrimaryIndex {
    positions: HashMap<RecordId, Position>,
}

impl PrimaryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: RecordId, position: Position) {
        self.positions.insert(id, position);
    }

    /// Get position for a record ID.
    pub fn get(&self, id: RecordId) -> Option<Position> {
        self.positions.get(&id).copied()
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Get count of indexed identifiers.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Rebuild from the log, indexing live records only.
    ///
    /// Returns the highest live identifier seen, or `RecordId(0)` for a log
    /// with no live records.
    pub fn rebuild<T>(&mut self, log: &RecordLog<T>) -> RecordId {
        let mut positions = HashMap::with_capacity(log.len());
        let mut max_id = RecordId::NONE;

        for (position, record) in log.iter() {
            if record.is_live() {
                positions.insert(record.id, position);
                max_id = max_id.max(record.id);
            }
        }

        self.positions = positions;
        max_id
    }
}

/// Attribute value to record IDs, in insertion order.
#[derive(Clone, Debug, Default)]
pub struct SecondaryIndex {
    entries: HashMap<IndexValue, Vec<RecordId>>,
}

impl SecondaryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: IndexValue, id: RecordId) {
        self.entries.entry(value).or_default().push(id);
    }

    /// Identifiers indexed under `value`; empty when nothing matches.
    pub fn get(&self, value: &IndexValue) -> &[RecordId] {
        self.entries.get(value).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of distinct values.
    pub fn value_count(&self) -> usize {
        self.entries.len()
    }

    /// Discard the contents and re-insert every live record that has a
    /// value for `name`.
    pub fn rebuild<T: AttributeLookup>(&mut self, name: &str, log: &RecordLog<T>) {
        self.entries.clear();
        for record in log.live() {
            if let Some(value) = record.payload.attribute(name) {
                self.insert(value, record.id);
            }
        }
    }
}

/// Secondary indexes by name.
#[derive(Clone, Debug, Default)]
pub struct IndexTable {
    indexes: HashMap<String, SecondaryIndex>,
}

impl IndexTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty index. Fails if the name is taken.
    pub fn register(&mut self, name: &str) -> Result<()> {
        if self.indexes.contains_key(name) {
            return Err(StoreError::IndexExists(name.to_string()));
        }
        self.indexes.insert(name.to_string(), SecondaryIndex::new());
        Ok(())
    }

    pub fn unregister(&mut self, name: &str) -> Result<()> {
        self.indexes
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::IndexNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.indexes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    /// Registered index names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.indexes.keys().cloned().collect();
        names.sort();
        names
    }

    /// Identifiers stored under `value` in the named index.
    pub fn lookup(&self, name: &str, value: &IndexValue) -> Result<&[RecordId]> {
        self.indexes
            .get(name)
            .map(|index| index.get(value))
            .ok_or_else(|| StoreError::IndexNotFound(name.to_string()))
    }

    /// Add a freshly created record to every registered index.
    pub fn insert_record<T: AttributeLookup>(&mut self, id: RecordId, payload: &T) {
        for (name, index) in self.indexes.iter_mut() {
            if let Some(value) = payload.attribute(name) {
                index.insert(value, id);
            }
        }
    }

    /// Rebuild a single index from the log.
    pub fn rebuild_one<T: AttributeLookup>(&mut self, name: &str, log: &RecordLog<T>) -> Result<()> {
        let index = self
            .indexes
            .get_mut(name)
            .ok_or_else(|| StoreError::IndexNotFound(name.to_string()))?;
        index.rebuild(name, log);
        Ok(())
    }

    /// Rebuild every registered index, one pass over the log per index.
    pub fn rebuild_all<T: AttributeLookup>(&mut self, log: &RecordLog<T>) {
        for (name, index) in self.indexes.iter_mut() {
            index.rebuild(name, log);
        }
    }
}
