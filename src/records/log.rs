//! Append-only record log with tombstones.

use crate::types::{Position, Record, RecordId};

/// Ordered sequence of records; the single source of truth for the store.
///
/// Records are only appended in steady state. Deletion sets the tombstone
/// flag in place; [`RecordLog::compact`] is the only operation that removes
/// records and renumbers positions.
#[derive(Clone, Debug)]
pub struct RecordLog<T> {
    records: Vec<Record<T>>,
}

impl<T> Default for RecordLog<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RecordLog<T> {
    /// Create an empty log.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Build a log from decoded records, keeping their order.
    pub fn from_records(records: Vec<Record<T>>) -> Self {
        Self { records }
    }

    /// Append a live record, returning its position.
    pub fn append(&mut self, id: RecordId, payload: T) -> Position {
        self.records.push(Record::new(id, payload));
        self.records.len() - 1
    }

    /// Record at a position, tombstoned or not.
    pub fn get(&self, position: Position) -> Option<&Record<T>> {
        self.records.get(position)
    }

    pub fn get_mut(&mut self, position: Position) -> Option<&mut Record<T>> {
        self.records.get_mut(position)
    }

    /// Physical length, tombstones included.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records that are not tombstoned.
    pub fn live_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_live()).count()
    }

    /// All records with their positions, tombstones included.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Record<T>)> {
        self.records.iter().enumerate()
    }

    /// Live records in log order.
    pub fn live(&self) -> impl Iterator<Item = &Record<T>> {
        self.records.iter().filter(|r| r.is_live())
    }

    pub fn as_slice(&self) -> &[Record<T>] {
        &self.records
    }

    /// Drop every tombstoned record, preserving the relative order of the
    /// survivors. Returns the number of records removed.
    ///
    /// All previously handed-out positions are invalid afterwards.
    pub fn compact(&mut self) -> usize {
        let before = self.records.len();
        self.records.retain(|r| r.is_live());
        before - self.records.len()
    }
}
