//! Core types for the record store.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a record.
///
/// Identifiers start at 1 and are never reused; `RecordId(0)` never names a
/// record.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct RecordId(pub u64);

impl RecordId {
    /// The zero identifier, used by callers to mean "no identifier".
    pub const NONE: RecordId = RecordId(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    pub fn next(self) -> Self {
        RecordId(self.0 + 1)
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        RecordId(id)
    }
}

/// Position of a record in the log. Invalidated by compaction.
pub type Position = usize;

/// A single record in the log: one payload tagged with its identifier and
/// a tombstone flag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record<T> {
    /// Identifier (assigned by store).
    pub id: RecordId,

    /// Tombstone flag. Deleted records stay in the log until compaction.
    pub deleted: bool,

    /// Application-defined payload.
    pub payload: T,
}

impl<T> Record<T> {
    pub fn new(id: RecordId, payload: T) -> Self {
        Self {
            id,
            deleted: false,
            payload,
        }
    }

    pub fn is_live(&self) -> bool {
        !self.deleted
    }

    /// Payload of a live record, `None` once tombstoned.
    pub fn live_payload(&self) -> Option<&T> {
        if self.deleted {
            None
        } else {
            Some(&self.payload)
        }
    }
}

/// Value of a named payload attribute, used as a secondary index key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IndexValue {
    Str(String),
    Int(i64),
    UInt(u64),
    Bool(bool),
    Bytes(Vec<u8>),
}

impl From<&str> for IndexValue {
    fn from(v: &str) -> Self {
        IndexValue::Str(v.to_string())
    }
}

impl From<String> for IndexValue {
    fn from(v: String) -> Self {
        IndexValue::Str(v)
    }
}

impl From<&String> for IndexValue {
    fn from(v: &String) -> Self {
        IndexValue::Str(v.clone())
    }
}

impl From<i32> for IndexValue {
    fn from(v: i32) -> Self {
        IndexValue::Int(v as i64)
    }
}

impl From<i64> for IndexValue {
    fn from(v: i64) -> Self {
        IndexValue::Int(v)
    }
}

impl From<u32> for IndexValue {
    fn from(v: u32) -> Self {
        IndexValue::UInt(v as u64)
    }
}

impl From<u64> for IndexValue {
    fn from(v: u64) -> Self {
        IndexValue::UInt(v)
    }
}

impl From<usize> for IndexValue {
    fn from(v: usize) -> Self {
        IndexValue::UInt(v as u64)
    }
}

impl From<bool> for IndexValue {
    fn from(v: bool) -> Self {
        IndexValue::Bool(v)
    }
}

impl From<Vec<u8>> for IndexValue {
    fn from(v: Vec<u8>) -> Self {
        IndexValue::Bytes(v)
    }
}

/// Named attribute lookup, the only capability the store needs from a
/// payload type.
///
/// Return `None` for names the payload has no value for; such records are
/// left out of that secondary index.
pub trait AttributeLookup {
    fn attribute(&self, name: &str) -> Option<IndexValue>;
}

/// Store statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Records visible to queries.
    pub live_records: u64,
    /// Deleted records still held in the log.
    pub tombstones: u64,
    /// Physical log length (live + tombstones).
    pub log_len: u64,
    /// Identifier the next `create` will assign.
    pub next_id: RecordId,
    /// Registered secondary indexes.
    pub index_count: u64,
}
