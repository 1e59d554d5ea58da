//! Record log and indices.
//!
//! Records are kept in an in-memory log with tombstones. A primary index
//! maps identifiers to log positions for O(1) access, and named secondary
//! indexes map attribute values to identifiers.

mod index;
mod log;

pub use index::{IndexTable, PrimaryIndex, SecondaryIndex};
pub use log::RecordLog;
