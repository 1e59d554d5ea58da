//! # memdb
//!
//! An embeddable, in-process record store. Callers insert, update, delete
//! and query their own record type by a generated identifier or through
//! named secondary indexes, and can persist the whole store to a snapshot
//! file.
//!
//! ## Core Concepts
//!
//! - **Records**: Payloads tagged with an identifier and a tombstone flag
//! - **Primary index**: Identifier to log position, O(1) lookup
//! - **Secondary indexes**: Attribute value to identifiers, exact match
//! - **Compaction**: Drops deleted records and rebuilds every index
//! - **Snapshots**: One checksummed MessagePack file per store
//!
//! ## Example
//!
//! ```ignore
//! use memdb::{AttributeLookup, IndexValue, Store};
//!
//! #[derive(Clone, serde::Serialize, serde::Deserialize)]
//! struct User { name: String }
//!
//! impl AttributeLookup for User {
//!     fn attribute(&self, name: &str) -> Option<IndexValue> {
//!         (name == "name").then(|| self.name.as_str().into())
//!     }
//! }
//!
//! let store = Store::with_path("./users.db");
//! store.add_index("name")?;
//! let id = store.create(User { name: "John".into() })?;
//! let johns = store.get_by_index("name", "John")?;
//! store.save()?;
//! ```

pub mod error;
pub mod records;
pub mod snapshot;
pub mod store;
pub mod types;

// Re-exports
pub use error::{Result, StoreError};
pub use records::{IndexTable, PrimaryIndex, RecordLog, SecondaryIndex};
pub use store::{Store, StoreConfig};
pub use types::*;
