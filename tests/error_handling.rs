//! Error handling and edge case tests.

use memdb::{AttributeLookup, IndexValue, RecordId, Store, StoreConfig, StoreError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tempfile::TempDir;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Entry {
    key: String,
}

impl AttributeLookup for Entry {
    fn attribute(&self, name: &str) -> Option<IndexValue> {
        (name == "key").then(|| self.key.as_str().into())
    }
}

fn entry(key: &str) -> Entry {
    Entry {
        key: key.to_string(),
    }
}

// --- Identifier Errors ---

#[test]
fn test_update_without_identifier() {
    let store = Store::new();
    store.create(entry("a")).unwrap();

    let result = store.update(RecordId::NONE, entry("b"));
    assert!(matches!(result, Err(StoreError::NoIdentifier)));
    assert_eq!(store.get(RecordId(1)).unwrap(), entry("a"));
}

#[test]
fn test_update_unknown_identifier() {
    let store: Store<Entry> = Store::new();
    let result = store.update(RecordId(42), entry("b"));
    assert!(matches!(result, Err(StoreError::NotFound(RecordId(42)))));
}

#[test]
fn test_update_deleted_record() {
    let store = Store::new();
    let id = store.create(entry("a")).unwrap();
    store.delete(id).unwrap();

    let result = store.update(id, entry("b"));
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[test]
fn test_delete_unknown_identifier() {
    let store: Store<Entry> = Store::new();
    assert!(matches!(store.delete(RecordId(1)), Err(StoreError::NotFound(_))));
    assert!(matches!(store.delete(RecordId::NONE), Err(StoreError::NotFound(_))));
}

// --- Index Errors ---

#[test]
fn test_lookup_unregistered_index() {
    let store = Store::new();
    store.create(entry("a")).unwrap();

    let result = store.get_by_index("key", "a");
    assert!(matches!(result, Err(StoreError::IndexNotFound(name)) if name == "key"));
}

#[test]
fn test_lookup_missing_value_is_empty() {
    let store = Store::new();
    store.add_index("key").unwrap();
    store.create(entry("a")).unwrap();

    let result = store.get_by_index("key", "zzz").unwrap();
    assert!(result.is_empty());
}

#[test]
fn test_lookup_with_wrong_value_type() {
    let store = Store::new();
    store.add_index("key").unwrap();
    store.create(entry("1")).unwrap();

    assert!(store.get_by_index("key", 1i64).unwrap().is_empty());
}

#[test]
fn test_add_duplicate_index() {
    let store: Store<Entry> = Store::new();
    store.add_index("key").unwrap();
    assert!(matches!(store.add_index("key"), Err(StoreError::IndexExists(_))));
}

// --- Persistence Errors ---

#[test]
fn test_save_without_filename() {
    let store = Store::new();
    store.create(entry("a")).unwrap();
    store.delete(RecordId(1)).unwrap();

    assert!(matches!(store.save(), Err(StoreError::FilenameNotSet)));
    assert_eq!(store.stats().tombstones, 1);
}

#[test]
fn test_load_without_filename_keeps_state() {
    let store = Store::new();
    store.create(entry("a")).unwrap();
    store.create(entry("b")).unwrap();

    assert!(matches!(store.load(), Err(StoreError::FilenameNotSet)));
    assert_eq!(store.len(), 2);
    assert_eq!(store.get(RecordId(2)).unwrap(), entry("b"));
}

#[test]
fn test_empty_configured_path_is_unset() {
    let store = Store::with_config(StoreConfig {
        path: Some(PathBuf::new()),
        ..Default::default()
    });
    store.create(entry("a")).unwrap();

    assert!(store.path().is_none());
    assert!(matches!(store.save(), Err(StoreError::FilenameNotSet)));
    assert!(matches!(store.load(), Err(StoreError::FilenameNotSet)));
    assert_eq!(store.get(RecordId(1)).unwrap(), entry("a"));
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let store: Store<Entry> = Store::with_path(dir.path().join("missing.db"));
    assert!(matches!(store.load(), Err(StoreError::Io(_))));
}

#[test]
fn test_load_garbage_keeps_state() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("garbage.db");
    std::fs::write(&path, b"definitely not a snapshot").unwrap();

    let store = Store::with_path(&path);
    store.create(entry("a")).unwrap();

    assert!(matches!(store.load(), Err(StoreError::InvalidFormat(_))));
    assert_eq!(store.get(RecordId(1)).unwrap(), entry("a"));
}

#[test]
fn test_load_as_different_type() {
    #[derive(Clone, Debug, Serialize, Deserialize)]
    struct Renamed {
        key: String,
    }

    impl AttributeLookup for Renamed {
        fn attribute(&self, _name: &str) -> Option<IndexValue> {
            None
        }
    }

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("typed.db");

    let store = Store::with_path(&path);
    store.create(entry("a")).unwrap();
    store.save().unwrap();

    let other: Store<Renamed> = Store::with_config(StoreConfig::with_path(&path));
    assert!(matches!(other.load(), Err(StoreError::TypeMismatch { .. })));
}

#[test]
fn test_save_to_unwritable_path() {
    let dir = TempDir::new().unwrap();
    let store = Store::with_path(dir.path().join("no-such-dir").join("db"));
    store.create(entry("a")).unwrap();

    assert!(matches!(store.save(), Err(StoreError::Io(_))));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_error_messages() {
    assert_eq!(StoreError::NoIdentifier.to_string(), "No identifier provided");
    assert_eq!(StoreError::NotFound(RecordId(5)).to_string(), "Record not found: 5");
    assert_eq!(
        StoreError::IndexNotFound("name".into()).to_string(),
        "Secondary index not found: name"
    );
    assert_eq!(StoreError::FilenameNotSet.to_string(), "Snapshot filename was not set");
}
