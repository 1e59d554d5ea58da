//! Main Store struct tying all components together.

use crate::error::{Result, StoreError};
use crate::records::{IndexTable, PrimaryIndex, RecordLog};
use crate::snapshot;
use crate::types::{AttributeLookup, IndexValue, Position, RecordId, StoreStats};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Store configuration.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Snapshot file. `None` means persistence is not configured.
    pub path: Option<PathBuf>,

    /// Whether `save` fsyncs the snapshot file before returning.
    pub sync_on_save: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            sync_on_save: true,
        }
    }
}

impl StoreConfig {
    /// Configuration persisting to `path`. An empty path leaves persistence
    /// unconfigured.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            path: if path.as_os_str().is_empty() {
                None
            } else {
                Some(path)
            },
            ..Default::default()
        }
    }
}

/// Everything guarded by the store lock.
struct StoreState<T> {
    log: RecordLog<T>,
    primary: PrimaryIndex,
    secondary: IndexTable,
    /// Last identifier handed out. Never decreases within a session.
    last_id: RecordId,
}

impl<T: AttributeLookup> StoreState<T> {
    fn new() -> Self {
        Self {
            log: RecordLog::new(),
            primary: PrimaryIndex::new(),
            secondary: IndexTable::new(),
            last_id: RecordId::NONE,
        }
    }

    fn position(&self, id: RecordId) -> Result<Position> {
        self.primary.get(id).ok_or(StoreError::NotFound(id))
    }

    /// Position of a live record.
    fn live_position(&self, id: RecordId) -> Result<Position> {
        let position = self.position(id)?;
        match self.log.get(position) {
            Some(record) if record.is_live() => Ok(position),
            _ => Err(StoreError::NotFound(id)),
        }
    }

    fn get(&self, id: RecordId) -> Result<&T> {
        let position = self.position(id)?;
        self.log
            .get(position)
            .and_then(|record| record.live_payload())
            .ok_or(StoreError::NotFound(id))
    }

    fn reindex_primary(&mut self) {
        let max_id = self.primary.rebuild(&self.log);
        self.last_id = self.last_id.max(max_id);
    }

    fn reindex_all(&mut self) {
        self.reindex_primary();
        self.secondary.rebuild_all(&self.log);
    }

    /// Drop tombstoned records and reindex. Returns the number removed.
    fn compact(&mut self) -> usize {
        let before = self.log.len();
        let removed = self.log.compact();
        self.reindex_all();
        debug!(before, after = self.log.len(), removed, "Compacted record log");
        removed
    }
}

/// An in-memory record store.
///
/// Provides a unified interface for:
/// - Creating, reading, updating and deleting records by identifier
/// - Exact-match lookups through named secondary indexes
/// - Compacting away deleted records
/// - Saving and loading snapshots
///
/// All state sits behind one reader/writer lock: mutations take it
/// exclusively, reads share it, so readers never see a half-applied write.
/// Reads take the lock recursively, so a read may run inside
/// [`Store::iterate`] even while a writer is queued.
///
/// Secondary indexes are maintained on `create` only. `update` and `delete`
/// leave them stale until [`Store::reindex_all`], [`Store::clean_up`],
/// [`Store::load`] or [`Store::add_index`] rebuilds them.
pub struct Store<T> {
    /// Store configuration.
    config: StoreConfig,

    state: RwLock<StoreState<T>>,
}

impl<T: AttributeLookup> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: AttributeLookup> Store<T> {
    /// Create an empty store with no snapshot target.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create an empty store that snapshots to `path`.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self::with_config(StoreConfig::with_path(path))
    }

    /// Create an empty store. An empty snapshot path counts as no path.
    pub fn with_config(mut config: StoreConfig) -> Self {
        config.path = config.path.filter(|p| !p.as_os_str().is_empty());
        Self {
            config,
            state: RwLock::new(StoreState::new()),
        }
    }

    /// Create a store and hydrate it from its snapshot if the file exists.
    pub fn open(config: StoreConfig) -> Result<Self>
    where
        T: DeserializeOwned,
    {
        let store = Self::with_config(config);
        if store.path().is_some_and(Path::exists) {
            store.load()?;
        }
        Ok(store)
    }

    // --- Record Operations ---

    /// Append a record and return its new identifier.
    pub fn create(&self, payload: T) -> Result<RecordId> {
        let mut state = self.state.write();

        let id = state.last_id.next();
        state.secondary.insert_record(id, &payload);
        let position = state.log.append(id, payload);
        state.primary.insert(id, position);
        state.last_id = id;

        Ok(id)
    }

    /// Get a live record's payload.
    pub fn get(&self, id: RecordId) -> Result<T>
    where
        T: Clone,
    {
        self.state.read_recursive().get(id).cloned()
    }

    /// Whether `id` names a live record.
    pub fn contains(&self, id: RecordId) -> bool {
        self.state.read_recursive().live_position(id).is_ok()
    }

    /// Live payloads in log order, skipping the first `skip` and returning
    /// at most `limit` (`0` for no limit).
    pub fn get_all(&self, limit: usize, skip: usize) -> Result<Vec<T>>
    where
        T: Clone,
    {
        let limit = if limit == 0 { usize::MAX } else { limit };
        let state = self.state.read_recursive();
        Ok(state
            .log
            .live()
            .skip(skip)
            .take(limit)
            .map(|record| record.payload.clone())
            .collect())
    }

    /// Payloads whose attribute `name` equalled `value` at the last
    /// (re)index, in insertion order.
    ///
    /// Fails with `NotFound` if an indexed record has since been deleted.
    pub fn get_by_index(&self, name: &str, value: impl Into<IndexValue>) -> Result<Vec<T>>
    where
        T: Clone,
    {
        let value = value.into();
        let state = self.state.read_recursive();
        state
            .secondary
            .lookup(name, &value)?
            .iter()
            .map(|&id| state.get(id).cloned())
            .collect()
    }

    /// Call `visitor` for each live record in log order.
    ///
    /// The visitor returns `Ok(true)` to stop early; the first error it
    /// returns stops iteration and is handed back. The store's read lock is
    /// held throughout: the visitor may call read methods on this store but
    /// must not call mutating ones.
    pub fn iterate<E, F>(&self, mut visitor: F) -> std::result::Result<(), E>
    where
        F: FnMut(RecordId, &T) -> std::result::Result<bool, E>,
    {
        let state = self.state.read_recursive();
        for record in state.log.live() {
            if visitor(record.id, &record.payload)? {
                break;
            }
        }
        Ok(())
    }

    /// Replace a live record's payload. Secondary indexes are not touched.
    pub fn update(&self, id: RecordId, payload: T) -> Result<()> {
        if id.is_none() {
            return Err(StoreError::NoIdentifier);
        }

        let mut state = self.state.write();
        let position = state.live_position(id)?;
        if let Some(record) = state.log.get_mut(position) {
            record.payload = payload;
        }
        Ok(())
    }

    /// Tombstone a live record.
    ///
    /// The identifier stays in the primary and secondary indexes until the
    /// next reindex, but every read treats it as absent.
    pub fn delete(&self, id: RecordId) -> Result<()> {
        let mut state = self.state.write();
        let position = state.live_position(id)?;
        if let Some(record) = state.log.get_mut(position) {
            record.deleted = true;
        }
        Ok(())
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.state.read_recursive().log.live_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // --- Index Operations ---

    /// Register a secondary index and build it from the current log.
    pub fn add_index(&self, name: &str) -> Result<()> {
        let mut state = self.state.write();
        let state = &mut *state;
        state.secondary.register(name)?;
        state.secondary.rebuild_one(name, &state.log)?;
        debug!(index = name, records = state.log.len(), "Registered secondary index");
        Ok(())
    }

    /// Unregister a secondary index.
    pub fn remove_index(&self, name: &str) -> Result<()> {
        self.state.write().secondary.unregister(name)?;
        debug!(index = name, "Removed secondary index");
        Ok(())
    }

    /// Names of registered secondary indexes, sorted.
    pub fn indexes(&self) -> Vec<String> {
        self.state.read_recursive().secondary.names()
    }

    /// Rebuild the primary index and every secondary index from the log.
    pub fn reindex_all(&self) {
        let mut state = self.state.write();
        state.reindex_all();
        debug!(
            records = state.log.len(),
            indexes = state.secondary.len(),
            "Reindexed store"
        );
    }

    // --- Maintenance ---

    /// Physically remove deleted records, then reindex.
    ///
    /// Returns the number of records removed.
    pub fn clean_up(&self) -> usize {
        self.state.write().compact()
    }

    /// Get store statistics.
    pub fn stats(&self) -> StoreStats {
        let state = self.state.read_recursive();
        let live = state.log.live_count() as u64;
        let log_len = state.log.len() as u64;
        StoreStats {
            live_records: live,
            tombstones: log_len - live,
            log_len,
            next_id: state.last_id.next(),
            index_count: state.secondary.len() as u64,
        }
    }

    /// Get the snapshot path, if one is configured.
    pub fn path(&self) -> Option<&Path> {
        self.config.path.as_deref()
    }

    // --- Snapshots ---

    /// Compact the log and write it to the snapshot file, replacing any
    /// previous contents.
    pub fn save(&self) -> Result<()>
    where
        T: Serialize,
    {
        let path = self.path().ok_or(StoreError::FilenameNotSet)?;
        let file = snapshot::create_target(path)?;

        let (image, records) = {
            let mut state = self.state.write();
            state.compact();
            (snapshot::encode(state.log.as_slice())?, state.log.len())
        };
        snapshot::write_target(&file, &image, self.config.sync_on_save)?;

        info!(path = %path.display(), records, bytes = image.len(), "Saved snapshot");
        Ok(())
    }

    /// Replace the store's contents with the snapshot file and reindex.
    ///
    /// Registered secondary indexes are kept and rebuilt. On failure the
    /// in-memory state is left as it was.
    pub fn load(&self) -> Result<()>
    where
        T: DeserializeOwned,
    {
        let path = self.path().ok_or(StoreError::FilenameNotSet)?;
        let records = snapshot::read_target::<T>(path)?;

        let mut state = self.state.write();
        state.log = RecordLog::from_records(records);
        state.last_id = RecordId::NONE;
        state.reindex_all();

        info!(
            path = %path.display(),
            records = state.log.len(),
            live = state.log.live_count(),
            "Loaded snapshot"
        );
        Ok(())
    }
}
