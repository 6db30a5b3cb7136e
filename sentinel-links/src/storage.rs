//! Persistence for the viewer state
//!
//! State is stored as json under a single key ([`STORAGE_KEY`]) in a
//! [`KeyValueStore`]. [`LinkStore::load`] never fails: a missing or unreadable
//! value falls back to the sample links, and the problem is only logged.

use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use parking_lot::Mutex;
use snafu::prelude::*;
use tracing::{debug, warn};

use crate::{
    Result, STORAGE_KEY,
    error::{DeserializationSnafu, SerializationSnafu, StorageSnafu},
    state::SyncState,
};

/// String values stored by key.
pub trait KeyValueStore {
    /// Value for `key`, or `None` if nothing is stored.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go to a temporary file that is renamed over the old one, so a
/// failed write leaves the previous value in place.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding `key`.
    pub fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path(key);
        match fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(source).context(StorageSnafu { path }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).context(StorageSnafu { path: &self.dir })?;
        let path = self.path(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&tmp, value).context(StorageSnafu { path: &tmp })?;
        fs::rename(&tmp, &path).context(StorageSnafu { path: &path })?;
        debug!(path = %path.display(), bytes = value.len(), "stored");
        Ok(())
    }
}

/// In-memory store, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Loads and saves [`SyncState`] in a key/value store.
#[derive(Debug)]
pub struct LinkStore<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> LinkStore<S> {
    /// Uses the default storage key.
    pub fn new(store: S) -> Self {
        Self::with_key(store, STORAGE_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Stored state, or `None` if nothing is stored.
    /// Returns an error if the stored value cannot be read or parsed.
    pub fn load_stored(&self) -> Result<Option<SyncState>> {
        let Some(data) = self.store.get(&self.key)? else {
            return Ok(None);
        };
        let state = serde_json::from_str(&data).context(DeserializationSnafu)?;
        Ok(Some(state))
    }

    /// Stored state, or the sample links if nothing usable is stored.
    pub fn load(&self) -> SyncState {
        match self.load_stored() {
            Ok(Some(state)) => state,
            Ok(None) => {
                debug!(key = %self.key, "no stored links, using sample data");
                SyncState::sample()
            }
            Err(e) => {
                warn!(key = %self.key, "stored links unreadable, using sample data: {e}");
                SyncState::sample()
            }
        }
    }

    /// Writes `state` to the store.
    pub fn save(&self, state: &SyncState) -> Result<()> {
        let data = serde_json::to_string(state).context(SerializationSnafu)?;
        self.store.set(&self.key, &data)
    }
}
