//! In-memory store implementation.
//!
//! This implementation is NOT durable - data is lost on process exit.
//! It is the substitutable fake for tests, and useful for development.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::error::Result;
use crate::store::{validate_key, EditFn, KeyValueStore};
use crate::watch::{WatchEvent, WatchSender, WatchStream};

#[derive(Default)]
struct Slot {
    members: BTreeSet<String>,
    version: u64,
}

/// In-memory implementation of KeyValueStore.
///
/// Uses a HashMap of string sets behind an RwLock; the write-lock scope is
/// what makes `edit` atomic. Suitable for testing and development only.
pub struct MemoryStore {
    data: Arc<RwLock<HashMap<String, Slot>>>,
    watcher: WatchSender,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
            watcher: WatchSender::new(64),
        }
    }

    /// Get the current version of a key (0 if never written).
    pub fn version(&self, key: &str) -> u64 {
        self.data.read().get(key).map(|s| s.version).unwrap_or(0)
    }

    /// Get the number of keys that have been written.
    pub fn key_count(&self) -> usize {
        self.data.read().len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn read(&self, key: &str) -> Result<BTreeSet<String>> {
        validate_key(key)?;
        Ok(self
            .data
            .read()
            .get(key)
            .map(|slot| slot.members.clone())
            .unwrap_or_default())
    }

    async fn edit(&self, key: &str, transform: EditFn) -> Result<u64> {
        validate_key(key)?;

        let mut data = self.data.write();
        let slot = data.entry(key.to_string()).or_default();

        transform(&mut slot.members);
        slot.version += 1;

        let version = slot.version;
        let event = WatchEvent::new(key, slot.members.clone(), version);
        drop(data);

        self.watcher.send(event);
        Ok(version)
    }

    fn watch(&self, key: &str) -> Result<WatchStream> {
        validate_key(key)?;
        Ok(self.watcher.subscribe(key))
    }
}
