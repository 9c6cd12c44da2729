//! KeyValueStore trait - the core abstraction for all storage backends.
//!
//! A store maps a well-known string key to a set of strings. Record types
//! never reach this layer; the managers in [`crate::kitchen`] and
//! [`crate::history`] encode records to flat strings before handing them
//! down, so a backend only ever moves opaque set members around.
//!
//! Operations:
//! - `read`: current set value (never-written keys read as empty)
//! - `edit`: atomic read-modify-write under backend-guaranteed isolation
//! - `watch`: change notifications carrying the full committed set

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::error::{Result, StoreError};
use crate::watch::WatchStream;

/// Maximum store key length in bytes.
pub const MAX_KEY_LENGTH: usize = 255;

/// Mutation applied to a key's set inside an atomic edit.
pub type EditFn = Box<dyn FnOnce(&mut BTreeSet<String>) + Send>;

/// Validate that a store key is well-formed.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey("key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(StoreError::InvalidKey(format!(
            "key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    if key.chars().any(|c| c.is_whitespace() || c == '/') {
        return Err(StoreError::InvalidKey(
            "key cannot contain whitespace or '/'".to_string(),
        ));
    }
    Ok(())
}

/// The core preference storage trait.
///
/// All storage backends (SQLite, memory) implement this trait. Managers
/// depend on this trait, not specific implementations, so tests can
/// substitute an in-memory fake for the durable store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the current set stored under `key`.
    ///
    /// A key that has never been written reads as the empty set.
    async fn read(&self, key: &str) -> Result<BTreeSet<String>>;

    /// Atomically transform the set stored under `key`.
    ///
    /// The transform observes a consistent snapshot and its result is
    /// committed atomically relative to concurrent edits of the same key.
    /// Returns the key's new monotonic version.
    async fn edit(&self, key: &str, transform: EditFn) -> Result<u64>;

    /// Subscribe to committed changes of `key`.
    ///
    /// Subscribers always eventually observe the latest committed state;
    /// intermediate states may be skipped under load.
    fn watch(&self, key: &str) -> Result<WatchStream>;

    /// Check if the set under `key` contains a member.
    async fn contains(&self, key: &str, member: &str) -> Result<bool> {
        Ok(self.read(key).await?.contains(member))
    }

    /// Get the number of members stored under `key`.
    async fn len(&self, key: &str) -> Result<usize> {
        Ok(self.read(key).await?.len())
    }
}
