//! Recipe generation history manager.
//!
//! Append-style log over the `recipes` store key. Entries are identified
//! only by their (name, date) pair; identical pairs collapse under set
//! semantics. Listing sorts descending by the date string, which the fixed
//! minute-resolution format makes chronological.

use chrono::Local;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::warn;

use crate::codec::{decode_entry, decode_members, encode_entry, Decoded, HistoryEntry};
use crate::error::Result;
use crate::store::KeyValueStore;
use crate::watch::ListWatch;

/// Store key holding the encoded history set.
pub const RECIPES_KEY: &str = "recipes";

/// Timestamp format stamped on new entries, minute resolution.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Manager for the recipe history store.
pub struct RecipeHistoryStore {
    store: Arc<dyn KeyValueStore>,
}

impl RecipeHistoryStore {
    /// Create a manager over the given backend.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Record that `name` was generated just now. Returns the stamped entry.
    pub async fn add(&self, name: &str) -> Result<HistoryEntry> {
        let entry = HistoryEntry {
            name: name.to_string(),
            date: Local::now().format(DATE_FORMAT).to_string(),
        };
        self.insert(entry.clone()).await?;
        Ok(entry)
    }

    async fn insert(&self, entry: HistoryEntry) -> Result<()> {
        let encoded = encode_entry(&entry);
        self.store
            .edit(
                RECIPES_KEY,
                Box::new(move |members| {
                    members.insert(encoded);
                }),
            )
            .await?;
        Ok(())
    }

    /// One-shot snapshot of all decodable entries, newest first.
    pub async fn list(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self.list_decoded().await?.records)
    }

    /// One-shot snapshot including the count of members that were dropped
    /// as malformed. Records are sorted newest first.
    pub async fn list_decoded(&self) -> Result<Decoded<HistoryEntry>> {
        let members = self.store.read(RECIPES_KEY).await?;
        Ok(decode_all(&members))
    }

    /// Delete the exact (name, date) pair. Idempotent: deleting an absent
    /// pair succeeds and changes nothing.
    pub async fn delete(&self, name: &str, date: &str) -> Result<()> {
        let encoded = encode_entry(&HistoryEntry {
            name: name.to_string(),
            date: date.to_string(),
        });
        self.store
            .edit(
                RECIPES_KEY,
                Box::new(move |members| {
                    members.remove(&encoded);
                }),
            )
            .await?;
        Ok(())
    }

    /// Remove every entry.
    pub async fn clear(&self) -> Result<()> {
        self.store
            .edit(RECIPES_KEY, Box::new(|members| members.clear()))
            .await?;
        Ok(())
    }

    /// Live decoded view: the current sorted list, then a new complete list
    /// after every committed edit.
    pub async fn watch(&self) -> Result<ListWatch<HistoryEntry>> {
        // Subscribe before the snapshot read so no edit is missed
        let events = self.store.watch(RECIPES_KEY)?;
        let members = self.store.read(RECIPES_KEY).await?;
        Ok(ListWatch::new(decode_list(&members), events, decode_list))
    }
}

fn decode_all(members: &BTreeSet<String>) -> Decoded<HistoryEntry> {
    let mut decoded = decode_members(members, decode_entry);
    if decoded.skipped > 0 {
        warn!(
            skipped = decoded.skipped,
            "dropped undecodable recipe history members"
        );
    }
    decoded.records.sort_by(|a, b| b.date.cmp(&a.date));
    decoded
}

fn decode_list(members: &BTreeSet<String>) -> Vec<HistoryEntry> {
    decode_all(members).records
}
