//! Kitchen inventory manager.
//!
//! CRUD over the `kitchen_items` store key. Every mutation is one atomic
//! edit; `save` replaces any existing record with the same id by filtering
//! it out before inserting the new encoding, which is safe under set
//! semantics but costs a decode pass over every member (O(n) per save).

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::warn;

use crate::codec::{
    decode_item, decode_members, encode_item, member_has_item_id, Decoded, ItemCategory,
    KitchenItem,
};
use crate::error::Result;
use crate::store::KeyValueStore;
use crate::watch::ListWatch;

/// Store key holding the encoded kitchen item set.
pub const KITCHEN_ITEMS_KEY: &str = "kitchen_items";

/// Manager for the kitchen inventory store.
pub struct KitchenStore {
    store: Arc<dyn KeyValueStore>,
}

impl KitchenStore {
    /// Create a manager over the given backend.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Insert or replace a kitchen item, keyed by its id.
    pub async fn save(&self, item: &KitchenItem) -> Result<()> {
        let id = item.id.clone();
        let encoded = encode_item(item);
        self.store
            .edit(
                KITCHEN_ITEMS_KEY,
                Box::new(move |members| {
                    members.retain(|member| !member_has_item_id(member, &id));
                    members.insert(encoded);
                }),
            )
            .await?;
        Ok(())
    }

    /// One-shot snapshot of all decodable items.
    pub async fn list(&self) -> Result<Vec<KitchenItem>> {
        Ok(self.list_decoded().await?.records)
    }

    /// One-shot snapshot including the count of members that were dropped
    /// as malformed.
    pub async fn list_decoded(&self) -> Result<Decoded<KitchenItem>> {
        let members = self.store.read(KITCHEN_ITEMS_KEY).await?;
        Ok(decode_all(&members))
    }

    /// Snapshot filtered to one category.
    pub async fn in_category(&self, category: ItemCategory) -> Result<Vec<KitchenItem>> {
        let mut items = self.list().await?;
        items.retain(|item| item.category == category);
        Ok(items)
    }

    /// Delete the item with the given id. Idempotent: deleting an absent id
    /// succeeds and changes nothing.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.store
            .edit(
                KITCHEN_ITEMS_KEY,
                Box::new(move |members| {
                    members.retain(|member| !member_has_item_id(member, &id));
                }),
            )
            .await?;
        Ok(())
    }

    /// Remove every item.
    pub async fn clear(&self) -> Result<()> {
        self.store
            .edit(KITCHEN_ITEMS_KEY, Box::new(|members| members.clear()))
            .await?;
        Ok(())
    }

    /// Live decoded view: the current list, then a new complete list after
    /// every committed edit.
    pub async fn watch(&self) -> Result<ListWatch<KitchenItem>> {
        // Subscribe before the snapshot read so no edit is missed
        let events = self.store.watch(KITCHEN_ITEMS_KEY)?;
        let members = self.store.read(KITCHEN_ITEMS_KEY).await?;
        Ok(ListWatch::new(decode_list(&members), events, decode_list))
    }
}

fn decode_all(members: &BTreeSet<String>) -> Decoded<KitchenItem> {
    let decoded = decode_members(members, decode_item);
    if decoded.skipped > 0 {
        warn!(
            skipped = decoded.skipped,
            "dropped undecodable kitchen item members"
        );
    }
    decoded
}

fn decode_list(members: &BTreeSet<String>) -> Vec<KitchenItem> {
    decode_all(members).records
}
