//! # pantry-store
//!
//! Persistence core for a kitchen companion app: browse and record kitchen
//! inventory and recipe-generation history over a small observable
//! key-value store.
//!
//! Two structurally identical managers sit on top of one injected backend:
//!
//! - [`KitchenStore`]: item records (id, name, quantity, category) under
//!   one store key, replace-by-id on save
//! - [`RecipeHistoryStore`]: (name, timestamp) pairs under another key,
//!   newest first, identified only by the pair itself
//!
//! Records are encoded as delimiter-joined flat strings and stored as
//! members of a string set - the compatibility format of the data this
//! crate manages. Members that fail to decode are dropped from listings
//! (and counted, see [`codec::Decoded`]), never surfaced as errors.
//!
//! ## Backends
//!
//! - [`SqliteStore`]: durable, file-backed (default for production)
//! - [`MemoryStore`]: in-memory (testing and development)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pantry_store::{ItemCategory, KitchenItem, KitchenStore, MemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> pantry_store::Result<()> {
//!     let store = Arc::new(MemoryStore::new());
//!     let kitchen = KitchenStore::new(store);
//!
//!     kitchen
//!         .save(&KitchenItem::new("Flour", "2", ItemCategory::Ingredients))
//!         .await?;
//!
//!     for item in kitchen.list().await? {
//!         println!("{} x{} [{}]", item.name, item.quantity, item.category);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Live views
//!
//! Reads can also be subscriptions: [`watch`](KitchenStore::watch) yields
//! the current decoded list, then a new complete list after every
//! committed edit.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pantry_store::{MemoryStore, RecipeHistoryStore};
//! use tokio_stream::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> pantry_store::Result<()> {
//!     let store = Arc::new(MemoryStore::new());
//!     let history = RecipeHistoryStore::new(store);
//!
//!     let mut view = history.watch().await?;
//!     tokio::spawn(async move {
//!         while let Some(entries) = view.next().await {
//!             println!("history now holds {} entries", entries.len());
//!         }
//!     });
//!
//!     history.add("Recipe #42").await?;
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod error;
pub mod history;
pub mod kitchen;
pub mod memory;
pub mod sqlite;
pub mod store;
pub mod watch;

// Re-export main types
pub use codec::{Decoded, HistoryEntry, ItemCategory, KitchenItem};
pub use error::{Result, StoreError};
pub use history::{RecipeHistoryStore, DATE_FORMAT, RECIPES_KEY};
pub use kitchen::{KitchenStore, KITCHEN_ITEMS_KEY};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use store::{EditFn, KeyValueStore, MAX_KEY_LENGTH};
pub use watch::{ListWatch, WatchEvent, WatchStream};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::codec::{Decoded, HistoryEntry, ItemCategory, KitchenItem};
    pub use crate::error::{Result, StoreError};
    pub use crate::history::RecipeHistoryStore;
    pub use crate::kitchen::KitchenStore;
    pub use crate::memory::MemoryStore;
    pub use crate::sqlite::SqliteStore;
    pub use crate::store::KeyValueStore;
    pub use crate::watch::{ListWatch, WatchEvent, WatchStream};
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_managers_share_one_backend() {
        let store = Arc::new(MemoryStore::new());
        let kitchen = KitchenStore::new(store.clone());
        let history = RecipeHistoryStore::new(store);

        kitchen
            .save(&KitchenItem::new("Flour", "2", ItemCategory::Ingredients))
            .await
            .unwrap();
        history.add("Recipe #1").await.unwrap();

        // Disjoint store keys: neither manager sees the other's records
        assert_eq!(kitchen.list().await.unwrap().len(), 1);
        assert_eq!(history.list().await.unwrap().len(), 1);

        kitchen.clear().await.unwrap();
        assert!(kitchen.list().await.unwrap().is_empty());
        assert_eq!(history.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_managers_over_sqlite_backend() {
        let store = Arc::new(SqliteStore::in_memory().await.unwrap());
        let kitchen = KitchenStore::new(store);

        let item = KitchenItem::new("Skillet", "1", ItemCategory::Cookware);
        kitchen.save(&item).await.unwrap();

        let items = kitchen.list().await.unwrap();
        assert_eq!(items, vec![item]);
    }

    #[test]
    fn test_stores_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}

        assert_send_sync::<MemoryStore>();
        assert_send_sync::<SqliteStore>();
        assert_send_sync::<KitchenStore>();
        assert_send_sync::<RecipeHistoryStore>();
    }
}
