//! SQLite store implementation.
//!
//! The durable backend: one row per (store key, member) plus a per-key
//! version table. An `edit` reads the full set, applies the transform, and
//! rewrites the rows inside a single database transaction, so concurrent
//! edits of the same key serialize at the database.
//!
//! Features:
//! - WAL mode for concurrent readers
//! - Watch via in-memory channels (per-process)

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::store::{validate_key, EditFn, KeyValueStore};
use crate::watch::{WatchEvent, WatchSender, WatchStream};

/// SQLite implementation of KeyValueStore.
///
/// Uses WAL mode for performance and durability.
/// Watch notifications are in-process only (not shared across processes).
pub struct SqliteStore {
    pool: SqlitePool,
    watcher: WatchSender,
}

impl SqliteStore {
    /// Open or create a SQLite store at the given path.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening SQLite store at {:?}", path);

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
            .map_err(|e| StoreError::ConnectionError(e.to_string()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::ConnectionError(e.to_string()))?;

        let store = Self {
            pool,
            watcher: WatchSender::new(64),
        };

        store.init_schema().await?;
        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing).
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StoreError::ConnectionError(e.to_string()))?
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::ConnectionError(e.to_string()))?;

        let store = Self {
            pool,
            watcher: WatchSender::new(64),
        };

        store.init_schema().await?;
        Ok(store)
    }

    /// Initialize the database schema.
    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS set_members (
                store_key TEXT NOT NULL,
                member TEXT NOT NULL,
                PRIMARY KEY (store_key, member)
            );

            CREATE TABLE IF NOT EXISTS set_versions (
                store_key TEXT PRIMARY KEY NOT NULL,
                version INTEGER NOT NULL DEFAULT 0,
                updated_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        debug!("SQLite schema initialized");
        Ok(())
    }

    /// Get current Unix timestamp.
    fn now_unix() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn read(&self, key: &str) -> Result<BTreeSet<String>> {
        validate_key(key)?;

        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT member FROM set_members WHERE store_key = ?")
                .bind(key)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(member,)| member).collect())
    }

    async fn edit(&self, key: &str, transform: EditFn) -> Result<u64> {
        validate_key(key)?;

        let mut tx = self.pool.begin().await?;

        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT member FROM set_members WHERE store_key = ?")
                .bind(key)
                .fetch_all(&mut *tx)
                .await?;
        let mut members: BTreeSet<String> = rows.into_iter().map(|(member,)| member).collect();

        transform(&mut members);

        // Rewrite the whole set; the member count per key is small
        sqlx::query("DELETE FROM set_members WHERE store_key = ?")
            .bind(key)
            .execute(&mut *tx)
            .await?;

        for member in &members {
            sqlx::query("INSERT INTO set_members (store_key, member) VALUES (?, ?)")
                .bind(key)
                .bind(member)
                .execute(&mut *tx)
                .await?;
        }

        let row: Option<(i64,)> =
            sqlx::query_as("SELECT version FROM set_versions WHERE store_key = ?")
                .bind(key)
                .fetch_optional(&mut *tx)
                .await?;
        let new_version = row.map(|(v,)| v as u64).unwrap_or(0) + 1;

        sqlx::query(
            r#"
            INSERT INTO set_versions (store_key, version, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(store_key) DO UPDATE SET
                version = excluded.version,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(new_version as i64)
        .bind(Self::now_unix())
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;

        // Notify after successful commit
        self.watcher.send(WatchEvent::new(key, members, new_version));

        Ok(new_version)
    }

    fn watch(&self, key: &str) -> Result<WatchStream> {
        validate_key(key)?;
        Ok(self.watcher.subscribe(key))
    }
}
