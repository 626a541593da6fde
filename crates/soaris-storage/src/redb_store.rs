//! redb-backed blob store.
//!
//! All blobs live in one `blobs` table keyed by the blob key. redb is a
//! blocking API, so every operation runs on the blocking thread pool. The
//! store is `Clone` (backed by `Arc<Database>`) and supports both on-disk
//! and in-memory databases, the latter for testing.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use tracing::debug;

use crate::backend::{BackingStore, BoxFuture};
use crate::error::{StorageError, StorageResult};

/// Blob text keyed by blob key.
const BLOBS: TableDefinition<&str, &str> = TableDefinition::new("blobs");

/// Convert any `Display` error into a `StorageError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StorageError::$variant(e.to_string())
    };
}

/// Thread-safe blob store backed by redb.
#[derive(Clone)]
pub struct RedbBackingStore {
    db: Arc<Database>,
}

impl RedbBackingStore {
    /// Open (or create) a persistent blob store at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_table()?;
        debug!(?path, "blob store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory blob store (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_table()?;
        debug!("in-memory blob store opened");
        Ok(store)
    }

    fn ensure_table(&self) -> StorageResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(BLOBS).map_err(map_err!(Transaction))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    fn get_blocking(db: &Database, key: &str) -> StorageResult<Option<String>> {
        let txn = db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(BLOBS).map_err(map_err!(Transaction))?;
        let value = table.get(key).map_err(map_err!(Io))?;
        Ok(value.map(|guard| guard.value().to_string()))
    }

    fn put_blocking(db: &Database, key: &str, contents: &str) -> StorageResult<()> {
        let txn = db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(BLOBS).map_err(map_err!(Transaction))?;
            table.insert(key, contents).map_err(map_err!(Io))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let db = self.db.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || Self::get_blocking(&db, &key))
            .await
            .map_err(map_err!(Io))?
    }
}

impl BackingStore for RedbBackingStore {
    fn exists<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StorageResult<bool>> {
        Box::pin(async move { Ok(self.get(key).await?.is_some()) })
    }

    fn read_text<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StorageResult<String>> {
        Box::pin(async move {
            self.get(key)
                .await?
                .ok_or_else(|| StorageError::NotFound(key.to_string()))
        })
    }

    fn write_text<'a>(
        &'a self,
        key: &'a str,
        contents: &'a str,
    ) -> BoxFuture<'a, StorageResult<()>> {
        Box::pin(async move {
            let db = self.db.clone();
            let owned_key = key.to_string();
            let owned = contents.to_string();
            tokio::task::spawn_blocking(move || Self::put_blocking(&db, &owned_key, &owned))
                .await
                .map_err(map_err!(Io))??;
            debug!(%key, bytes = contents.len(), "blob stored");
            Ok(())
        })
    }
}
