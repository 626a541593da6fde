//! File-per-key backing store.
//!
//! Each key maps to a file directly under the store root. Writes go to a
//! sibling temp file first and are renamed into place, so a crash mid-write
//! leaves the previous blob intact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::backend::{BackingStore, BoxFuture};
use crate::error::{StorageError, StorageResult};

/// Backing store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct FsBackingStore {
    root: PathBuf,
}

impl FsBackingStore {
    /// Create a store rooted at `root`. The directory is created lazily on
    /// the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The data directory this store writes into.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key to its file path, rejecting anything that could escape
    /// the root.
    fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty()
            || key == "."
            || key == ".."
            || key.contains('/')
            || key.contains('\\')
        {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

impl BackingStore for FsBackingStore {
    fn exists<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StorageResult<bool>> {
        Box::pin(async move {
            let path = self.path_for(key)?;
            Ok(tokio::fs::try_exists(&path).await?)
        })
    }

    fn read_text<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StorageResult<String>> {
        Box::pin(async move {
            let path = self.path_for(key)?;
            match tokio::fs::read_to_string(&path).await {
                Ok(text) => Ok(text),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    Err(StorageError::NotFound(key.to_string()))
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    fn write_text<'a>(
        &'a self,
        key: &'a str,
        contents: &'a str,
    ) -> BoxFuture<'a, StorageResult<()>> {
        Box::pin(async move {
            let path = self.path_for(key)?;
            tokio::fs::create_dir_all(&self.root).await?;
            let tmp = self.root.join(format!(".{key}.tmp"));
            tokio::fs::write(&tmp, contents).await?;
            tokio::fs::rename(&tmp, &path).await?;
            debug!(path = %path.display(), bytes = contents.len(), "blob written");
            Ok(())
        })
    }
}
