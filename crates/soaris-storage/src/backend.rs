//! The blob store contract shared by every backend.

use std::future::Future;
use std::pin::Pin;

use crate::error::StorageResult;

/// Boxed `Send` future returned by [`BackingStore`] methods.
///
/// Keeps the trait object safe so stores can hold an `Arc<dyn BackingStore>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A filesystem-like store of whole text blobs, addressed by key.
///
/// Keys are flat names such as `soaris-pairing-v1.json`. Writes replace the
/// whole blob; there are no partial updates.
pub trait BackingStore: Send + Sync {
    /// Whether a blob exists under `key`.
    fn exists<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StorageResult<bool>>;

    /// Read the blob under `key`.
    ///
    /// Fails with [`StorageError::NotFound`](crate::StorageError::NotFound)
    /// when no blob exists.
    fn read_text<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StorageResult<String>>;

    /// Replace the blob under `key` with `contents`.
    fn write_text<'a>(&'a self, key: &'a str, contents: &'a str)
        -> BoxFuture<'a, StorageResult<()>>;
}
