//! In-memory backing store for tests.
//!
//! Besides holding blobs in a `HashMap`, [`MemoryBackingStore`] can slow
//! down reads and fail reads or writes on demand, which lets store tests
//! interleave user actions with a pending hydration and exercise the
//! swallow-on-failure paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::backend::{BackingStore, BoxFuture};
use crate::error::{StorageError, StorageResult};

/// `HashMap`-backed blob store with latency and fault injection.
#[derive(Debug, Default)]
pub struct MemoryBackingStore {
    blobs: Mutex<HashMap<String, String>>,
    read_delay: Duration,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryBackingStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a blob before handing the store out.
    pub fn with_blob(self, key: &str, contents: &str) -> Self {
        self.insert(key, contents);
        self
    }

    /// Delay every `read_text` by `delay`.
    ///
    /// The blob is captured *before* the delay, so a slow read returns the
    /// value as it was when the read started.
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = delay;
        self
    }

    /// Insert or replace a blob directly, bypassing fault injection.
    pub fn insert(&self, key: &str, contents: &str) {
        self.lock().insert(key.to_string(), contents.to_string());
    }

    /// Current blob under `key`, bypassing fault injection.
    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    /// Make subsequent `exists`/`read_text` calls fail with an I/O error.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `write_text` calls fail with an I/O error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of `read_text` calls served or failed so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of `write_text` calls attempted so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a consistent map of whole blobs.
        self.blobs.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl BackingStore for MemoryBackingStore {
    fn exists<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StorageResult<bool>> {
        Box::pin(async move {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(StorageError::Io(format!("injected read failure: {key}")));
            }
            Ok(self.lock().contains_key(key))
        })
    }

    fn read_text<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StorageResult<String>> {
        Box::pin(async move {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(StorageError::Io(format!("injected read failure: {key}")));
            }
            let value = self.lock().get(key).cloned();
            if !self.read_delay.is_zero() {
                tokio::time::sleep(self.read_delay).await;
            }
            value.ok_or_else(|| StorageError::NotFound(key.to_string()))
        })
    }

    fn write_text<'a>(
        &'a self,
        key: &'a str,
        contents: &'a str,
    ) -> BoxFuture<'a, StorageResult<()>> {
        Box::pin(async move {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StorageError::Io(format!("injected write failure: {key}")));
            }
            self.insert(key, contents);
            Ok(())
        })
    }
}
