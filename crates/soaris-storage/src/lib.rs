//! soaris-storage: durable key-value blob stores for Soaris.
//!
//! Every persisted Soaris store mirrors its state into a single text blob
//! under a versioned key. This crate defines that contract
//! ([`BackingStore`]) and ships three backends:
//!
//! - [`FsBackingStore`]: one file per key under a data directory.
//! - [`RedbBackingStore`]: a single [redb](https://docs.rs/redb) table,
//!   on disk or in memory.
//! - [`MemoryBackingStore`]: a `HashMap` test double with latency and
//!   fault injection.
//!
//! All backends are `Send + Sync` and meant to be shared behind an `Arc`.

pub mod backend;
pub mod error;
pub mod fs;
pub mod memory;
pub mod redb_store;

pub use backend::{BackingStore, BoxFuture};
pub use error::{StorageError, StorageResult};
pub use fs::FsBackingStore;
pub use memory::MemoryBackingStore;
pub use redb_store::RedbBackingStore;
