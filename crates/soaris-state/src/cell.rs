//! StoreCell: the hydrate/mutate/persist/notify core shared by all stores.
//!
//! A cell owns one piece of state `S`. Reads hand out an immutable
//! `Arc<S>` snapshot. Mutations run synchronously, swap in a new snapshot,
//! queue the encoded state for the background [`Persister`], and notify
//! observers.
//!
//! # Hydration
//!
//! ```text
//! Unhydrated { overridden: false } ──mutate──▶ Unhydrated { overridden: true }
//!          │                                             │
//!       hydrate: adopt persisted state             hydrate: keep memory
//!          ▼                                             ▼
//!                          Hydrated
//! ```
//!
//! The persisted snapshot is read at most once. A mutation that lands while
//! that read is still pending wins over whatever the read returns.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use soaris_storage::BackingStore;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::error::StateResult;
use crate::observe::{Observers, Subscription};
use crate::persister::Persister;

/// State that can be mirrored into a backing store blob.
pub trait Persisted: Clone + Send + Sync + 'static {
    /// Versioned backing store key. Bump the version suffix when the
    /// encoding changes incompatibly.
    const KEY: &'static str;

    /// Encode the state into its blob form.
    fn encode(&self) -> StateResult<String>;

    /// Decode a blob. `None` means the blob is unusable and must be treated
    /// as if nothing had been persisted.
    fn decode(raw: &str) -> Option<Self>;
}

/// Where a cell is in its one-time hydration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationPhase {
    /// The persisted snapshot has not been applied yet. `overridden` is set
    /// once any mutation happens in this phase.
    Unhydrated { overridden: bool },
    /// Hydration finished (whether or not anything was adopted).
    Hydrated,
}

struct Inner<S> {
    state: Arc<S>,
    phase: HydrationPhase,
}

/// Authoritative in-memory state with lazy hydration and best-effort
/// persistence.
pub struct StoreCell<S: Persisted> {
    backend: Arc<dyn BackingStore>,
    inner: Mutex<Inner<S>>,
    hydration: OnceCell<()>,
    observers: Observers,
    persister: Persister,
}

impl<S: Persisted> StoreCell<S> {
    /// Create a cell holding `initial` until hydration.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime (the persister task is
    /// spawned here).
    pub fn new(backend: Arc<dyn BackingStore>, initial: S) -> Self {
        let persister = Persister::spawn(S::KEY, backend.clone());
        Self {
            backend,
            inner: Mutex::new(Inner {
                state: Arc::new(initial),
                phase: HydrationPhase::Unhydrated { overridden: false },
            }),
            hydration: OnceCell::new(),
            observers: Observers::default(),
            persister,
        }
    }

    /// Current snapshot. Never blocks on I/O.
    pub fn snapshot(&self) -> Arc<S> {
        self.lock().state.clone()
    }

    pub fn phase(&self) -> HydrationPhase {
        self.lock().phase
    }

    pub fn is_hydrated(&self) -> bool {
        self.phase() == HydrationPhase::Hydrated
    }

    /// Apply `mutate` to a copy of the state.
    ///
    /// `mutate` returns whether it changed anything. On change the new state
    /// becomes the snapshot, is queued for persistence, and observers are
    /// notified after the state lock is released. Returns the same flag.
    pub fn update(&self, mutate: impl FnOnce(&mut S) -> bool) -> bool {
        {
            let mut inner = self.lock();
            let mut next = S::clone(&inner.state);
            if !mutate(&mut next) {
                return false;
            }
            if let HydrationPhase::Unhydrated { overridden } = &mut inner.phase {
                *overridden = true;
            }
            self.queue_persist(&next);
            inner.state = Arc::new(next);
        }
        self.observers.notify();
        true
    }

    /// Load the persisted snapshot once.
    ///
    /// Concurrent callers share one backend read; once it has completed,
    /// further calls return immediately.
    pub async fn hydrate(&self) {
        self.hydration.get_or_init(|| self.load()).await;
    }

    /// Register a change callback.
    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> Subscription {
        self.observers.subscribe(callback)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Wait until every mutation so far has been written (or has failed to
    /// write). Mutations never need this; it exists for shutdown and tests.
    pub async fn flush(&self) {
        self.persister.flush().await;
    }

    async fn load(&self) {
        let persisted = self.read_persisted().await;
        {
            let mut inner = self.lock();
            match (inner.phase, persisted) {
                (HydrationPhase::Unhydrated { overridden: false }, Some(state)) => {
                    inner.state = Arc::new(state);
                    info!(key = S::KEY, "hydrated from persisted snapshot");
                }
                (HydrationPhase::Unhydrated { overridden: true }, Some(_)) => {
                    info!(key = S::KEY, "persisted snapshot superseded by newer in-memory state");
                }
                (_, None) => debug!(key = S::KEY, "no usable persisted snapshot"),
                (HydrationPhase::Hydrated, Some(_)) => {}
            }
            inner.phase = HydrationPhase::Hydrated;
        }
        self.observers.notify();
    }

    async fn read_persisted(&self) -> Option<S> {
        match self.backend.exists(S::KEY).await {
            Ok(true) => {}
            Ok(false) => return None,
            Err(e) => {
                warn!(key = S::KEY, error = %e, "failed to probe persisted snapshot");
                return None;
            }
        }
        let raw = match self.backend.read_text(S::KEY).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = S::KEY, error = %e, "failed to read persisted snapshot");
                return None;
            }
        };
        let decoded = S::decode(&raw);
        if decoded.is_none() {
            warn!(key = S::KEY, "discarding unreadable persisted snapshot");
        }
        decoded
    }

    fn queue_persist(&self, state: &S) {
        match state.encode() {
            Ok(payload) => self.persister.submit(payload),
            Err(e) => warn!(key = S::KEY, error = %e, "failed to encode snapshot"),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<S>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
