//! Background snapshot writer.
//!
//! Each store owns one [`Persister`]: a task that mirrors the newest encoded
//! snapshot into the backing store. Submissions never block. Writes happen
//! in submission order, and a burst of submissions while a write is in
//! flight collapses into a single write of the newest payload.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use soaris_storage::BackingStore;
use tokio::sync::watch;
use tracing::{debug, warn};

#[derive(Clone)]
struct Pending {
    generation: u64,
    payload: Arc<str>,
}

pub(crate) struct Persister {
    key: &'static str,
    pending: watch::Sender<Option<Pending>>,
    written: watch::Receiver<u64>,
    submitted: AtomicU64,
}

impl Persister {
    /// Spawn the writer task for `key`.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub(crate) fn spawn(key: &'static str, backend: Arc<dyn BackingStore>) -> Self {
        let (pending_tx, mut pending_rx) = watch::channel(None::<Pending>);
        let (written_tx, written_rx) = watch::channel(0u64);

        tokio::spawn(async move {
            // Exits once the store (and with it the sender) is dropped and
            // the last submitted payload has been written.
            while pending_rx.changed().await.is_ok() {
                let next = pending_rx.borrow_and_update().clone();
                let Some(next) = next else { continue };
                match backend.write_text(key, &next.payload).await {
                    Ok(()) => debug!(%key, generation = next.generation, "snapshot persisted"),
                    Err(e) => warn!(%key, error = %e, "failed to persist snapshot"),
                }
                written_tx.send_replace(next.generation);
            }
            debug!(%key, "persister stopped");
        });

        Self {
            key,
            pending: pending_tx,
            written: written_rx,
            submitted: AtomicU64::new(0),
        }
    }

    /// Queue `payload` as the newest snapshot.
    pub(crate) fn submit(&self, payload: String) {
        let generation = self.submitted.fetch_add(1, Ordering::SeqCst) + 1;
        self.pending.send_replace(Some(Pending {
            generation,
            payload: payload.into(),
        }));
    }

    /// Wait until every payload submitted so far has been attempted.
    ///
    /// Failed writes count as attempted.
    pub(crate) async fn flush(&self) {
        let target = self.submitted.load(Ordering::SeqCst);
        let mut written = self.written.clone();
        if written.wait_for(|done| *done >= target).await.is_err() {
            warn!(key = %self.key, "persister gone before flush completed");
        }
    }
}
