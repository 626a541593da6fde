//! Change observers for the stores.
//!
//! Callbacks take no arguments: a notified consumer pulls the latest
//! snapshot from the store, the same way a reactive view re-reads its
//! source on change.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Callback = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct ObserverSet {
    next_id: u64,
    callbacks: BTreeMap<u64, Callback>,
}

/// Registry of change callbacks.
#[derive(Clone, Default)]
pub(crate) struct Observers {
    set: Arc<Mutex<ObserverSet>>,
}

impl Observers {
    pub(crate) fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> Subscription {
        let mut set = lock(&self.set);
        let id = set.next_id;
        set.next_id += 1;
        set.callbacks.insert(id, Arc::new(callback));
        Subscription {
            id,
            set: Arc::downgrade(&self.set),
        }
    }

    /// Invoke every callback in subscription order.
    ///
    /// The registry lock is released before any callback runs, so callbacks
    /// may subscribe, unsubscribe, or read the store.
    pub(crate) fn notify(&self) {
        let callbacks: Vec<Callback> = lock(&self.set).callbacks.values().cloned().collect();
        for callback in callbacks {
            callback();
        }
    }

    pub(crate) fn len(&self) -> usize {
        lock(&self.set).callbacks.len()
    }
}

/// Handle to a registered callback. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes its callback"]
pub struct Subscription {
    id: u64,
    set: Weak<Mutex<ObserverSet>>,
}

impl Subscription {
    /// Remove the callback. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(set) = self.set.upgrade() {
            lock(&set).callbacks.remove(&self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

fn lock(set: &Mutex<ObserverSet>) -> MutexGuard<'_, ObserverSet> {
    set.lock().unwrap_or_else(PoisonError::into_inner)
}
