//! One-shot hand-off of a finished area selection.
//!
//! The drawing flow puts the selection in; the dashboard takes it out once
//! and starts a mapping run. The slot is a mailbox, not a cache:
//!
//! ```text
//! Empty ──set──▶ Filled ──consume──▶ Empty
//!                Filled ──set──▶ Filled (previous selection discarded)
//!        any ──clear──▶ Empty
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::types::AreaSelection;

/// Single-slot mailbox for [`AreaSelection`]s.
#[derive(Debug, Default)]
pub struct SelectionRelay {
    slot: Mutex<Option<AreaSelection>>,
}

impl SelectionRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `selection`, replacing any unconsumed one.
    pub fn set_selection(&self, selection: AreaSelection) {
        if self.lock().replace(selection).is_some() {
            debug!("unconsumed area selection replaced");
        }
    }

    /// Take the pending selection, leaving the slot empty.
    ///
    /// Read and clear happen under one lock, so a selection is returned at
    /// most once.
    pub fn consume_selection(&self) -> Option<AreaSelection> {
        self.lock().take()
    }

    /// Discard any pending selection (drawing cancelled).
    pub fn clear_selection(&self) {
        self.lock().take();
    }

    /// Whether a selection is waiting, without consuming it.
    pub fn has_pending(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Option<AreaSelection>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
