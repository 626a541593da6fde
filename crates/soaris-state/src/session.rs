//! Flight mode session.
//!
//! Holds the drone's operating mode. Starts as `Auto`, adopts the persisted
//! mode on hydration unless the operator already picked one, and persists
//! every explicit change as the bare mode name.

use std::sync::Arc;

use soaris_storage::BackingStore;
use tracing::debug;

use crate::cell::{HydrationPhase, Persisted, StoreCell};
use crate::error::StateResult;
use crate::observe::Subscription;
use crate::types::FlightMode;

/// Storage key for the persisted flight mode.
pub const FLIGHT_MODE_KEY: &str = "soaris-flight-mode-v1.txt";

impl Persisted for FlightMode {
    const KEY: &'static str = FLIGHT_MODE_KEY;

    fn encode(&self) -> StateResult<String> {
        Ok(self.as_str().to_string())
    }

    fn decode(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }
}

/// The operator's flight mode selection.
pub struct SessionStore {
    cell: StoreCell<FlightMode>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn BackingStore>) -> Self {
        Self {
            cell: StoreCell::new(backend, FlightMode::default()),
        }
    }

    pub async fn hydrate(&self) {
        self.cell.hydrate().await;
    }

    pub fn current_mode(&self) -> FlightMode {
        *self.cell.snapshot()
    }

    pub fn is_manual(&self) -> bool {
        self.current_mode() == FlightMode::Manual
    }

    pub fn is_auto(&self) -> bool {
        self.current_mode() == FlightMode::Auto
    }

    /// Switch modes.
    ///
    /// Counts as an explicit operator choice even when `next` equals the
    /// current mode, so a hydration still in flight can no longer replace it.
    pub fn set_mode(&self, next: FlightMode) {
        self.cell.update(|mode| {
            *mode = next;
            true
        });
        debug!(mode = %next, "flight mode set");
    }

    /// Switch modes from a string; unknown names are ignored.
    ///
    /// Returns whether the name was accepted.
    pub fn set_mode_str(&self, next: &str) -> bool {
        match next.parse::<FlightMode>() {
            Ok(mode) => {
                self.set_mode(mode);
                true
            }
            Err(e) => {
                debug!(error = %e, "ignoring flight mode change");
                false
            }
        }
    }

    pub fn phase(&self) -> HydrationPhase {
        self.cell.phase()
    }

    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> Subscription {
        self.cell.subscribe(callback)
    }

    pub async fn flush(&self) {
        self.cell.flush().await;
    }
}
