//! Drone pairing session.
//!
//! Tracks every drone the operator has paired (in pairing order, duplicates
//! allowed) and which one is active. The active label always names a paired
//! drone or is `None`; every operation below preserves that.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use soaris_storage::BackingStore;
use tracing::debug;

use crate::cell::{HydrationPhase, Persisted, StoreCell};
use crate::error::{StateError, StateResult};
use crate::observe::Subscription;
use crate::types::PairMethod;

/// Storage key for the persisted pairing session.
pub const PAIRING_KEY: &str = "soaris-pairing-v1.json";

/// Paired drone labels plus the active one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingState {
    pub paired_devices: Vec<String>,
    /// Required in the blob, even when null.
    #[serde(deserialize_with = "Option::deserialize")]
    pub active_device: Option<String>,
}

impl PairingState {
    /// Clear the active label if it no longer names a paired drone.
    fn drop_stale_active(&mut self) {
        if let Some(active) = &self.active_device {
            if !self.paired_devices.contains(active) {
                debug!(%active, "dropping stale active device");
                self.active_device = None;
            }
        }
    }
}

impl Persisted for PairingState {
    const KEY: &'static str = PAIRING_KEY;

    fn encode(&self) -> StateResult<String> {
        serde_json::to_string(self).map_err(|e| StateError::Serialize(e.to_string()))
    }

    fn decode(raw: &str) -> Option<Self> {
        let mut state: PairingState = serde_json::from_str(raw).ok()?;
        state.drop_stale_active();
        Some(state)
    }
}

/// The operator's paired drones.
pub struct PairingStore {
    cell: StoreCell<PairingState>,
}

impl PairingStore {
    pub fn new(backend: Arc<dyn BackingStore>) -> Self {
        Self {
            cell: StoreCell::new(backend, PairingState::default()),
        }
    }

    pub async fn hydrate(&self) {
        self.cell.hydrate().await;
    }

    pub fn snapshot(&self) -> Arc<PairingState> {
        self.cell.snapshot()
    }

    /// Paired labels, oldest first.
    pub fn paired_devices(&self) -> Vec<String> {
        self.cell.snapshot().paired_devices.clone()
    }

    pub fn active_device(&self) -> Option<String> {
        self.cell.snapshot().active_device.clone()
    }

    pub fn has_active_device(&self) -> bool {
        self.cell.snapshot().active_device.is_some()
    }

    /// Append a pairing. Labels are not deduplicated.
    pub fn add_paired_device(&self, label: impl Into<String>) {
        let label = label.into();
        debug!(%label, "pairing device");
        self.cell.update(|state| {
            state.paired_devices.push(label);
            true
        });
    }

    /// Pair a drone via `method`, labelled `Drone (<method>) <n>` where `n`
    /// is its position in the list. Returns the label.
    pub fn pair_via(&self, method: PairMethod) -> String {
        let mut label = String::new();
        self.cell.update(|state| {
            label = format!("Drone ({method}) {}", state.paired_devices.len() + 1);
            state.paired_devices.push(label.clone());
            true
        });
        debug!(%label, "device paired");
        label
    }

    /// Remove the pairing at `index`. Out-of-range indexes are ignored.
    ///
    /// Removing the active drone clears the active label.
    pub fn remove_paired_device_by_index(&self, index: usize) {
        self.cell.update(|state| {
            if index >= state.paired_devices.len() {
                debug!(index, "ignoring removal of unknown pairing");
                return false;
            }
            let removed = state.paired_devices.remove(index);
            if state.active_device.as_ref() == Some(&removed) {
                state.active_device = None;
            }
            true
        });
    }

    /// Make `label` the active drone. Ignored unless `label` is paired.
    pub fn set_active_device(&self, label: &str) {
        self.cell.update(|state| {
            if !state.paired_devices.iter().any(|d| d == label) {
                debug!(%label, "ignoring activation of unpaired device");
                return false;
            }
            state.active_device = Some(label.to_string());
            true
        });
    }

    /// Forget every pairing, e.g. on logout. The empty state is persisted so
    /// the next account starts clean.
    pub fn clear_session(&self) {
        self.cell.update(|state| {
            *state = PairingState::default();
            true
        });
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
