//! soaris-state: the stateful core behind the Soaris field client.
//!
//! Three persisted stores back the operator screens:
//!
//! - [`SessionStore`]: the current flight mode (`Auto` / `Manual`).
//! - [`PairingStore`]: paired drone labels and the active one.
//! - [`PlotsStore`]: surveyed plot records and the focused plot.
//!
//! plus two in-memory helpers for the area-drawing flow:
//! [`AreaDraft`] (tap collection) and [`SelectionRelay`] (one-shot hand-off
//! of the finished selection to the dashboard).
//!
//! # Architecture
//!
//! ```text
//! PairingStore / PlotsStore / SessionStore
//!   └── StoreCell<S: Persisted>
//!         ├── Arc<S> snapshot        (copy-on-write, read without blocking)
//!         ├── HydrationPhase         (Unhydrated { overridden } → Hydrated)
//!         ├── OnceCell hydration     (one shared backend read)
//!         ├── Persister task         (ordered, coalescing, best-effort writes)
//!         └── Observers              (subscribe → Subscription)
//! ```
//!
//! In-memory state is authoritative. Mutations apply synchronously and are
//! mirrored to the [`BackingStore`](soaris_storage::BackingStore) in the
//! background; a failed write is logged and otherwise ignored. Stores must
//! be constructed inside a Tokio runtime.

pub mod analytics;
pub mod cell;
pub mod draft;
pub mod error;
pub mod observe;
pub mod pairing;
mod persister;
pub mod plots;
pub mod relay;
pub mod session;
pub mod types;

pub use analytics::{
    Alert, AlertLevel, FieldSummary, MoistureAdvice, Recommendation, TemperatureRisk,
};
pub use cell::{HydrationPhase, Persisted, StoreCell};
pub use draft::AreaDraft;
pub use error::{StateError, StateResult};
pub use observe::Subscription;
pub use pairing::{PairingState, PairingStore};
pub use plots::{PlotsState, PlotsStore};
pub use relay::SelectionRelay;
pub use session::SessionStore;
pub use types::*;
