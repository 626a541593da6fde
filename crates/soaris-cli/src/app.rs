//! Store wiring for a CLI invocation.

use std::sync::Arc;

use soaris_state::{PairingStore, PlotsStore, SessionStore};
use soaris_storage::{BackingStore, FsBackingStore, RedbBackingStore};
use tracing::debug;

use crate::config::{BackendKind, StorageConfig};

/// The persisted stores, sharing one backing store.
pub struct App {
    pub session: SessionStore,
    pub pairing: PairingStore,
    pub plots: PlotsStore,
}

impl App {
    pub fn open(config: &StorageConfig) -> anyhow::Result<Self> {
        let backend: Arc<dyn BackingStore> = match config.backend {
            BackendKind::Fs => Arc::new(FsBackingStore::new(&config.data_dir)),
            BackendKind::Redb => {
                std::fs::create_dir_all(&config.data_dir)?;
                Arc::new(RedbBackingStore::open(&config.data_dir.join("soaris.redb"))?)
            }
        };
        debug!(data_dir = %config.data_dir.display(), backend = ?config.backend, "stores opened");
        Ok(Self::with_backend(backend))
    }

    pub fn with_backend(backend: Arc<dyn BackingStore>) -> Self {
        Self {
            session: SessionStore::new(backend.clone()),
            pairing: PairingStore::new(backend.clone()),
            plots: PlotsStore::new(backend),
        }
    }

    pub async fn hydrate(&self) {
        tokio::join!(
            self.session.hydrate(),
            self.pairing.hydrate(),
            self.plots.hydrate()
        );
    }

    /// Wait for pending writes before the process exits.
    pub async fn flush(&self) {
        tokio::join!(
            self.session.flush(),
            self.pairing.flush(),
            self.plots.flush()
        );
    }
}

#[cfg(test)]
mod tests {
    use soaris_state::{FlightMode, PairMethod};

    use super::*;

    async fn exercise(config: &StorageConfig) {
        let app = App::open(config).unwrap();
        app.hydrate().await;
        app.session.set_mode(FlightMode::Manual);
        let label = app.pairing.pair_via(PairMethod::QrCode);
        app.pairing.set_active_device(&label);
        app.plots.set_selected_plot(Some("plot2"));
        app.flush().await;
        drop(app);

        let reopened = App::open(config).unwrap();
        reopened.hydrate().await;
        assert_eq!(reopened.session.current_mode(), FlightMode::Manual);
        assert_eq!(reopened.pairing.active_device(), Some(label));
        assert_eq!(reopened.plots.selected_plot_id().as_deref(), Some("plot2"));
    }

    #[tokio::test]
    async fn test_fs_backend_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            backend: BackendKind::Fs,
            data_dir: dir.path().join("data"),
        };
        exercise(&config).await;
    }

    #[tokio::test]
    async fn test_redb_backend_creates_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            backend: BackendKind::Redb,
            data_dir: dir.path().join("nested").join("data"),
        };
        let app = App::open(&config).unwrap();
        app.hydrate().await;
        app.session.set_mode(FlightMode::Manual);
        app.flush().await;
        assert!(config.data_dir.join("soaris.redb").exists());
    }
}
