//! Hydration racing with operator actions, and failure handling at the
//! storage boundary.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use soaris_state::pairing::PAIRING_KEY;
use soaris_state::plots::PLOTS_KEY;
use soaris_state::*;
use soaris_storage::MemoryBackingStore;

fn slow_backend() -> MemoryBackingStore {
    MemoryBackingStore::new().with_read_delay(Duration::from_millis(200))
}

#[tokio::test(start_paused = true)]
async fn pairing_added_during_hydration_is_kept() {
    let backend = Arc::new(slow_backend().with_blob(
        PAIRING_KEY,
        r#"{"pairedDevices":["Old Drone"],"activeDevice":"Old Drone"}"#,
    ));
    let store = PairingStore::new(backend.clone());

    tokio::join!(store.hydrate(), async {
        store.add_paired_device("New Drone");
    });

    assert_eq!(store.paired_devices(), ["New Drone"]);
    assert_eq!(store.active_device(), None);
    assert_eq!(store.phase(), HydrationPhase::Hydrated);

    store.flush().await;
    assert_eq!(
        backend.get(PAIRING_KEY).as_deref(),
        Some(r#"{"pairedDevices":["New Drone"],"activeDevice":null}"#)
    );
}

#[tokio::test(start_paused = true)]
async fn mapping_during_hydration_is_kept() {
    let stale = PlotsState {
        plots: vec![],
        selected_plot_id: None,
    };
    let raw = serde_json::to_string(&stale).unwrap();
    let backend = Arc::new(slow_backend().with_blob(PLOTS_KEY, &raw));
    let store = PlotsStore::new(backend);
    let corners = [GeoPoint::new(1.0, 2.0); 4];

    tokio::join!(store.hydrate(), async {
        store.set_plots_from_coordinates(&corners);
    });

    assert!(store.plots().iter().all(|p| p.position() == GeoPoint::new(1.0, 2.0)));
}

#[tokio::test(start_paused = true)]
async fn concurrent_hydrate_calls_share_one_read() {
    let backend = Arc::new(
        slow_backend().with_blob(PAIRING_KEY, r#"{"pairedDevices":["A"],"activeDevice":"A"}"#),
    );
    let store = Arc::new(PairingStore::new(backend.clone()));

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.hydrate().await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }
    store.hydrate().await;

    assert_eq!(backend.read_count(), 1);
    assert_eq!(store.active_device().as_deref(), Some("A"));
}

#[tokio::test]
async fn hydration_notifies_observers() {
    let backend =
        Arc::new(MemoryBackingStore::new().with_blob("soaris-flight-mode-v1.txt", "Manual"));
    let store = SessionStore::new(backend);
    let hits = Arc::new(AtomicUsize::new(0));
    let _sub = {
        let hits = hits.clone();
        store.subscribe(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    };

    store.hydrate().await;
    store.hydrate().await;

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(store.is_manual());
}

#[tokio::test]
async fn read_failure_falls_back_to_defaults() {
    let backend = Arc::new(MemoryBackingStore::new().with_blob(
        PAIRING_KEY,
        r#"{"pairedDevices":["A"],"activeDevice":null}"#,
    ));
    backend.set_fail_reads(true);
    let pairing = PairingStore::new(backend.clone());
    let plots = PlotsStore::new(backend.clone());

    pairing.hydrate().await;
    plots.hydrate().await;

    assert!(pairing.paired_devices().is_empty());
    assert_eq!(*plots.snapshot(), PlotsState::seed());
}

#[tokio::test]
async fn write_failure_never_rolls_back() {
    let backend = Arc::new(MemoryBackingStore::new());
    backend.set_fail_writes(true);
    let pairing = PairingStore::new(backend.clone());
    pairing.hydrate().await;

    pairing.add_paired_device("Drone A");
    pairing.set_active_device("Drone A");
    pairing.flush().await;

    assert_eq!(pairing.active_device().as_deref(), Some("Drone A"));
    assert!(backend.write_count() >= 1);
    assert_eq!(backend.get(PAIRING_KEY), None);
}

#[tokio::test]
async fn unsubscribed_observer_is_not_called() {
    let plots = PlotsStore::new(Arc::new(MemoryBackingStore::new()));
    let hits = Arc::new(AtomicUsize::new(0));
    let sub = {
        let hits = hits.clone();
        plots.subscribe(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    };

    plots.set_selected_plot(Some("plot2"));
    sub.unsubscribe();
    plots.set_selected_plot(Some("plot3"));

    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
