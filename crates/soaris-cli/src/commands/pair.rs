use soaris_state::PairMethod;

use crate::app::App;

pub fn list(app: &App) -> anyhow::Result<()> {
    let state = app.pairing.snapshot();
    if state.paired_devices.is_empty() {
        println!("No paired devices.");
        return Ok(());
    }
    for (index, label) in state.paired_devices.iter().enumerate() {
        let marker = if state.active_device.as_deref() == Some(label.as_str()) {
            "*"
        } else {
            " "
        };
        println!("{marker} {index}  {label}");
    }
    Ok(())
}

pub fn add(app: &App, label: &str) -> anyhow::Result<()> {
    let label = label.trim();
    if label.is_empty() {
        anyhow::bail!("device label must not be empty");
    }
    app.pairing.add_paired_device(label);
    app.pairing.set_active_device(label);
    println!("✓ Paired {label} (active)");
    Ok(())
}

pub fn via(app: &App, method: PairMethod) -> anyhow::Result<()> {
    let label = app.pairing.pair_via(method);
    app.pairing.set_active_device(&label);
    println!("✓ Paired {label} (active)");
    Ok(())
}

pub fn remove(app: &App, index: usize) -> anyhow::Result<()> {
    let Some(label) = app.pairing.paired_devices().get(index).cloned() else {
        anyhow::bail!("no paired device at index {index}");
    };
    app.pairing.remove_paired_device_by_index(index);
    println!("✓ Unpaired {label}");
    match app.pairing.active_device() {
        Some(active) => println!("  Active: {active}"),
        None => println!("  Active: none"),
    }
    Ok(())
}

pub fn activate(app: &App, label: &str) -> anyhow::Result<()> {
    if !app.pairing.paired_devices().iter().any(|d| d == label) {
        anyhow::bail!("{label} is not paired");
    }
    app.pairing.set_active_device(label);
    println!("✓ Active: {label}");
    Ok(())
}

pub fn clear(app: &App) -> anyhow::Result<()> {
    app.pairing.clear_session();
    println!("✓ Cleared pairing session");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use soaris_storage::MemoryBackingStore;

    use super::*;

    fn app() -> App {
        App::with_backend(Arc::new(MemoryBackingStore::new()))
    }

    #[tokio::test]
    async fn test_add_activates_new_device() {
        let app = app();
        add(&app, "  Drone A ").unwrap();
        add(&app, "Drone B").unwrap();

        assert_eq!(app.pairing.paired_devices(), ["Drone A", "Drone B"]);
        assert_eq!(app.pairing.active_device().as_deref(), Some("Drone B"));
    }

    #[tokio::test]
    async fn test_add_rejects_blank_label() {
        let app = app();
        assert!(add(&app, "   ").is_err());
        assert!(app.pairing.paired_devices().is_empty());
    }

    #[tokio::test]
    async fn test_via_activates_generated_label() {
        let app = app();
        via(&app, PairMethod::WiFi).unwrap();
        via(&app, PairMethod::QrCode).unwrap();

        assert_eq!(
            app.pairing.active_device().as_deref(),
            Some("Drone (QR Code) 2")
        );
    }

    #[tokio::test]
    async fn test_remove_and_activate_validate_input() {
        let app = app();
        add(&app, "Drone A").unwrap();
        add(&app, "Drone B").unwrap();

        assert!(activate(&app, "Drone Z").is_err());
        activate(&app, "Drone A").unwrap();
        assert_eq!(app.pairing.active_device().as_deref(), Some("Drone A"));

        assert!(remove(&app, 5).is_err());
        remove(&app, 0).unwrap();
        assert_eq!(app.pairing.paired_devices(), ["Drone B"]);
        assert_eq!(app.pairing.active_device(), None);

        clear(&app).unwrap();
        assert!(app.pairing.paired_devices().is_empty());
    }
}
