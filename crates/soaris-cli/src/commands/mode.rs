use crate::app::App;

pub fn show(app: &App) -> anyhow::Result<()> {
    println!("{}", app.session.current_mode());
    Ok(())
}

pub fn set(app: &App, mode: &str) -> anyhow::Result<()> {
    if app.session.set_mode_str(mode) {
        println!("✓ Flight mode: {}", app.session.current_mode());
    } else {
        eprintln!(
            "Ignored unknown flight mode {mode:?}; still {}",
            app.session.current_mode()
        );
    }
    Ok(())
}
