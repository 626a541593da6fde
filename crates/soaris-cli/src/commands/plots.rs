use soaris_state::GeoPoint;

use crate::app::App;

pub fn show(app: &App) -> anyhow::Result<()> {
    let state = app.plots.snapshot();
    for plot in &state.plots {
        let marker = if state.selected_plot_id.as_deref() == Some(plot.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {:<10} {:<8} ({:.6}, {:.6})  moisture {:<5} pH {:<4} temp {}",
            plot.id,
            plot.title,
            plot.latitude,
            plot.longitude,
            plot.moisture,
            plot.ph,
            plot.temperature,
        );
    }
    if state.plots.is_empty() {
        println!("No plots.");
    }
    Ok(())
}

pub fn select(app: &App, id: &str) -> anyhow::Result<()> {
    if app.plots.snapshot().plot(id).is_none() {
        anyhow::bail!("no plot with id {id:?}");
    }
    app.plots.set_selected_plot(Some(id));
    println!("✓ Selected {id}");
    Ok(())
}

pub fn map(app: &App, points: &[GeoPoint]) -> anyhow::Result<()> {
    app.plots.set_plots_from_coordinates(points);
    let plots = app.plots.plots();
    println!("✓ Mapped {} plots from {} points", plots.len(), points.len());
    for plot in &plots {
        println!("  {}  ({:.6}, {:.6})", plot.id, plot.latitude, plot.longitude);
    }
    Ok(())
}
