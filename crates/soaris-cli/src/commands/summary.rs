use soaris_state::{Alert, FieldSummary, Recommendation};

use crate::app::App;

pub fn summary(app: &App) -> anyhow::Result<()> {
    let plots = app.plots.plots();

    if let Some(summary) = FieldSummary::from_plots(&plots) {
        println!("Plots:        {}", summary.plot_count);
        println!("Moisture:     {:.1}% avg", summary.avg_moisture);
        println!("pH:           {:.1} avg", summary.avg_ph);
        println!("Temperature:  {:.1}°C avg", summary.avg_temperature);
        println!("Driest:       {} ({})", summary.driest.title, summary.driest.moisture);
        println!("Hottest:      {} ({})", summary.hottest.title, summary.hottest.temperature);
        println!();
    }

    println!("Recommendation:");
    println!("  {}", Recommendation::for_plots(&plots).text);
    println!();
    println!("Alerts:");
    for alert in Alert::for_plots(&plots) {
        println!("  [{}] {}", alert.level, alert.message);
    }
    Ok(())
}
