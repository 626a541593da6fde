//! soaris: operator front-end over the field session stores.
//!
//! # Usage
//!
//! ```text
//! soaris init --backend redb
//! soaris pair via wifi
//! soaris plots map 10.5424,123.9448 10.5428,123.9452
//! soaris summary
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use soaris_state::{GeoPoint, PairMethod};

mod app;
mod commands;
mod config;

use app::App;
use config::{BackendKind, SoarisConfig};

#[derive(Parser)]
#[command(
    name = "soaris",
    about = "Soaris — drone field survey session tool",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to soaris.toml.
    #[arg(short, long, global = true, default_value = "soaris.toml")]
    config: PathBuf,
    /// Override [storage].data_dir.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a scaffold soaris.toml.
    Init {
        /// Storage backend.
        #[arg(long, value_enum, default_value_t = BackendKind::Fs)]
        backend: BackendKind,
        /// Overwrite an existing config.
        #[arg(long)]
        force: bool,
    },
    /// Show or change the flight mode.
    Mode {
        #[command(subcommand)]
        action: ModeAction,
    },
    /// Manage paired drones.
    Pair {
        #[command(subcommand)]
        action: PairAction,
    },
    /// Inspect and generate field plots.
    Plots {
        #[command(subcommand)]
        action: PlotsAction,
    },
    /// Field averages, recommendation and alerts.
    Summary,
}

#[derive(Subcommand)]
enum ModeAction {
    /// Print the current flight mode.
    Show,
    /// Switch flight mode (Auto or Manual).
    Set { mode: String },
}

#[derive(Subcommand)]
enum PairAction {
    /// List paired devices; the active one is starred.
    List,
    /// Pair a device by label and make it active.
    Add { label: String },
    /// Pair through a connection method (wifi, device-id, qr) and make it active.
    Via { method: PairMethod },
    /// Unpair the device at a zero-based list index.
    Remove { index: usize },
    /// Make an already paired device active.
    Activate { label: String },
    /// Forget every paired device.
    Clear,
}

#[derive(Subcommand)]
enum PlotsAction {
    /// List plots and the current selection.
    Show,
    /// Select a plot by id.
    Select { id: String },
    /// Regenerate the plots from area coordinates (lat,lon).
    Map {
        #[arg(allow_hyphen_values = true)]
        points: Vec<GeoPoint>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = SoarisConfig::load_or_default(&cli.config)?;
    if let Some(data_dir) = cli.data_dir {
        config.storage.data_dir = data_dir;
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(&config.logging.filter))?,
        )
        .init();

    if let Commands::Init { backend, force } = &cli.command {
        return commands::init(&cli.config, &config.storage.data_dir, *backend, *force);
    }

    let app = App::open(&config.storage)?;
    app.hydrate().await;

    let result = match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Mode { action } => match action {
            ModeAction::Show => commands::mode::show(&app),
            ModeAction::Set { mode } => commands::mode::set(&app, &mode),
        },
        Commands::Pair { action } => match action {
            PairAction::List => commands::pair::list(&app),
            PairAction::Add { label } => commands::pair::add(&app, &label),
            PairAction::Via { method } => commands::pair::via(&app, method),
            PairAction::Remove { index } => commands::pair::remove(&app, index),
            PairAction::Activate { label } => commands::pair::activate(&app, &label),
            PairAction::Clear => commands::pair::clear(&app),
        },
        Commands::Plots { action } => match action {
            PlotsAction::Show => commands::plots::show(&app),
            PlotsAction::Select { id } => commands::plots::select(&app, &id),
            PlotsAction::Map { points } => commands::plots::map(&app, &points),
        },
        Commands::Summary => commands::summary::summary(&app),
    };

    app.flush().await;
    result
}
