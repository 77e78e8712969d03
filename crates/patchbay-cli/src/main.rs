//! Patchbay CLI - inspect and exercise plugin pin-connector routing.

mod commands;
mod wav;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "patchbay")]
#[command(author, version, about = "Plugin pin-connector routing CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show (and optionally save) the default connections for channel counts
    Defaults(commands::defaults::DefaultsArgs),

    /// Render a preset's connection matrices as pin grids
    Inspect(commands::inspect::InspectArgs),

    /// List factory routing presets
    Presets(commands::presets::PresetsArgs),

    /// Route a WAV file through a preset and a gain plugin
    Route(commands::route::RouteArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Defaults(args) => commands::defaults::run(args),
        Commands::Inspect(args) => commands::inspect::run(args),
        Commands::Presets(args) => commands::presets::run(args),
        Commands::Route(args) => commands::route::run(args),
    }
}
