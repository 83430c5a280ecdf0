mod commands;
mod progress;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "caltrace", about = "Calcium imaging trace extraction tool")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show recording metadata
    Info(commands::info::InfoArgs),
    /// Extract per-cell intensity traces from a recording
    Analyze(commands::analyze::AnalyzeArgs),
    /// Render traces from a results CSV as a chart
    Plot(commands::plot::PlotArgs),
    /// Re-export a cell subset from a results CSV
    Export(commands::export::ExportArgs),
    /// Print a default plot spec as TOML
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Analyze(args) => commands::analyze::run(args),
        Commands::Plot(args) => commands::plot::run(args),
        Commands::Export(args) => commands::export::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
