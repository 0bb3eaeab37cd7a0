//! MPLADS CLI - fund utilization analytics
//!
//! Usage:
//!   mplads init                                   Initialize database
//!   mplads import --collection mps --file F       Import a collection export
//!   mplads trends --house "Lok Sabha" --term 17   Utilization trends
//!   mplads expenditures --search road --page 2    Paginated expenditure list

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;
use commands::View;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = cli.config.as_deref();
    let (view, filters) = match cli.command {
        Commands::Init => return commands::cmd_init(&cli.db),
        Commands::Import { collection, file } => {
            return commands::cmd_import(&cli.db, &collection, &file)
        }
        Commands::Status => return commands::cmd_status(&cli.db, config),
        Commands::Trends { filters } => (View::Trends, filters),
        Commands::TopPerformers { filters } => (View::TopPerformers, filters),
        Commands::Distribution { filters } => (View::Distribution, filters),
        Commands::Expenditures { filters } => (View::Expenditures, filters),
        Commands::Categories { filters } => (View::Categories, filters),
        Commands::Filters { filters } => (View::Filters, filters),
        Commands::Works { filters } => (View::Works, filters),
    };

    commands::cmd_view(&cli.db, config, view, &filters.into()).await
}
