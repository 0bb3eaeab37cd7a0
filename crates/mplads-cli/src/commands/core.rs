//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_config` - Shared utility to load the analytics config
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use mplads_core::{AnalyticsConfig, Database};

/// Open (and migrate) the document database
pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {}", db_path.display()))?;
    Database::new(path_str).context("Failed to open database")
}

pub fn load_config(config_path: Option<&Path>) -> Result<AnalyticsConfig> {
    AnalyticsConfig::load(config_path).context("Failed to load analytics config")
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    open_db(db_path)?;

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Import members:      mplads import --collection mps --file mps.json");
    println!("  2. Import summaries:    mplads import --collection mp_summaries --file summaries.json");
    println!("  3. Import expenditures: mplads import --collection expenditures --file expenditures.csv");
    println!("  4. Query:               mplads trends --term both");

    Ok(())
}
