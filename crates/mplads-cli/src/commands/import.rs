//! Collection import command

use std::path::Path;

use anyhow::{Context, Result};
use mplads_core::{import, Collection};

use super::open_db;

pub fn cmd_import(db_path: &Path, collection: &str, file: &Path) -> Result<()> {
    let collection: Collection = collection.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    println!("📥 Importing {} from {}...", collection, file.display());

    let db = open_db(db_path)?;
    let stats = import::import_file(&db, collection, file)
        .with_context(|| format!("Failed to import {}", file.display()))?;

    println!("   Imported: {}", stats.inserted);
    if stats.duplicates > 0 {
        println!("   Skipped (duplicates): {}", stats.duplicates);
    }
    println!(
        "✅ {} now holds {} documents",
        collection,
        db.count_documents(collection)?
    );

    Ok(())
}
