//! Status command implementation

use std::fs;
use std::path::Path;

use anyhow::Result;
use mplads_core::config::default_config_path;

use super::{load_config, open_db};

pub fn cmd_status(db_path: &Path, config_path: Option<&Path>) -> Result<()> {
    println!();
    println!("📊 MPLADS Status");
    println!("   ─────────────────────────────────────────────────────────────");

    println!("   Database: {}", db_path.display());
    if db_path.exists() {
        if let Ok(metadata) = fs::metadata(db_path) {
            let size_kb = metadata.len() as f64 / 1024.0;
            if size_kb < 1024.0 {
                println!("   Size: {:.1} KB", size_kb);
            } else {
                println!("   Size: {:.1} MB", size_kb / 1024.0);
            }
        }

        let counts = open_db(db_path).and_then(|db| {
            db.collection_counts()
                .map_err(|e| anyhow::anyhow!("Failed to count documents: {}", e))
        });
        match counts {
            Ok(counts) => {
                println!();
                for (collection, count) in counts {
                    println!("   {:<20} {}", collection.as_str(), count);
                }
            }
            Err(e) => {
                println!();
                println!("   ❌ Error reading database: {}", e);
            }
        }
    } else {
        println!("   Size: (database not initialized)");
    }

    println!();
    let source = match (config_path, default_config_path()) {
        (Some(path), _) => path.display().to_string(),
        (None, Some(path)) if path.exists() => path.display().to_string(),
        _ => "(built-in)".to_string(),
    };
    println!("   Config: {}", source);
    let config = load_config(config_path)?;
    println!("   Default term: {}", config.default_term);
    println!(
        "   Page size: {} (max {})",
        config.pagination.default_limit, config.pagination.max_limit
    );
    println!(
        "   Top performers: {} (max {})",
        config.ranking.default_top_n, config.ranking.max_top_n
    );
    println!();

    Ok(())
}
