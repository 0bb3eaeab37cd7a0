//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Write;

use clap::Parser;
use mplads_core::test_utils::{analytics, seed_database, seeded_store};
use mplads_core::{Collection, Database, FilterParams};
use tempfile::TempDir;

use crate::cli::{Cli, Commands, FilterArgs};
use crate::commands::{self, run_view, View};

fn temp_db() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mplads.db");
    (dir, path)
}

fn write_config(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("analytics.toml");
    std::fs::write(&path, "default_term = \"both\"\n[pagination]\ndefault_limit = 2\n").unwrap();
    path
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_view_filters() {
    let cli = Cli::try_parse_from([
        "mplads",
        "expenditures",
        "--house",
        "Lok Sabha",
        "--term",
        "both",
        "--sort",
        "-amount",
        "--min-amount",
        "1,000",
    ])
    .unwrap();

    match cli.command {
        Commands::Expenditures { filters } => {
            let params: FilterParams = filters.into();
            assert_eq!(params.house.as_deref(), Some("Lok Sabha"));
            assert_eq!(params.term.as_deref(), Some("both"));
            assert_eq!(params.sort.as_deref(), Some("-amount"));
            assert_eq!(params.min_amount.as_deref(), Some("1,000"));
            assert!(params.page.is_none());
        }
        _ => panic!("expected expenditures command"),
    }
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["mplads", "status", "--db", "other.db", "-v"]).unwrap();
    assert_eq!(cli.db.to_str(), Some("other.db"));
    assert!(cli.verbose);
    assert!(cli.config.is_none());
}

#[test]
fn test_filter_args_default_is_empty_params() {
    let params: FilterParams = FilterArgs::default().into();
    assert_eq!(params, FilterParams::default());
}

// ========== Database Command Tests ==========

#[test]
fn test_cmd_init_creates_database() {
    let (_dir, path) = temp_db();
    commands::cmd_init(&path).unwrap();
    assert!(path.exists());
}

#[test]
fn test_cmd_import_json() {
    let (dir, path) = temp_db();
    let file = dir.path().join("mps.json");
    std::fs::write(
        &file,
        r#"[{"_id": "m1", "name": "A", "house": "Lok Sabha"}, {"_id": "m2", "name": "B"}]"#,
    )
    .unwrap();

    commands::cmd_import(&path, "mps", &file).unwrap();
    // Re-importing the same export adds nothing
    commands::cmd_import(&path, "mps", &file).unwrap();

    let db = commands::open_db(&path).unwrap();
    assert_eq!(db.count_documents(Collection::Members).unwrap(), 2);
}

#[test]
fn test_cmd_import_unknown_collection() {
    let (dir, path) = temp_db();
    let file = dir.path().join("x.json");
    std::fs::write(&file, "[]").unwrap();

    let err = commands::cmd_import(&path, "budgets", &file).unwrap_err();
    assert!(err.to_string().contains("Unknown collection"));
}

#[test]
fn test_cmd_import_missing_file() {
    let (dir, path) = temp_db();
    let result = commands::cmd_import(&path, "expenditures", &dir.path().join("none.csv"));
    assert!(result.is_err());
}

#[test]
fn test_cmd_status() {
    let (dir, path) = temp_db();
    let config = write_config(&dir);
    assert!(commands::cmd_status(&path, Some(&config)).is_ok());

    commands::cmd_init(&path).unwrap();
    assert!(commands::cmd_status(&path, Some(&config)).is_ok());
}

#[test]
fn test_cmd_status_rejects_bad_config() {
    let (dir, path) = temp_db();
    let config = dir.path().join("bad.toml");
    let mut file = std::fs::File::create(&config).unwrap();
    writeln!(file, "default_term = 16").unwrap();

    assert!(commands::cmd_status(&path, Some(&config)).is_err());
}

// ========== View Command Tests ==========

#[tokio::test]
async fn test_run_every_view() {
    let analytics = analytics(seeded_store());
    let params = FilterParams::from_pairs(&[("term", "both")]);

    let views = [
        (View::Trends, "summary"),
        (View::TopPerformers, "stateLeaders"),
        (View::Distribution, "buckets"),
        (View::Expenditures, "pagination"),
        (View::Categories, "data"),
        (View::Filters, "states"),
        (View::Works, "pagination"),
    ];
    for (view, key) in views {
        let value = run_view(&analytics, view, &params).await.unwrap();
        assert!(value.get(key).is_some(), "{} missing {}", view.as_str(), key);
        assert!(value.get("generatedAt").is_some());
    }
}

#[tokio::test]
async fn test_expenditures_json_shape() {
    let analytics = analytics(seeded_store());
    let params = FilterParams::from_pairs(&[("term", "both"), ("limit", "3")]);
    let value = run_view(&analytics, View::Expenditures, &params).await.unwrap();

    assert_eq!(value["data"].as_array().unwrap().len(), 3);
    assert_eq!(value["pagination"]["total"], 7);
    assert_eq!(value["pagination"]["totalPages"], 3);
    assert_eq!(value["filters"]["term"], "both");
    assert_eq!(value["filters"]["sort"], "-date");
}

#[tokio::test]
async fn test_cmd_view_against_database() {
    let (dir, path) = temp_db();
    let config = write_config(&dir);
    {
        let db = Database::new(path.to_str().unwrap()).unwrap();
        seed_database(&db).unwrap();
    }

    let params = FilterParams::default();
    commands::cmd_view(&path, Some(&config), View::Expenditures, &params)
        .await
        .unwrap();
    commands::cmd_view(&path, Some(&config), View::Filters, &params)
        .await
        .unwrap();
}
