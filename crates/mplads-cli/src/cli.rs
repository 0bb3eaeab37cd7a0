//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mplads_core::FilterParams;

/// MPLADS - Analytics over MP Local Area Development Scheme spending
#[derive(Parser)]
#[command(name = "mplads")]
#[command(about = "Query and normalization engine for MPLADS fund analytics", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "mplads.db", global = true)]
    pub db: PathBuf,

    /// Analytics config file (defaults to the data dir override, then built-in)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Import a collection export (.json, .jsonl or .csv)
    Import {
        /// Target collection: expenditures, works_completed, works_recommended,
        /// mp_summaries, mps
        #[arg(short, long)]
        collection: String,

        /// File to import
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show database and configuration status
    Status,

    /// Utilization trends by year or month
    Trends {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Members ranked by a metric
    TopPerformers {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Member counts per utilization bucket
    Distribution {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Paginated expenditure records
    Expenditures {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Expenditure totals per category
    Categories {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Available filter values
    Filters {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Paginated completed or recommended works
    Works {
        #[command(flatten)]
        filters: FilterArgs,
    },
}

/// Raw filter parameters, passed through unvalidated.
/// Each view uses the ones it understands.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// House: "Lok Sabha", "Rajya Sabha" or "both"
    #[arg(long)]
    pub house: Option<String>,

    /// Lok Sabha term: 17, 18 or "both"
    #[arg(long)]
    pub term: Option<String>,

    #[arg(long)]
    pub state: Option<String>,

    #[arg(long)]
    pub start_year: Option<String>,

    #[arg(long)]
    pub end_year: Option<String>,

    /// Exact year (list views)
    #[arg(long)]
    pub year: Option<String>,

    /// yearly or monthly
    #[arg(long)]
    pub granularity: Option<String>,

    /// utilization, total_expenditure or completed_works
    #[arg(long)]
    pub metric: Option<String>,

    #[arg(long)]
    pub top_n: Option<String>,

    #[arg(long)]
    pub page: Option<String>,

    #[arg(long)]
    pub limit: Option<String>,

    /// Sort key, "-key" or "key:desc" for descending
    #[arg(long, allow_hyphen_values = true)]
    pub sort: Option<String>,

    #[arg(long)]
    pub mp_id: Option<String>,

    #[arg(long)]
    pub min_amount: Option<String>,

    #[arg(long)]
    pub max_amount: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    /// Case-insensitive text search
    #[arg(long)]
    pub search: Option<String>,

    /// Works kind: completed or recommended
    #[arg(long)]
    pub kind: Option<String>,
}

impl From<FilterArgs> for FilterParams {
    fn from(args: FilterArgs) -> Self {
        FilterParams {
            start_year: args.start_year,
            end_year: args.end_year,
            state: args.state,
            house: args.house,
            term: args.term,
            granularity: args.granularity,
            top_n: args.top_n,
            metric: args.metric,
            page: args.page,
            limit: args.limit,
            sort: args.sort,
            mp_id: args.mp_id,
            year: args.year,
            min_amount: args.min_amount,
            max_amount: args.max_amount,
            category: args.category,
            search: args.search,
            kind: args.kind,
        }
    }
}
