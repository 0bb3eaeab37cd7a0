//! Analytics view commands
//!
//! Every view reads raw filter parameters and prints its shaped result as
//! pretty JSON on stdout.

use std::path::Path;

use anyhow::{Context, Result};
use mplads_core::{Analytics, FilterParams, RecordStore};
use serde_json::Value;

use super::{load_config, open_db};

/// Views available from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Trends,
    TopPerformers,
    Distribution,
    Expenditures,
    Categories,
    Filters,
    Works,
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trends => "trends",
            Self::TopPerformers => "top-performers",
            Self::Distribution => "distribution",
            Self::Expenditures => "expenditures",
            Self::Categories => "categories",
            Self::Filters => "filters",
            Self::Works => "works",
        }
    }
}

/// Run one view and return its result as JSON
pub async fn run_view<S: RecordStore>(
    analytics: &Analytics<S>,
    view: View,
    params: &FilterParams,
) -> Result<Value> {
    let value = match view {
        View::Trends => serde_json::to_value(analytics.utilization_trends(params).await?)?,
        View::TopPerformers => serde_json::to_value(analytics.top_performers(params).await?)?,
        View::Distribution => {
            serde_json::to_value(analytics.performance_distribution(params).await?)?
        }
        View::Expenditures => serde_json::to_value(analytics.expenditure_list(params).await?)?,
        View::Categories => {
            serde_json::to_value(analytics.expenditure_categories(params).await?)?
        }
        View::Filters => serde_json::to_value(analytics.filter_options(params).await?)?,
        View::Works => serde_json::to_value(analytics.works_list(params).await?)?,
    };
    Ok(value)
}

pub async fn cmd_view(
    db_path: &Path,
    config_path: Option<&Path>,
    view: View,
    params: &FilterParams,
) -> Result<()> {
    let db = open_db(db_path)?;
    let analytics = Analytics::new(db, load_config(config_path)?);

    let value = run_view(&analytics, view, params)
        .await
        .with_context(|| format!("Failed to run {} view", view.as_str()))?;
    println!("{}", serde_json::to_string_pretty(&value)?);

    Ok(())
}
