//! Analytics configuration
//!
//! ## Configuration Resolution
//!
//! 1. An explicit path (e.g. `--config`), when given
//! 2. Override in the data dir (~/.local/share/mplads/config/analytics.toml)
//! 3. Embedded defaults (compiled into binary)
//!
//! Override files only need the keys they change.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::TermSelection;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../config/analytics.toml");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    pub default_limit: u64,
    pub max_limit: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingConfig {
    pub default_top_n: u64,
    pub max_top_n: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsConfig {
    /// Lok Sabha term used when a request names none
    pub default_term: TermSelection,
    pub pagination: PaginationConfig,
    pub ranking: RankingConfig,
    /// Categories kept by the category rollup
    pub category_top_n: u64,
    /// Calendar years covered by monthly trends, counting the current one
    pub monthly_window_years: u32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            default_term: TermSelection::Single(18),
            pagination: PaginationConfig {
                default_limit: 20,
                max_limit: 100,
            },
            ranking: RankingConfig {
                default_top_n: 10,
                max_top_n: 50,
            },
            category_top_n: 10,
            monthly_window_years: 2,
        }
    }
}

// TOML shape; every key optional so overrides can be partial
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    default_term: Option<TermSelection>,
    pagination: Option<RawPagination>,
    ranking: Option<RawRanking>,
    categories: Option<RawCategories>,
    trends: Option<RawTrends>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPagination {
    default_limit: Option<u64>,
    max_limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRanking {
    default_top_n: Option<u64>,
    max_top_n: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCategories {
    top_n: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTrends {
    monthly_window_years: Option<u32>,
}

impl AnalyticsConfig {
    /// Load configuration (explicit path, then data dir override, then embedded)
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Some(path) = default_config_path() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }
        debug!("Using embedded analytics config");
        Self::from_toml(DEFAULT_CONFIG)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&content)?;
        info!(path = %path.display(), "Loaded analytics config");
        Ok(config)
    }

    /// Parse a TOML document layered over the built-in defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)?;
        let mut config = Self::default();

        if let Some(term) = raw.default_term {
            config.default_term = term;
        }
        if let Some(pagination) = raw.pagination {
            if let Some(limit) = pagination.default_limit {
                config.pagination.default_limit = limit;
            }
            if let Some(max) = pagination.max_limit {
                config.pagination.max_limit = max;
            }
        }
        if let Some(ranking) = raw.ranking {
            if let Some(top_n) = ranking.default_top_n {
                config.ranking.default_top_n = top_n;
            }
            if let Some(max) = ranking.max_top_n {
                config.ranking.max_top_n = max;
            }
        }
        if let Some(top_n) = raw.categories.and_then(|c| c.top_n) {
            config.category_top_n = top_n;
        }
        if let Some(years) = raw.trends.and_then(|t| t.monthly_window_years) {
            config.monthly_window_years = years;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let pagination = &self.pagination;
        if pagination.max_limit == 0 {
            return Err(Error::Config("pagination.max_limit must be at least 1".into()));
        }
        if pagination.default_limit == 0 || pagination.default_limit > pagination.max_limit {
            return Err(Error::Config(format!(
                "pagination.default_limit must be between 1 and max_limit ({})",
                pagination.max_limit
            )));
        }
        let ranking = &self.ranking;
        if ranking.max_top_n == 0 {
            return Err(Error::Config("ranking.max_top_n must be at least 1".into()));
        }
        if ranking.default_top_n == 0 || ranking.default_top_n > ranking.max_top_n {
            return Err(Error::Config(format!(
                "ranking.default_top_n must be between 1 and max_top_n ({})",
                ranking.max_top_n
            )));
        }
        if self.category_top_n == 0 {
            return Err(Error::Config("categories.top_n must be at least 1".into()));
        }
        if self.monthly_window_years == 0 {
            return Err(Error::Config(
                "trends.monthly_window_years must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Default override location in the user's data dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("mplads").join("config").join("analytics.toml"))
}
