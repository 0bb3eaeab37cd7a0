//! Pagination and sort resolution for list views

use serde::Serialize;
use tracing::debug;

use crate::config::PaginationConfig;
use crate::pipeline::{SortOrder, Stage};
use crate::sanitize;

/// Pages beyond this are clamped, keeping `skip` well within range
pub const MAX_PAGE: u64 = 1_000_000;

/// Resolved page window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub page: u64,
    pub limit: u64,
    pub skip: u64,
}

impl Page {
    /// Resolve raw page/limit. Missing or non-numeric values take defaults;
    /// out-of-range values are clamped.
    pub fn resolve(raw_page: Option<&str>, raw_limit: Option<&str>, config: &PaginationConfig) -> Self {
        let page = sanitize::parse_integer(raw_page)
            .unwrap_or(1)
            .clamp(1, MAX_PAGE as i64) as u64;
        let limit = sanitize::parse_integer(raw_limit)
            .unwrap_or(config.default_limit as i64)
            .clamp(1, config.max_limit as i64) as u64;
        Self {
            page,
            limit,
            skip: (page - 1) * limit,
        }
    }

    pub fn stages(&self) -> [Stage; 2] {
        [Stage::Skip(self.skip), Stage::Limit(self.limit)]
    }
}

/// Public sort key and the normalized field it sorts on
pub type SortAlias = (&'static str, &'static str);

/// Resolved sort: one whitelisted field plus a stable `_id` tie-break
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: &'static str,
    pub field: &'static str,
    pub order: SortOrder,
}

impl SortSpec {
    pub const fn new(key: &'static str, field: &'static str, order: SortOrder) -> Self {
        Self { key, field, order }
    }

    /// Resolve `field`, `-field` or `field:asc|desc` against `aliases`.
    /// Unknown fields fall back to `default`; the direction defaults to
    /// ascending.
    pub fn resolve(raw: Option<&str>, aliases: &[SortAlias], default: SortSpec) -> Self {
        let Some(text) = sanitize::clean_text(raw) else {
            return default;
        };

        let (name, order) = if let Some(rest) = text.strip_prefix('-') {
            (rest.to_string(), SortOrder::Desc)
        } else if let Some((name, direction)) = text.split_once(':') {
            let order = match direction.trim().to_lowercase().as_str() {
                "desc" | "descending" | "-1" => SortOrder::Desc,
                _ => SortOrder::Asc,
            };
            (name.to_string(), order)
        } else {
            (text.clone(), SortOrder::Asc)
        };

        let name = name.trim();
        match aliases.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)) {
            Some((key, field)) => Self::new(key, field, order),
            None => {
                debug!(sort = %text, "Unknown sort field, using default");
                default
            }
        }
    }

    /// Public form echoed back to clients, e.g. `-amount`
    pub fn label(&self) -> String {
        match self.order {
            SortOrder::Asc => self.key.to_string(),
            SortOrder::Desc => format!("-{}", self.key),
        }
    }

    pub fn stage(&self) -> Stage {
        Stage::Sort(vec![
            (self.field.to_string(), self.order),
            ("_id".to_string(), SortOrder::Asc),
        ])
    }
}
