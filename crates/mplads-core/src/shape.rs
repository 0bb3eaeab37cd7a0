//! Result shaping: typed extraction of pipeline output, pagination metadata
//! and derived ratios

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::paging::Page;
use crate::pipeline::eval::round_to;
use crate::pipeline::value::to_double;

pub fn round2(n: f64) -> f64 {
    round_to(n, 2)
}

/// `part` as a percentage of `whole`, rounded; 0 when `whole` is not positive
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        round2(part / whole * 100.0)
    } else {
        0.0
    }
}

/// Deserialize one document. Null fields read as absent, so they take the
/// row type's defaults.
pub fn row<T: DeserializeOwned>(mut doc: Value) -> Result<T> {
    if let Value::Object(map) = &mut doc {
        map.retain(|_, v| !v.is_null());
    }
    Ok(serde_json::from_value(doc)?)
}

/// Deserialize every document
pub fn rows<T: DeserializeOwned>(docs: Vec<Value>) -> Result<Vec<T>> {
    docs.into_iter().map(row).collect()
}

/// The first document, or the zeroed default when the pipeline produced none
pub fn single_or_default<T: DeserializeOwned + Default>(docs: Vec<Value>) -> Result<T> {
    match docs.into_iter().next() {
        Some(doc) => row(doc),
        None => Ok(T::default()),
    }
}

/// Value of a `$count` stage; 0 when nothing was counted
pub fn count_total(docs: &[Value], name: &str) -> u64 {
    docs.first()
        .and_then(|doc| to_double(&doc[name]))
        .map(|n| n.max(0.0) as u64)
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(page: &Page, total: u64) -> Self {
        let total_pages = total.div_ceil(page.limit);
        Self {
            page: page.page,
            limit: page.limit,
            total,
            total_pages,
            has_next: page.page < total_pages,
            has_prev: page.page > 1,
        }
    }
}

/// Paginated list response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T, S, F> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
    pub summary: S,
    pub filters: F,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}
