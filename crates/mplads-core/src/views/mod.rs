//! Analytics views over the record collections
//!
//! Each view resolves raw [`FilterParams`], composes pipelines from the
//! shared building blocks here, dispatches the independent pipelines
//! concurrently and shapes the results:
//! - `trends` - utilization trends by year or month
//! - `performers` - top performers, population averages, state leaders
//! - `distribution` - utilization buckets and house comparison
//! - `expenditures` - paginated expenditure list
//! - `categories` - category rollup with per-year breakdown
//! - `filters` - filter option lists
//! - `works` - paginated completed/recommended works
//!
//! Every view scopes its collections through the same [`Scope`] gate.

use std::time::Instant;

use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};
use tracing::debug;

use crate::config::AnalyticsConfig;
use crate::error::Result;
use crate::gate::Scope;
use crate::models::{Collection, FilterParams, RecordFilterEcho};
use crate::normalize::{fields, FieldMap};
use crate::paging::{Page, SortSpec};
use crate::pipeline::{Accumulator, Expr, Filter, Pipeline, Stage};
use crate::sanitize;
use crate::store::RecordStore;

mod categories;
mod distribution;
mod expenditures;
mod filters;
mod performers;
mod trends;
mod works;

pub use distribution::{OVERFLOW_BUCKET, UTILIZATION_BOUNDARIES};
pub use expenditures::{ExpenditureList, EXPENDITURE_SORTS};
pub use works::{WorkFilters, WorkList, WORK_SORTS};

/// Name of the `$count` output shared by list views
pub(crate) const TOTAL: &str = "total";

/// Joined member document, after the lookup
const MEMBER: &str = "member";

/// Text fields a `search` filter looks in. Shared by every record view so
/// a list and its rollup select the same records.
pub(crate) const SEARCH_FIELDS: &[&str] =
    &[fields::DESCRIPTION, fields::CATEGORY, "vendor", "mpName"];

/// Member fields copied into joined record rows
const MEMBER_FIELDS: &[(&str, &str)] = &[
    ("mpName", "member.name"),
    ("constituency", "member.constituency"),
    ("party", "member.party"),
];

/// Entry point for every view
pub struct Analytics<S> {
    store: S,
    config: AnalyticsConfig,
    today: NaiveDate,
}

impl<S: RecordStore> Analytics<S> {
    pub fn new(store: S, config: AnalyticsConfig) -> Self {
        Self {
            store,
            config,
            today: Utc::now().date_naive(),
        }
    }

    /// Fix the reference date for trailing windows (monthly trends)
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub(crate) fn scope(&self, params: &FilterParams) -> Scope {
        Scope::resolve(params, &self.config)
    }

    async fn run(&self, collection: Collection, pipeline: &Pipeline) -> Result<Vec<Value>> {
        debug!(
            collection = %collection,
            pipeline = %pipeline.to_document(),
            "Running pipeline"
        );
        let start = Instant::now();
        let out = self.store.aggregate(collection, pipeline).await?;
        debug!(
            collection = %collection,
            rows = out.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Pipeline complete"
        );
        Ok(out)
    }
}

/// Record-level filters shared by the list and rollup views
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilters {
    pub mp_id: Option<String>,
    pub year: Option<i32>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub category: Option<String>,
    pub search: Option<String>,
}

impl RecordFilters {
    /// Resolve from raw params. Reversed year or amount bounds are swapped.
    pub fn resolve(params: &FilterParams) -> Self {
        let (start_year, end_year) = ordered(
            sanitize::parse_year(params.start_year.as_deref()),
            sanitize::parse_year(params.end_year.as_deref()),
        );
        let (min_amount, max_amount) = ordered(
            sanitize::parse_non_negative(params.min_amount.as_deref()),
            sanitize::parse_non_negative(params.max_amount.as_deref()),
        );
        Self {
            mp_id: sanitize::clean_text(params.mp_id.as_deref()),
            year: sanitize::parse_year(params.year.as_deref()),
            start_year,
            end_year,
            min_amount,
            max_amount,
            category: sanitize::clean_text(params.category.as_deref()),
            search: sanitize::clean_text(params.search.as_deref()),
        }
    }

    /// Member filter on the raw `mpId`, matching text and `{"$oid"}` forms
    pub fn pre_filter(&self) -> Filter {
        match &self.mp_id {
            Some(id) => Filter::Or(vec![
                Filter::eq("mpId", id.as_str()),
                Filter::eq("mpId", json!({ "$oid": id })),
            ]),
            None => Filter::always(),
        }
    }

    /// Year, amount, category and search filters on normalized fields.
    /// Category matches the whole value ignoring case; search matches a
    /// substring of any [`SEARCH_FIELDS`] entry.
    pub fn post_filter(&self) -> Filter {
        let mut filters = Vec::new();
        match self.year {
            Some(year) => filters.push(Filter::eq(fields::YEAR, year)),
            None => filters.extend(year_range(self.start_year, self.end_year)),
        }
        if let Some(min) = self.min_amount {
            filters.push(Filter::gte(fields::AMOUNT, min));
        }
        if let Some(max) = self.max_amount {
            filters.push(Filter::lte(fields::AMOUNT, max));
        }
        if let Some(category) = &self.category {
            filters.push(Filter::regex_ci(
                fields::CATEGORY,
                format!("^{}$", sanitize::escape_pattern(category)),
            ));
        }
        if let Some(search) = &self.search {
            let pattern = sanitize::escape_pattern(search);
            filters.push(Filter::Or(
                SEARCH_FIELDS
                    .iter()
                    .map(|field| Filter::regex_ci(*field, pattern.clone()))
                    .collect(),
            ));
        }
        Filter::all(filters)
    }

    pub fn echo(&self, scope: &Scope, sort: Option<&SortSpec>) -> RecordFilterEcho {
        RecordFilterEcho {
            house: scope.house,
            term: scope.applicable_term(),
            state: scope.state.clone(),
            mp_id: self.mp_id.clone(),
            year: self.year,
            start_year: self.start_year,
            end_year: self.end_year,
            min_amount: self.min_amount,
            max_amount: self.max_amount,
            category: self.category.clone(),
            search: self.search.clone(),
            sort: sort.map(SortSpec::label),
        }
    }
}

fn ordered<T: PartialOrd>(low: Option<T>, high: Option<T>) -> (Option<T>, Option<T>) {
    match (low, high) {
        (Some(l), Some(h)) if l > h => (Some(h), Some(l)),
        other => other,
    }
}

/// Inclusive bounds on the normalized year
pub(crate) fn year_range(start: Option<i32>, end: Option<i32>) -> Vec<Filter> {
    let mut filters = Vec::new();
    if let Some(start) = start {
        filters.push(Filter::gte(fields::YEAR, start));
    }
    if let Some(end) = end {
        filters.push(Filter::lte(fields::YEAR, end));
    }
    filters
}

/// Common prefix of every record pipeline: scope and member match on raw
/// fields, optional member join, normalizing projection, then filters on
/// the normalized fields
pub(crate) fn record_prefix(map: &FieldMap, pre: Filter, join_members: bool, post: Filter) -> Pipeline {
    let mut projection = map.projection();
    let mut pipeline = Pipeline::new().filter(pre);

    if join_members {
        pipeline = pipeline
            .stage(Stage::Lookup {
                from: Collection::Members,
                local_field: "mpId".to_string(),
                foreign_field: "_id".to_string(),
                as_field: MEMBER.to_string(),
            })
            .stage(Stage::AddFields(vec![(
                MEMBER.to_string(),
                Expr::field(MEMBER).first(),
            )]));
        projection.extend(
            MEMBER_FIELDS
                .iter()
                .map(|(name, source)| (name.to_string(), Expr::field(*source).to_text())),
        );
    }

    pipeline.stage(Stage::Project(projection)).filter(post)
}

/// Data page, total count and summary of one list request; all three share
/// the same filter prefix
pub(crate) struct ListPipelines {
    pub data: Pipeline,
    pub count: Pipeline,
    pub summary: Pipeline,
}

impl ListPipelines {
    pub fn compose(
        prefix: Pipeline,
        sort: &SortSpec,
        page: &Page,
        row: Vec<(String, Expr)>,
        summary: Vec<(String, Accumulator)>,
        summary_fields: Vec<(String, Expr)>,
    ) -> Self {
        let [skip, limit] = page.stages();
        Self {
            data: prefix
                .clone()
                .stage(sort.stage())
                .stage(skip)
                .stage(limit)
                .stage(Stage::Project(row)),
            count: prefix.clone().stage(Stage::Count(TOTAL.to_string())),
            summary: prefix
                .stage(Stage::Group {
                    key: Vec::new(),
                    accumulators: summary,
                })
                .stage(Stage::Project(summary_fields)),
        }
    }
}

/// Named pipeline field helper
pub(crate) fn named(name: &str, expr: Expr) -> (String, Expr) {
    (name.to_string(), expr)
}

pub(crate) fn acc(name: &str, accumulator: Accumulator) -> (String, Accumulator) {
    (name.to_string(), accumulator)
}
