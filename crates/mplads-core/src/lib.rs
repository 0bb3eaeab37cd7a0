//! MPLADS Core Library
//!
//! Query and normalization engine for MPLADS fund analytics:
//! - House/term gate applied to every collection
//! - Field normalization across current and legacy record layouts
//! - Aggregation pipelines and an in-process evaluator
//! - Analytics views (trends, performers, distribution, lists, rollups)
//! - Pagination, sorting and result shaping
//! - SQLite document store and collection import

pub mod config;
pub mod db;
pub mod error;
pub mod gate;
pub mod import;
pub mod models;
pub mod normalize;
pub mod paging;
pub mod pipeline;
pub mod sanitize;
pub mod shape;
pub mod store;
pub mod views;

/// Test utilities: document fixtures and a seeded in-memory store
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::AnalyticsConfig;
pub use db::{Database, InsertStats};
pub use error::{Error, Result};
pub use gate::Scope;
pub use models::{Collection, FilterParams, Granularity, House, Metric, TermSelection, WorkKind};
pub use pipeline::Pipeline;
pub use shape::{Envelope, PaginationMeta};
pub use store::{MemoryStore, RecordStore};
pub use views::{Analytics, ExpenditureList, RecordFilters, WorkFilters, WorkList};
