//! Record store abstraction
//!
//! Views only build pipelines; a `RecordStore` runs them against a named
//! collection. Two implementations ship with the crate:
//! - [`MemoryStore`] - documents held in memory (tests, embedding)
//! - [`crate::db::Database`] - SQLite-backed document store

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::models::Collection;
use crate::pipeline::Pipeline;

mod memory;

pub use memory::MemoryStore;

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Run `pipeline` over every document of `collection`. `$lookup` stages
    /// may read any other collection.
    async fn aggregate(&self, collection: Collection, pipeline: &Pipeline) -> Result<Vec<Value>>;
}
