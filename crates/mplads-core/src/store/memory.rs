use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::RecordStore;
use crate::error::Result;
use crate::models::Collection;
use crate::pipeline::eval::{self, Lookups};
use crate::pipeline::Pipeline;

/// Immutable in-memory document store. Cloning shares the documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<HashMap<Collection, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add documents to a collection (builder style)
    pub fn with_documents(mut self, collection: Collection, docs: Vec<Value>) -> Self {
        Arc::make_mut(&mut self.collections)
            .entry(collection)
            .or_default()
            .extend(docs);
        self
    }

    pub fn documents(&self, collection: Collection) -> &[Value] {
        self.collections
            .get(&collection)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn aggregate(&self, collection: Collection, pipeline: &Pipeline) -> Result<Vec<Value>> {
        let lookups: Lookups = pipeline
            .lookups()
            .into_iter()
            .map(|from| (from, self.documents(from).to_vec()))
            .collect();
        eval::run(pipeline, self.documents(collection).to_vec(), &lookups)
    }
}
