//! Document operations and the SQLite `RecordStore`

use async_trait::async_trait;
use rusqlite::params;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::Database;
use crate::error::{Error, Result};
use crate::models::Collection;
use crate::pipeline::eval::{self, Lookups};
use crate::pipeline::value::canonical_key;
use crate::pipeline::Pipeline;
use crate::store::RecordStore;

/// Outcome of a bulk insert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InsertStats {
    pub inserted: usize,
    pub duplicates: usize,
}

/// Content hash of a document within a collection
fn document_hash(collection: Collection, doc: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(collection.as_str().as_bytes());
    hasher.update(canonical_key(doc).as_bytes());
    hex::encode(hasher.finalize())
}

impl Database {
    /// Insert documents into `collection`, skipping exact duplicates.
    ///
    /// Documents without an `_id` get one derived from their content hash,
    /// so re-importing the same file is idempotent.
    pub fn insert_documents(&self, collection: Collection, docs: &[Value]) -> Result<InsertStats> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut stats = InsertStats::default();

        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO documents (collection, body, import_hash) VALUES (?, ?, ?)",
            )?;
            for doc in docs {
                let Value::Object(map) = doc else {
                    warn!(collection = %collection, "Skipping non-object document");
                    continue;
                };
                let hash = document_hash(collection, doc);
                let mut map = map.clone();
                map.entry("_id")
                    .or_insert_with(|| Value::String(hash[..24].to_string()));
                let body = serde_json::to_string(&map)?;

                let changed = stmt.execute(params![collection.as_str(), body, hash])?;
                if changed == 0 {
                    stats.duplicates += 1;
                } else {
                    stats.inserted += 1;
                }
            }
        }

        tx.commit()?;
        debug!(
            collection = %collection,
            inserted = stats.inserted,
            duplicates = stats.duplicates,
            "Inserted documents"
        );
        Ok(stats)
    }

    /// Every document of a collection, in insertion order
    pub fn load_documents(&self, collection: Collection) -> Result<Vec<Value>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT body FROM documents WHERE collection = ? ORDER BY id")?;
        let bodies = stmt
            .query_map(params![collection.as_str()], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        bodies
            .iter()
            .map(|body| {
                serde_json::from_str(body).map_err(|e| {
                    Error::Store(format!("Corrupt document in {}: {}", collection, e))
                })
            })
            .collect()
    }

    pub fn count_documents(&self, collection: Collection) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?",
            params![collection.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Document count for every known collection (zero included)
    pub fn collection_counts(&self) -> Result<Vec<(Collection, i64)>> {
        Collection::all()
            .iter()
            .map(|c| Ok((*c, self.count_documents(*c)?)))
            .collect()
    }

    /// Delete every document of a collection, returning how many were removed
    pub fn clear_collection(&self, collection: Collection) -> Result<usize> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM documents WHERE collection = ?",
            params![collection.as_str()],
        )?;
        Ok(removed)
    }

    fn aggregate_blocking(&self, collection: Collection, pipeline: &Pipeline) -> Result<Vec<Value>> {
        let mut lookups = Lookups::new();
        for from in pipeline.lookups() {
            lookups.insert(from, self.load_documents(from)?);
        }
        let docs = self.load_documents(collection)?;
        eval::run(pipeline, docs, &lookups)
    }
}

#[async_trait]
impl RecordStore for Database {
    async fn aggregate(&self, collection: Collection, pipeline: &Pipeline) -> Result<Vec<Value>> {
        let db = self.clone();
        let pipeline = pipeline.clone();
        tokio::task::spawn_blocking(move || db.aggregate_blocking(collection, &pipeline))
            .await
            .map_err(|e| Error::Store(format!("Aggregation task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Filter, Stage};
    use serde_json::json;

    #[test]
    fn test_insert_dedupes_by_content() {
        let db = Database::in_memory().unwrap();
        let docs = vec![
            json!({ "mpId": "m1", "amount": 100 }),
            json!({ "mpId": "m1", "amount": 100 }),
            json!({ "mpId": "m2", "amount": 100 }),
        ];

        let stats = db.insert_documents(Collection::Expenditures, &docs).unwrap();
        assert_eq!(stats, InsertStats { inserted: 2, duplicates: 1 });

        let again = db.insert_documents(Collection::Expenditures, &docs).unwrap();
        assert_eq!(again, InsertStats { inserted: 0, duplicates: 3 });
        assert_eq!(db.count_documents(Collection::Expenditures).unwrap(), 2);
    }

    #[test]
    fn test_same_document_in_two_collections() {
        let db = Database::in_memory().unwrap();
        let doc = vec![json!({ "mpId": "m1" })];
        db.insert_documents(Collection::WorksCompleted, &doc).unwrap();
        let stats = db.insert_documents(Collection::WorksRecommended, &doc).unwrap();
        assert_eq!(stats.inserted, 1);
    }

    #[test]
    fn test_generated_id_and_existing_id() {
        let db = Database::in_memory().unwrap();
        db.insert_documents(
            Collection::Members,
            &[json!({ "name": "A" }), json!({ "_id": "m2", "name": "B" })],
        )
        .unwrap();

        let docs = db.load_documents(Collection::Members).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0]["_id"].as_str().unwrap().len(), 24);
        assert_eq!(docs[1]["_id"], "m2");
    }

    #[test]
    fn test_non_objects_are_skipped() {
        let db = Database::in_memory().unwrap();
        let stats = db
            .insert_documents(Collection::Members, &[json!(5), json!({ "name": "A" })])
            .unwrap();
        assert_eq!(stats.inserted, 1);
    }

    #[test]
    fn test_collection_counts_and_clear() {
        let db = Database::in_memory().unwrap();
        db.insert_documents(Collection::Members, &[json!({ "name": "A" })])
            .unwrap();

        let counts = db.collection_counts().unwrap();
        assert_eq!(counts.len(), Collection::all().len());
        assert!(counts.contains(&(Collection::Members, 1)));
        assert!(counts.contains(&(Collection::Expenditures, 0)));

        assert_eq!(db.clear_collection(Collection::Members).unwrap(), 1);
        assert_eq!(db.count_documents(Collection::Members).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_aggregate_through_store_trait() {
        let db = Database::in_memory().unwrap();
        db.insert_documents(
            Collection::MemberSummaries,
            &[
                json!({ "mpId": "a", "house": "Rajya Sabha" }),
                json!({ "mpId": "b", "house": "Lok Sabha", "lsTerm": 18 }),
            ],
        )
        .unwrap();

        let pipeline = Pipeline::new()
            .stage(Stage::Match(Filter::eq("house", "Lok Sabha")))
            .stage(Stage::Count("total".to_string()));
        let out = db
            .aggregate(Collection::MemberSummaries, &pipeline)
            .await
            .unwrap();
        assert_eq!(out, vec![json!({ "total": 1 })]);
    }
}
