//! SQLite document store with connection pooling and migrations
//!
//! Every collection lives in one `documents` table as JSON text, keyed by
//! collection name. Pipelines are evaluated in process after loading the
//! collection (and any `$lookup` targets) on a blocking thread.
//!
//! - `documents` - insert with content-hash dedupe, load, count, clear

use std::sync::Arc;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tempfile::TempDir;
use tracing::debug;

use crate::error::{Error, Result};

mod documents;

pub use documents::InsertStats;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
    /// Owning directory of a throwaway database; removed with the last clone
    scratch: Option<Arc<TempDir>>,
}

impl Database {
    /// Open (or create) the database at `path` and run migrations
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
            scratch: None,
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Uses a file in a fresh temporary directory rather than `:memory:` so
    /// every pooled connection sees the same data. The directory is deleted
    /// when the last clone of the handle is dropped.
    pub fn in_memory() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("mplads_test_").tempdir()?;
        let path = dir.path().join("mplads.db");
        let path = path
            .to_str()
            .ok_or_else(|| Error::InvalidData(format!("non UTF-8 temp path {}", path.display())))?
            .to_string();

        let mut db = Self::new(&path)?;
        db.scratch = Some(Arc::new(dir));
        Ok(db)
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL mode: readers don't block the importer
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            -- One row per document; body is the document as JSON text
            CREATE TABLE IF NOT EXISTS documents (
                id INTEGER PRIMARY KEY,
                collection TEXT NOT NULL,
                body TEXT NOT NULL,
                import_hash TEXT NOT NULL UNIQUE,
                imported_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection);
            "#,
        )?;

        debug!(path = %self.db_path, "Database migrations complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_in_memory_files_removed_on_drop() {
        let db = Database::in_memory().unwrap();
        let path = PathBuf::from(db.path());
        assert!(path.exists());

        let clone = db.clone();
        drop(db);
        assert!(path.exists());

        drop(clone);
        assert!(!path.exists());
    }

    #[test]
    fn test_in_memory_databases_are_isolated() {
        let a = Database::in_memory().unwrap();
        let b = Database::in_memory().unwrap();
        assert_ne!(a.path(), b.path());
    }
}
