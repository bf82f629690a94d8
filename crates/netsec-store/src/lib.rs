//! Netsec Store
//!
//! Read-only access to the raw network records a training run starts from:
//! - `DocumentSource`: the one call ingestion makes (`fetch_all`)
//! - `MongoSource`: a MongoDB collection
//! - `JsonlSource`: a JSON-lines export of a collection
//! - `MemorySource`: records held in memory

pub mod error;
pub mod jsonl;
pub mod mongo;

pub use error::{StoreError, StoreResult};
pub use jsonl::JsonlSource;
pub use mongo::{MongoSource, MongoSourceOptions};

/// One raw document: field name to JSON value, identifier field included.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// A read-only store of documents grouped by database and collection.
pub trait DocumentSource: Send + Sync {
    /// Short name used in logs (e.g. "mongodb").
    fn id(&self) -> &'static str;

    /// Returns every document of `database.collection`, in store order.
    fn fetch_all(&self, database: &str, collection: &str) -> StoreResult<Vec<Record>>;
}

/// In-memory source; database and collection names are ignored.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<Record>,
}

impl MemorySource {
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl DocumentSource for MemorySource {
    fn id(&self) -> &'static str {
        "memory"
    }

    fn fetch_all(&self, _database: &str, _collection: &str) -> StoreResult<Vec<Record>> {
        Ok(self.records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_returns_all_records() {
        let mut rec = Record::new();
        rec.insert("a".to_string(), serde_json::json!(1));
        let source = MemorySource::new(vec![rec.clone(), rec]);

        let out = source.fetch_all("db", "coll").unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(source.id(), "memory");
    }
}
