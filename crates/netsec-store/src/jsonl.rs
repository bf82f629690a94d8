use crate::error::{StoreError, StoreResult};
use crate::{DocumentSource, Record};
use std::path::PathBuf;
use tracing::debug;

/// Reads documents from a JSON-lines file, one object per line.
///
/// Database and collection names are accepted for interface parity and
/// only show up in logs.
#[derive(Debug, Clone)]
pub struct JsonlSource {
    path: PathBuf,
}

impl JsonlSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DocumentSource for JsonlSource {
    fn id(&self) -> &'static str {
        "jsonl"
    }

    fn fetch_all(&self, database: &str, collection: &str) -> StoreResult<Vec<Record>> {
        let contents = std::fs::read_to_string(&self.path)?;
        let mut records = Vec::new();

        for (idx, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let value: serde_json::Value = serde_json::from_str(line)
                .map_err(|e| StoreError::Malformed { line: idx + 1, message: e.to_string() })?;
            match value {
                serde_json::Value::Object(map) => records.push(map),
                other => {
                    return Err(StoreError::Malformed {
                        line: idx + 1,
                        message: format!("expected a JSON object, found {other}"),
                    })
                }
            }
        }

        debug!(
            path = %self.path.display(),
            database,
            collection,
            count = records.len(),
            "read jsonl records"
        );
        Ok(records)
    }
}
