use thiserror::Error;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store connection failed: {0}")]
    Connection(#[from] mongodb::error::Error),

    #[error("malformed record at line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error("record is not a document: {0}")]
    InvalidRecord(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// True when the failure came from reaching the database rather than from its data.
    #[must_use]
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}
