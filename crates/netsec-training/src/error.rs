use netsec_store::StoreError;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("document store unreachable: {0}")]
    Connectivity(String),

    #[error("data format error: {0}")]
    DataFormat(String),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("validation failure: {0}")]
    ValidationFailure(String),

    #[error("failed to persist {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("training error: {0}")]
    Training(String),
}

impl PipelineError {
    pub(crate) fn persistence(path: &Path, source: std::io::Error) -> Self {
        Self::Persistence { path: path.to_path_buf(), source }
    }

    /// Maps a csv error raised while writing `path`.
    pub(crate) fn csv_write(path: &Path, err: csv::Error) -> Self {
        if err.is_io_error() {
            match err.into_kind() {
                csv::ErrorKind::Io(io) => return Self::persistence(path, io),
                other => return Self::DataFormat(format!("{}: {other:?}", path.display())),
            }
        }
        Self::DataFormat(format!("{}: {err}", path.display()))
    }

    /// Maps a csv error raised while reading `path`.
    pub(crate) fn csv_read(path: &Path, err: &csv::Error) -> Self {
        Self::DataFormat(format!("failed to read {}: {err}", path.display()))
    }
}

impl From<StoreError> for PipelineError {
    fn from(err: StoreError) -> Self {
        if err.is_connectivity() {
            Self::Connectivity(err.to_string())
        } else {
            Self::DataFormat(err.to_string())
        }
    }
}
