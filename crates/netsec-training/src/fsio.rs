//! Filesystem helpers shared by the stages. Every write failure comes back as
//! `PipelineError::Persistence` carrying the path.

use crate::error::{PipelineError, PipelineResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

pub fn ensure_parent_dir(path: &Path) -> PipelineResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| PipelineError::persistence(parent, e))?;
        }
    }
    Ok(())
}

pub fn write_bytes(path: &Path, bytes: &[u8]) -> PipelineResult<()> {
    ensure_parent_dir(path)?;
    std::fs::write(path, bytes).map_err(|e| PipelineError::persistence(path, e))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> PipelineResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| PipelineError::DataFormat(format!("{}: {e}", path.display())))?;
    write_bytes(path, json.as_bytes())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> PipelineResult<T> {
    let bytes = std::fs::read(path)
        .map_err(|e| PipelineError::DataFormat(format!("failed to read {}: {e}", path.display())))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| PipelineError::DataFormat(format!("failed to parse {}: {e}", path.display())))
}

pub fn write_yaml<T: Serialize>(path: &Path, value: &T) -> PipelineResult<()> {
    let yaml = serde_yaml::to_string(value)
        .map_err(|e| PipelineError::DataFormat(format!("{}: {e}", path.display())))?;
    write_bytes(path, yaml.as_bytes())
}
