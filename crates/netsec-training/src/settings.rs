//! Run settings loaded from an optional TOML file and `NETSEC_*` environment
//! variables.
//!
//! Precedence:
//! 1. Environment (`NETSEC_INGESTION__SPLIT_RATIO=0.3`)
//! 2. Config file (`netsec.toml` unless another path is given)
//! 3. Defaults
//!
//! `MONGODB_URL` is used as the connection string when neither of the first
//! two sets `ingestion.mongodb_url`.

use crate::error::{PipelineError, PipelineResult};
use netsec_store::{DocumentSource, JsonlSource, MongoSource, MongoSourceOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_SETTINGS_FILE: &str = "netsec.toml";
pub const MONGODB_URL_ENV: &str = "MONGODB_URL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub pipeline: PipelineSettings,
    pub ingestion: IngestionSettings,
    pub validation: ValidationSettings,
    pub transformation: TransformationSettings,
    pub trainer: TrainerSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub pipeline_name: String,
    pub artifact_root: PathBuf,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self { pipeline_name: "NetworkSecurity".to_string(), artifact_root: PathBuf::from("Artifacts") }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Mongo,
    Jsonl,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionSettings {
    pub source: SourceKind,
    pub mongodb_url: Option<String>,
    pub jsonl_path: Option<PathBuf>,
    pub database_name: String,
    pub collection_name: String,
    pub split_ratio: f64,
    /// Fixed seed for the train/test shuffle; unset draws from OS entropy.
    pub seed: Option<u64>,
    pub connect_timeout_ms: u64,
    pub server_selection_timeout_ms: u64,
}

impl Default for IngestionSettings {
    fn default() -> Self {
        let mongo = MongoSourceOptions::default();
        Self {
            source: SourceKind::Mongo,
            mongodb_url: None,
            jsonl_path: None,
            database_name: "KRISHAI".to_string(),
            collection_name: "NetworkData".to_string(),
            split_ratio: 0.2,
            seed: None,
            connect_timeout_ms: mongo.connect_timeout_ms,
            server_selection_timeout_ms: mongo.server_selection_timeout_ms,
        }
    }
}

impl IngestionSettings {
    /// Builds the configured document source.
    pub fn document_source(&self) -> PipelineResult<Box<dyn DocumentSource>> {
        match self.source {
            SourceKind::Mongo => {
                let url = self.mongodb_url.clone().ok_or_else(|| {
                    PipelineError::InvalidConfig(format!(
                        "ingestion.mongodb_url is required for the mongo source (or set {MONGODB_URL_ENV})"
                    ))
                })?;
                let options = MongoSourceOptions {
                    connect_timeout_ms: self.connect_timeout_ms,
                    server_selection_timeout_ms: self.server_selection_timeout_ms,
                };
                Ok(Box::new(MongoSource::new(url, options)))
            }
            SourceKind::Jsonl => {
                let path = self.jsonl_path.clone().ok_or_else(|| {
                    PipelineError::InvalidConfig("ingestion.jsonl_path is required for the jsonl source".to_string())
                })?;
                Ok(Box::new(JsonlSource::new(path)))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    pub schema_path: PathBuf,
    pub drift_threshold: f64,
    /// Treat detected drift as a failed validation.
    pub halt_on_drift: bool,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            schema_path: PathBuf::from("data_schema").join("schema.yaml"),
            drift_threshold: 0.05,
            halt_on_drift: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformationSettings {
    pub target_column: String,
    pub n_neighbors: usize,
    pub scale: bool,
}

impl Default for TransformationSettings {
    fn default() -> Self {
        Self { target_column: "Result".to_string(), n_neighbors: 3, scale: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerSettings {
    pub learning_rate: f64,
    pub epochs: u32,
    pub l2_penalty: f64,
    pub expected_score: f64,
    pub overfitting_threshold: f64,
    /// Fail the run when the quality gate rejects the model. Otherwise the
    /// verdict is only logged and recorded.
    pub enforce_quality_gate: bool,
}

impl Default for TrainerSettings {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            epochs: 500,
            l2_penalty: 1e-4,
            expected_score: 0.6,
            overfitting_threshold: 0.05,
            enforce_quality_gate: false,
        }
    }
}

impl Settings {
    /// Loads settings from `path` (or `netsec.toml` when absent) and the environment.
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn load(path: Option<&Path>) -> PipelineResult<Self> {
        let file = path.map_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE), Path::to_path_buf);
        if path.is_some() && !file.exists() {
            return Err(PipelineError::InvalidConfig(format!(
                "settings file not found: {}",
                file.display()
            )));
        }

        let raw = config::Config::builder()
            .add_source(config::File::from(file).required(false))
            .add_source(
                config::Environment::with_prefix("NETSEC")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| PipelineError::InvalidConfig(e.to_string()))?;

        let mut settings: Self =
            raw.try_deserialize().map_err(|e| PipelineError::InvalidConfig(e.to_string()))?;

        if settings.ingestion.mongodb_url.is_none() {
            settings.ingestion.mongodb_url = std::env::var(MONGODB_URL_ENV).ok().filter(|v| !v.is_empty());
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_reference_run() {
        let settings = Settings::default();
        assert_eq!(settings.ingestion.database_name, "KRISHAI");
        assert_eq!(settings.ingestion.collection_name, "NetworkData");
        assert!((settings.ingestion.split_ratio - 0.2).abs() < f64::EPSILON);
        assert_eq!(settings.transformation.target_column, "Result");
        assert_eq!(settings.transformation.n_neighbors, 3);
        assert!(!settings.trainer.enforce_quality_gate);
    }

    #[test]
    fn test_load_reads_toml_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("netsec.toml");
        std::fs::write(
            &path,
            "[ingestion]\nsource = \"jsonl\"\njsonl_path = \"records.jsonl\"\nsplit_ratio = 0.25\nseed = 7\n\n[trainer]\nepochs = 10\n",
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.ingestion.source, SourceKind::Jsonl);
        assert_eq!(settings.ingestion.seed, Some(7));
        assert!((settings.ingestion.split_ratio - 0.25).abs() < f64::EPSILON);
        assert_eq!(settings.trainer.epochs, 10);
        // untouched sections keep defaults
        assert_eq!(settings.transformation.target_column, "Result");
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let temp = TempDir::new().unwrap();
        let err = Settings::load(Some(&temp.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig(_)));
    }

    #[test]
    fn test_mongo_source_requires_url() {
        let settings = IngestionSettings::default();
        assert!(matches!(settings.document_source(), Err(PipelineError::InvalidConfig(_))));

        let settings = IngestionSettings {
            mongodb_url: Some("mongodb://localhost:27017".to_string()),
            ..Default::default()
        };
        assert_eq!(settings.document_source().unwrap().id(), "mongodb");
    }
}
