//! Per-run configuration records.
//!
//! Every stage config is derived from one `TrainingPipelineConfig`, and every
//! path follows `<artifact_root>/<timestamp>/<stage_dir>/<sub_dir>/<file>`:
//!
//! ```text
//! Artifacts/<timestamp>/data_ingestion/feature_store/phisingData.csv
//! Artifacts/<timestamp>/data_ingestion/ingested/{train,test}.csv
//! Artifacts/<timestamp>/data_validation/{validated,invalid}/{train,test}.csv
//! Artifacts/<timestamp>/data_validation/drift_report/report.yaml
//! Artifacts/<timestamp>/data_transformation/transformed/{train,test}.json
//! Artifacts/<timestamp>/data_transformation/transformed_object/preprocessing.json
//! Artifacts/<timestamp>/model_trainer/trained_model/model.json
//! ```

use crate::error::{PipelineError, PipelineResult};
use crate::model::LogisticParams;
use crate::settings::{IngestionSettings, TrainerSettings, TransformationSettings, ValidationSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const TIMESTAMP_FORMAT: &str = "%m_%d_%Y_%H_%M_%S";
pub const RUN_MANIFEST_FILE_NAME: &str = "run_manifest.json";

pub const TRAIN_FILE_NAME: &str = "train.csv";
pub const TEST_FILE_NAME: &str = "test.csv";

pub const DATA_INGESTION_DIR_NAME: &str = "data_ingestion";
pub const DATA_INGESTION_FEATURE_STORE_DIR: &str = "feature_store";
pub const DATA_INGESTION_INGESTED_DIR: &str = "ingested";
pub const FEATURE_STORE_FILE_NAME: &str = "phisingData.csv";

pub const DATA_VALIDATION_DIR_NAME: &str = "data_validation";
pub const DATA_VALIDATION_VALID_DIR: &str = "validated";
pub const DATA_VALIDATION_INVALID_DIR: &str = "invalid";
pub const DATA_VALIDATION_DRIFT_REPORT_DIR: &str = "drift_report";
pub const DATA_VALIDATION_DRIFT_REPORT_FILE_NAME: &str = "report.yaml";

pub const DATA_TRANSFORMATION_DIR_NAME: &str = "data_transformation";
pub const DATA_TRANSFORMATION_TRANSFORMED_DATA_DIR: &str = "transformed";
pub const DATA_TRANSFORMATION_TRANSFORMED_OBJECT_DIR: &str = "transformed_object";
pub const TRANSFORMED_TRAIN_FILE_NAME: &str = "train.json";
pub const TRANSFORMED_TEST_FILE_NAME: &str = "test.json";
pub const PREPROCESSING_OBJECT_FILE_NAME: &str = "preprocessing.json";

pub const MODEL_TRAINER_DIR_NAME: &str = "model_trainer";
pub const MODEL_TRAINER_TRAINED_MODEL_DIR: &str = "trained_model";
pub const MODEL_FILE_NAME: &str = "model.json";

/// Run-scoped root: one per pipeline run, immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingPipelineConfig {
    pub pipeline_name: String,
    pub artifact_root: PathBuf,
    pub timestamp: String,
    pub artifact_dir: PathBuf,
}

impl TrainingPipelineConfig {
    #[must_use]
    pub fn new(pipeline_name: impl Into<String>, artifact_root: impl Into<PathBuf>, timestamp: impl Into<String>) -> Self {
        let artifact_root = artifact_root.into();
        let timestamp = timestamp.into();
        let artifact_dir = artifact_root.join(&timestamp);
        Self { pipeline_name: pipeline_name.into(), artifact_root, timestamp, artifact_dir }
    }

    /// Root stamped with the current local time.
    #[must_use]
    pub fn starting_now(pipeline_name: impl Into<String>, artifact_root: impl Into<PathBuf>) -> Self {
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        Self::new(pipeline_name, artifact_root, timestamp)
    }

    #[must_use]
    pub fn artifact_dir(&self) -> &Path {
        &self.artifact_dir
    }

    #[must_use]
    pub fn stage_dir(&self, stage_dir_name: &str) -> PathBuf {
        self.artifact_dir.join(stage_dir_name)
    }

    #[must_use]
    pub fn run_manifest_path(&self) -> PathBuf {
        self.artifact_dir.join(RUN_MANIFEST_FILE_NAME)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataIngestionConfig {
    pub data_ingestion_dir: PathBuf,
    pub feature_store_file_path: PathBuf,
    pub training_file_path: PathBuf,
    pub testing_file_path: PathBuf,
    pub train_test_split_ratio: f64,
    pub database_name: String,
    pub collection_name: String,
    pub seed: Option<u64>,
}

impl DataIngestionConfig {
    pub fn new(pipeline: &TrainingPipelineConfig, settings: &IngestionSettings) -> PipelineResult<Self> {
        let ratio = settings.split_ratio;
        if !(ratio > 0.0 && ratio < 1.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "train/test split ratio must lie in (0, 1), got {ratio}"
            )));
        }
        if settings.database_name.trim().is_empty() || settings.collection_name.trim().is_empty() {
            return Err(PipelineError::InvalidConfig(
                "database and collection names are required".to_string(),
            ));
        }

        let dir = pipeline.stage_dir(DATA_INGESTION_DIR_NAME);
        let ingested = dir.join(DATA_INGESTION_INGESTED_DIR);
        Ok(Self {
            feature_store_file_path: dir.join(DATA_INGESTION_FEATURE_STORE_DIR).join(FEATURE_STORE_FILE_NAME),
            training_file_path: ingested.join(TRAIN_FILE_NAME),
            testing_file_path: ingested.join(TEST_FILE_NAME),
            data_ingestion_dir: dir,
            train_test_split_ratio: ratio,
            database_name: settings.database_name.clone(),
            collection_name: settings.collection_name.clone(),
            seed: settings.seed,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataValidationConfig {
    pub data_validation_dir: PathBuf,
    pub valid_data_dir: PathBuf,
    pub invalid_data_dir: PathBuf,
    pub valid_train_file_path: PathBuf,
    pub valid_test_file_path: PathBuf,
    pub invalid_train_file_path: PathBuf,
    pub invalid_test_file_path: PathBuf,
    pub drift_report_file_path: PathBuf,
    pub schema_file_path: PathBuf,
    pub drift_threshold: f64,
    pub halt_on_drift: bool,
}

impl DataValidationConfig {
    pub fn new(pipeline: &TrainingPipelineConfig, settings: &ValidationSettings) -> PipelineResult<Self> {
        let threshold = settings.drift_threshold;
        if !(threshold > 0.0 && threshold < 1.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "drift threshold must lie in (0, 1), got {threshold}"
            )));
        }

        let dir = pipeline.stage_dir(DATA_VALIDATION_DIR_NAME);
        let valid = dir.join(DATA_VALIDATION_VALID_DIR);
        let invalid = dir.join(DATA_VALIDATION_INVALID_DIR);
        Ok(Self {
            valid_train_file_path: valid.join(TRAIN_FILE_NAME),
            valid_test_file_path: valid.join(TEST_FILE_NAME),
            invalid_train_file_path: invalid.join(TRAIN_FILE_NAME),
            invalid_test_file_path: invalid.join(TEST_FILE_NAME),
            drift_report_file_path: dir
                .join(DATA_VALIDATION_DRIFT_REPORT_DIR)
                .join(DATA_VALIDATION_DRIFT_REPORT_FILE_NAME),
            valid_data_dir: valid,
            invalid_data_dir: invalid,
            data_validation_dir: dir,
            schema_file_path: settings.schema_path.clone(),
            drift_threshold: threshold,
            halt_on_drift: settings.halt_on_drift,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTransformationConfig {
    pub data_transformation_dir: PathBuf,
    pub transformed_train_file_path: PathBuf,
    pub transformed_test_file_path: PathBuf,
    pub transformed_object_file_path: PathBuf,
    pub target_column: String,
    pub n_neighbors: usize,
    pub scale: bool,
}

impl DataTransformationConfig {
    pub fn new(pipeline: &TrainingPipelineConfig, settings: &TransformationSettings) -> PipelineResult<Self> {
        if settings.n_neighbors == 0 {
            return Err(PipelineError::InvalidConfig("n_neighbors must be >= 1".to_string()));
        }
        if settings.target_column.trim().is_empty() {
            return Err(PipelineError::InvalidConfig("target column is required".to_string()));
        }

        let dir = pipeline.stage_dir(DATA_TRANSFORMATION_DIR_NAME);
        let data = dir.join(DATA_TRANSFORMATION_TRANSFORMED_DATA_DIR);
        Ok(Self {
            transformed_train_file_path: data.join(TRANSFORMED_TRAIN_FILE_NAME),
            transformed_test_file_path: data.join(TRANSFORMED_TEST_FILE_NAME),
            transformed_object_file_path: dir
                .join(DATA_TRANSFORMATION_TRANSFORMED_OBJECT_DIR)
                .join(PREPROCESSING_OBJECT_FILE_NAME),
            data_transformation_dir: dir,
            target_column: settings.target_column.clone(),
            n_neighbors: settings.n_neighbors,
            scale: settings.scale,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTrainerConfig {
    pub model_trainer_dir: PathBuf,
    pub trained_model_file_path: PathBuf,
    pub params: LogisticParams,
    pub expected_score: f64,
    pub overfitting_threshold: f64,
    pub enforce_quality_gate: bool,
}

impl ModelTrainerConfig {
    pub fn new(pipeline: &TrainingPipelineConfig, settings: &TrainerSettings) -> PipelineResult<Self> {
        let params = LogisticParams {
            learning_rate: settings.learning_rate,
            epochs: settings.epochs,
            l2_penalty: settings.l2_penalty,
        };
        params.validate()?;
        for (name, value) in [
            ("expected_score", settings.expected_score),
            ("overfitting_threshold", settings.overfitting_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PipelineError::InvalidConfig(format!("{name} must lie in [0, 1], got {value}")));
            }
        }

        let dir = pipeline.stage_dir(MODEL_TRAINER_DIR_NAME);
        Ok(Self {
            trained_model_file_path: dir.join(MODEL_TRAINER_TRAINED_MODEL_DIR).join(MODEL_FILE_NAME),
            model_trainer_dir: dir,
            params,
            expected_score: settings.expected_score,
            overfitting_threshold: settings.overfitting_threshold,
            enforce_quality_gate: settings.enforce_quality_gate,
        })
    }
}
