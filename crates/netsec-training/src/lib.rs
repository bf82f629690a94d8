//! Netsec Training
//!
//! The network-security model training pipeline:
//! - Ingestion: document store -> feature store -> train/test split
//! - Validation: schema check and train/test drift report
//! - Transformation: KNN imputation + scaling fitted on the training split
//! - Training: logistic regression, scored on both splits
//!
//! Stages only talk through artifacts (file paths and scalars) on disk.

pub mod artifacts;
pub mod config;
pub mod drift;
pub mod error;
pub mod frame;
pub mod fsio;
pub mod ingestion;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod preprocess;
pub mod progress;
pub mod registry;
pub mod schema;
pub mod settings;
pub mod trainer;
pub mod transformation;
pub mod validation;

pub use artifacts::{
    ArtifactKind, ClassificationMetricArtifact, DataIngestionArtifact, DataTransformationArtifact,
    DataValidationArtifact, ModelTrainerArtifact, RunArtifact, RunManifest,
};
pub use config::{
    DataIngestionConfig, DataTransformationConfig, DataValidationConfig, ModelTrainerConfig, TrainingPipelineConfig,
};
pub use drift::{ColumnDrift, DriftReport};
pub use error::{PipelineError, PipelineResult};
pub use frame::Frame;
pub use ingestion::DataIngestion;
pub use model::{Classifier, LogisticParams, LogisticRegression, NetworkModel};
pub use pipeline::{PipelineOutcome, TrainingPipeline};
pub use preprocess::Preprocessor;
pub use progress::{NoopProgressSink, ProgressEvent, ProgressSink, Stage, StdoutProgressSink};
pub use registry::{discover_runs, resolve_run_model, RunEntry};
pub use schema::DataSchema;
pub use settings::Settings;
pub use trainer::ModelTrainer;
pub use transformation::DataTransformation;
pub use validation::DataValidation;
