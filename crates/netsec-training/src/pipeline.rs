use crate::artifacts::{
    make_artifact, ArtifactKind, DataIngestionArtifact, DataTransformationArtifact, DataValidationArtifact,
    ModelTrainerArtifact, RunArtifact, RunManifest,
};
use crate::config::{
    DataIngestionConfig, DataTransformationConfig, DataValidationConfig, ModelTrainerConfig, TrainingPipelineConfig,
};
use crate::error::PipelineResult;
use crate::fsio::write_json;
use crate::ingestion::DataIngestion;
use crate::progress::{ProgressEvent, ProgressSink, Stage};
use crate::settings::Settings;
use crate::trainer::ModelTrainer;
use crate::transformation::DataTransformation;
use crate::validation::DataValidation;
use netsec_store::DocumentSource;
use serde::Serialize;
use std::path::Path;
use tracing::{error, info};

/// Runs ingestion, validation, transformation and training in order, passing
/// each stage's artifact to the next.
pub struct TrainingPipeline<'a> {
    settings: Settings,
    config: TrainingPipelineConfig,
    source: &'a dyn DocumentSource,
}

/// Everything a completed run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub ingestion: DataIngestionArtifact,
    pub validation: DataValidationArtifact,
    pub transformation: DataTransformationArtifact,
    pub trainer: ModelTrainerArtifact,
    pub manifest: RunManifest,
}

impl<'a> TrainingPipeline<'a> {
    /// Pipeline for a new run stamped with the current time.
    #[must_use]
    pub fn new(settings: Settings, source: &'a dyn DocumentSource) -> Self {
        let config = TrainingPipelineConfig::starting_now(
            settings.pipeline.pipeline_name.clone(),
            settings.pipeline.artifact_root.clone(),
        );
        Self::with_config(settings, config, source)
    }

    #[must_use]
    pub fn with_config(settings: Settings, config: TrainingPipelineConfig, source: &'a dyn DocumentSource) -> Self {
        Self { settings, config, source }
    }

    #[must_use]
    pub fn config(&self) -> &TrainingPipelineConfig {
        &self.config
    }

    pub fn start_data_ingestion(&self) -> PipelineResult<DataIngestionArtifact> {
        let config = DataIngestionConfig::new(&self.config, &self.settings.ingestion)?;
        DataIngestion::new(config, self.source).initiate_data_ingestion()
    }

    pub fn start_data_validation(&self, ingestion: &DataIngestionArtifact) -> PipelineResult<DataValidationArtifact> {
        let config = DataValidationConfig::new(&self.config, &self.settings.validation)?;
        DataValidation::new(ingestion.clone(), config).initiate_data_validation()
    }

    pub fn start_data_transformation(
        &self,
        validation: &DataValidationArtifact,
    ) -> PipelineResult<DataTransformationArtifact> {
        let config = DataTransformationConfig::new(&self.config, &self.settings.transformation)?;
        DataTransformation::new(validation.clone(), config).initiate_data_transformation()
    }

    pub fn start_model_trainer(
        &self,
        transformation: &DataTransformationArtifact,
    ) -> PipelineResult<ModelTrainerArtifact> {
        let config = ModelTrainerConfig::new(&self.config, &self.settings.trainer)?;
        ModelTrainer::new(transformation.clone(), config).initiate_model_trainer()
    }

    /// Runs every stage, then writes the run manifest.
    ///
    /// Stops at the first failing stage. A validation artifact with
    /// `validation_status == false` stops the run at transformation.
    pub fn run(&self, progress: &dyn ProgressSink) -> PipelineResult<PipelineOutcome> {
        // all stage configs are checked before any work starts
        self.check_configs()
            .inspect_err(|err| error!(phase = "setup", error = %err, "pipeline configuration rejected"))?;

        let run_id = self.config.timestamp.clone();
        info!(run_id = %run_id, artifact_dir = %self.config.artifact_dir.display(), "starting training pipeline");
        progress.on_event(ProgressEvent::Started { run_id: run_id.clone() });

        let ingestion = self.stage(Stage::DataIngestion, progress, || self.start_data_ingestion())?;
        let validation = self.stage(Stage::DataValidation, progress, || self.start_data_validation(&ingestion))?;
        let transformation =
            self.stage(Stage::DataTransformation, progress, || self.start_data_transformation(&validation))?;
        let trainer = self.stage(Stage::ModelTrainer, progress, || self.start_model_trainer(&transformation))?;

        let manifest = self.write_manifest(&validation, &transformation, &trainer)?;
        progress.on_event(ProgressEvent::Finished { run_id });

        Ok(PipelineOutcome { ingestion, validation, transformation, trainer, manifest })
    }

    fn check_configs(&self) -> PipelineResult<()> {
        DataIngestionConfig::new(&self.config, &self.settings.ingestion)?;
        DataValidationConfig::new(&self.config, &self.settings.validation)?;
        DataTransformationConfig::new(&self.config, &self.settings.transformation)?;
        ModelTrainerConfig::new(&self.config, &self.settings.trainer)?;
        Ok(())
    }

    fn stage<T, F>(&self, stage: Stage, progress: &dyn ProgressSink, body: F) -> PipelineResult<T>
    where
        T: Serialize,
        F: FnOnce() -> PipelineResult<T>,
    {
        let run_id = self.config.timestamp.clone();
        info!(%stage, "initiating stage");
        progress.on_event(ProgressEvent::StageStarted { run_id: run_id.clone(), stage });

        match body() {
            Ok(artifact) => {
                let value = serde_json::to_value(&artifact).unwrap_or(serde_json::Value::Null);
                progress.on_event(ProgressEvent::StageCompleted { run_id, stage, artifact: value });
                info!(%stage, "stage completed");
                Ok(artifact)
            }
            Err(err) => {
                error!(%stage, error = %err, "stage failed");
                Err(err)
            }
        }
    }

    fn write_manifest(
        &self,
        validation: &DataValidationArtifact,
        transformation: &DataTransformationArtifact,
        trainer: &ModelTrainerArtifact,
    ) -> PipelineResult<RunManifest> {
        let ingestion_config = DataIngestionConfig::new(&self.config, &self.settings.ingestion)?;

        let mut files: Vec<(ArtifactKind, &Path)> = vec![
            (ArtifactKind::FeatureStore, &ingestion_config.feature_store_file_path),
            (ArtifactKind::TrainSplit, &ingestion_config.training_file_path),
            (ArtifactKind::TestSplit, &ingestion_config.testing_file_path),
            (ArtifactKind::DriftReport, &validation.drift_report_file_path),
            (ArtifactKind::TransformedTrain, &transformation.transformed_train_file_path),
            (ArtifactKind::TransformedTest, &transformation.transformed_test_file_path),
            (ArtifactKind::Preprocessor, &transformation.transformed_object_file_path),
            (ArtifactKind::Model, &trainer.trained_model_file_path),
        ];
        if let Some(path) = &validation.valid_train_file_path {
            files.push((ArtifactKind::ValidatedTrain, path));
        }
        if let Some(path) = &validation.valid_test_file_path {
            files.push((ArtifactKind::ValidatedTest, path));
        }

        let artifacts = files
            .into_iter()
            .map(|(kind, path)| make_artifact(kind, path))
            .collect::<PipelineResult<Vec<RunArtifact>>>()?;

        let manifest = RunManifest {
            run_id: self.config.timestamp.clone(),
            pipeline_name: self.config.pipeline_name.clone(),
            created_at: chrono::Utc::now(),
            validation_status: validation.validation_status,
            drift_detected: validation.drift_detected,
            train_metrics: trainer.train_metric_artifact,
            test_metrics: trainer.test_metric_artifact,
            quality_gate_passed: trainer.quality_gate_passed,
            artifacts,
        };
        write_json(&self.config.run_manifest_path(), &manifest)?;
        info!(path = %self.config.run_manifest_path().display(), "wrote run manifest");
        Ok(manifest)
    }
}
