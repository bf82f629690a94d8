use crate::artifacts::{DataIngestionArtifact, DataValidationArtifact};
use crate::config::DataValidationConfig;
use crate::drift::{detect_dataset_drift, DriftReport};
use crate::error::PipelineResult;
use crate::frame::Frame;
use crate::fsio::write_yaml;
use crate::schema::DataSchema;
use std::path::Path;
use tracing::{info, warn};

/// Checks the ingested split against the reference schema and measures drift
/// between train and test.
///
/// A schema mismatch is not an error: it yields an artifact with
/// `validation_status == false` and the files routed to the invalid paths.
pub struct DataValidation {
    ingestion_artifact: DataIngestionArtifact,
    config: DataValidationConfig,
}

impl DataValidation {
    #[must_use]
    pub fn new(ingestion_artifact: DataIngestionArtifact, config: DataValidationConfig) -> Self {
        Self { ingestion_artifact, config }
    }

    pub fn read_data(path: &Path) -> PipelineResult<Frame> {
        Frame::read_csv(path)
    }

    #[must_use]
    pub fn validate_number_of_columns(frame: &Frame, schema: &DataSchema) -> bool {
        info!(required = schema.column_count(), found = frame.width(), "checking column count");
        frame.width() == schema.column_count()
    }

    /// Computes the drift report and writes it to the configured path.
    pub fn detect_dataset_drift(
        &self,
        base: &Frame,
        current: &Frame,
        schema: &DataSchema,
    ) -> PipelineResult<DriftReport> {
        let report =
            detect_dataset_drift(base, current, &schema.numerical_columns, self.config.drift_threshold)?;
        for (column, drift) in report.columns.iter().filter(|(_, d)| d.drift_status) {
            warn!(column = column.as_str(), p_value = drift.p_value, "drift detected");
        }
        write_yaml(&self.config.drift_report_file_path, &report)?;
        Ok(report)
    }

    pub fn initiate_data_validation(&self) -> PipelineResult<DataValidationArtifact> {
        let schema = DataSchema::load(&self.config.schema_file_path)?;
        let train = Self::read_data(&self.ingestion_artifact.train_file_path)?;
        let test = Self::read_data(&self.ingestion_artifact.test_file_path)?;

        let mut schema_ok = true;
        for (split, frame) in [("train", &train), ("test", &test)] {
            if !Self::validate_number_of_columns(frame, &schema) {
                warn!(split, "column count does not match schema");
            }
            let issues = schema.check(frame);
            for issue in &issues {
                warn!(split, issue = issue.as_str(), "schema check failed");
            }
            schema_ok &= issues.is_empty();
        }

        let report = self.detect_dataset_drift(&train, &test, &schema)?;
        let validation_status = schema_ok && !(self.config.halt_on_drift && report.drift_detected);

        let artifact = if validation_status {
            train.write_csv(&self.config.valid_train_file_path)?;
            test.write_csv(&self.config.valid_test_file_path)?;
            DataValidationArtifact {
                validation_status,
                drift_detected: report.drift_detected,
                valid_train_file_path: Some(self.config.valid_train_file_path.clone()),
                valid_test_file_path: Some(self.config.valid_test_file_path.clone()),
                invalid_train_file_path: None,
                invalid_test_file_path: None,
                drift_report_file_path: self.config.drift_report_file_path.clone(),
            }
        } else {
            train.write_csv(&self.config.invalid_train_file_path)?;
            test.write_csv(&self.config.invalid_test_file_path)?;
            DataValidationArtifact {
                validation_status,
                drift_detected: report.drift_detected,
                valid_train_file_path: None,
                valid_test_file_path: None,
                invalid_train_file_path: Some(self.config.invalid_train_file_path.clone()),
                invalid_test_file_path: Some(self.config.invalid_test_file_path.clone()),
                drift_report_file_path: self.config.drift_report_file_path.clone(),
            }
        };

        info!(
            validation_status,
            drift_detected = report.drift_detected,
            report = %self.config.drift_report_file_path.display(),
            "data validation finished"
        );
        Ok(artifact)
    }
}
