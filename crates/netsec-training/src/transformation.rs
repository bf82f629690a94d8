use crate::artifacts::{DataTransformationArtifact, DataValidationArtifact};
use crate::config::DataTransformationConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::frame::Frame;
use crate::fsio::{read_json, write_json};
use crate::preprocess::Preprocessor;
use ndarray::{concatenate, Array1, Array2, Axis};
use std::path::Path;
use tracing::info;

/// Fits the preprocessor on the validated training split and writes both
/// splits as numeric arrays (features, then the target as last column).
pub struct DataTransformation {
    validation_artifact: DataValidationArtifact,
    config: DataTransformationConfig,
}

impl DataTransformation {
    #[must_use]
    pub fn new(validation_artifact: DataValidationArtifact, config: DataTransformationConfig) -> Self {
        Self { validation_artifact, config }
    }

    pub fn get_data_transformer_object(
        &self,
        feature_columns: Vec<String>,
        x_train: &Array2<f64>,
    ) -> PipelineResult<Preprocessor> {
        info!(n_neighbors = self.config.n_neighbors, scale = self.config.scale, "fitting preprocessor");
        Preprocessor::fit(feature_columns, x_train, self.config.n_neighbors, self.config.scale)
    }

    pub fn initiate_data_transformation(&self) -> PipelineResult<DataTransformationArtifact> {
        let artifact = &self.validation_artifact;
        let (Some(train_path), Some(test_path), true) = (
            artifact.valid_train_file_path.as_deref(),
            artifact.valid_test_file_path.as_deref(),
            artifact.validation_status,
        ) else {
            return Err(PipelineError::ValidationFailure(
                "data validation did not pass; refusing to transform".to_string(),
            ));
        };

        let train = Frame::read_csv(train_path)?;
        let test = Frame::read_csv(test_path)?;

        let target = self.config.target_column.as_str();
        let feature_columns: Vec<String> =
            train.columns().iter().filter(|c| c.as_str() != target).cloned().collect();
        let (x_train, y_train) = features_and_target(&train, &feature_columns, target)?;
        let (x_test, y_test) = features_and_target(&test, &feature_columns, target)?;

        let preprocessor = self.get_data_transformer_object(feature_columns, &x_train)?;
        let train_arr = with_target(&preprocessor.transform(&x_train)?, &y_train)?;
        let test_arr = with_target(&preprocessor.transform(&x_test)?, &y_test)?;

        save_array(&self.config.transformed_train_file_path, &train_arr)?;
        save_array(&self.config.transformed_test_file_path, &test_arr)?;
        write_json(&self.config.transformed_object_file_path, &preprocessor)?;
        info!(
            train_rows = train_arr.nrows(),
            test_rows = test_arr.nrows(),
            width = train_arr.ncols(),
            "data transformation finished"
        );

        Ok(DataTransformationArtifact {
            transformed_train_file_path: self.config.transformed_train_file_path.clone(),
            transformed_test_file_path: self.config.transformed_test_file_path.clone(),
            transformed_object_file_path: self.config.transformed_object_file_path.clone(),
        })
    }
}

/// Feature matrix (missing cells as NaN) for `feature_columns`, plus the
/// target with label -1 mapped to 0.
pub fn features_and_target(
    frame: &Frame,
    feature_columns: &[String],
    target: &str,
) -> PipelineResult<(Array2<f64>, Array1<f64>)> {
    let y = frame
        .numeric_column(target)?
        .into_iter()
        .enumerate()
        .map(|(row, v)| match v {
            Some(v) if (v + 1.0).abs() < f64::EPSILON => Ok(0.0),
            Some(v) => Ok(v),
            None => Err(PipelineError::DataFormat(format!("target {target} missing at row {row}"))),
        })
        .collect::<PipelineResult<Vec<f64>>>()?;

    Ok((features(frame, feature_columns)?, Array1::from(y)))
}

/// Feature matrix in `feature_columns` order; missing cells become NaN.
pub fn features(frame: &Frame, feature_columns: &[String]) -> PipelineResult<Array2<f64>> {
    let mut x = Array2::from_elem((frame.height(), feature_columns.len()), f64::NAN);
    for (j, name) in feature_columns.iter().enumerate() {
        for (i, value) in frame.numeric_column(name)?.into_iter().enumerate() {
            if let Some(v) = value {
                x[[i, j]] = v;
            }
        }
    }
    Ok(x)
}

fn with_target(x: &Array2<f64>, y: &Array1<f64>) -> PipelineResult<Array2<f64>> {
    let y = y.view().insert_axis(Axis(1));
    concatenate(Axis(1), &[x.view(), y]).map_err(|e| PipelineError::DataFormat(e.to_string()))
}

pub fn save_array(path: &Path, array: &Array2<f64>) -> PipelineResult<()> {
    if array.iter().any(|v| !v.is_finite()) {
        return Err(PipelineError::DataFormat(format!(
            "refusing to write non-finite values to {}",
            path.display()
        )));
    }
    write_json(path, array)
}

pub fn load_array(path: &Path) -> PipelineResult<Array2<f64>> {
    read_json(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrainingPipelineConfig;
    use crate::settings::TransformationSettings;
    use ndarray::array;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn setup(train_csv: &str, test_csv: &str) -> (TempDir, DataTransformation) {
        let temp = TempDir::new().unwrap();
        let train = temp.path().join("train.csv");
        let test = temp.path().join("test.csv");
        std::fs::write(&train, train_csv).unwrap();
        std::fs::write(&test, test_csv).unwrap();

        let validation = DataValidationArtifact {
            validation_status: true,
            drift_detected: false,
            valid_train_file_path: Some(train),
            valid_test_file_path: Some(test),
            invalid_train_file_path: None,
            invalid_test_file_path: None,
            drift_report_file_path: PathBuf::from("unused.yaml"),
        };
        let pipeline = TrainingPipelineConfig::new("NetworkSecurity", temp.path().join("Artifacts"), "run");
        let config = DataTransformationConfig::new(&pipeline, &TransformationSettings::default()).unwrap();
        (temp, DataTransformation::new(validation, config))
    }

    const TRAIN: &str = "a,b,Result\n1,,-1\n2,1,1\n3,0,-1\n4,1,1\n";

    #[test]
    fn test_writes_arrays_with_target_last() {
        let (_temp, stage) = setup(TRAIN, "a,b,Result\n,1,1\n5,0,-1\n");
        let artifact = stage.initiate_data_transformation().unwrap();

        let train = load_array(&artifact.transformed_train_file_path).unwrap();
        let test = load_array(&artifact.transformed_test_file_path).unwrap();
        assert_eq!(train.dim(), (4, 3));
        assert_eq!(test.dim(), (2, 3));
        assert_eq!(train.column(2).to_vec(), vec![0.0, 1.0, 0.0, 1.0]);
        assert!(train.iter().chain(test.iter()).all(|v| v.is_finite()));
        assert!(artifact.transformed_object_file_path.exists());
    }

    #[test]
    fn test_preprocessor_depends_only_on_training_split() {
        let (_a, first) = setup(TRAIN, "a,b,Result\n9,1,1\n5,0,-1\n7,,1\n");
        let (_b, second) = setup(TRAIN, "a,b,Result\n7,,1\n9,1,1\n5,0,-1\n");

        let a = first.initiate_data_transformation().unwrap();
        let b = second.initiate_data_transformation().unwrap();
        let pa: Preprocessor = read_json(&a.transformed_object_file_path).unwrap();
        let pb: Preprocessor = read_json(&b.transformed_object_file_path).unwrap();
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_refuses_failed_validation() {
        let (_temp, mut stage) = setup(TRAIN, TRAIN);
        stage.validation_artifact.validation_status = false;
        assert!(matches!(
            stage.initiate_data_transformation(),
            Err(PipelineError::ValidationFailure(_))
        ));
    }

    #[test]
    fn test_missing_target_is_data_error() {
        let frame = Frame::new(vec!["a".into(), "Result".into()], vec![vec![Some("1".into()), None]]).unwrap();
        let err = features_and_target(&frame, &["a".to_string()], "Result").unwrap_err();
        assert!(matches!(err, PipelineError::DataFormat(_)));
    }

    #[test]
    fn test_with_target_appends_column() {
        let out = with_target(&array![[1.0], [2.0]], &array![0.0, 1.0]).unwrap();
        assert_eq!(out, array![[1.0, 0.0], [2.0, 1.0]]);
    }
}
