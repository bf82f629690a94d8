use crate::artifacts::{ClassificationMetricArtifact, DataTransformationArtifact, ModelTrainerArtifact};
use crate::config::ModelTrainerConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::fsio::read_json;
use crate::metrics::get_classification_score;
use crate::model::{Classifier, LogisticRegression, NetworkModel};
use crate::preprocess::Preprocessor;
use crate::transformation::load_array;
use ndarray::{s, Array1, Array2};
use tracing::{info, warn};

/// Fits the classifier on the transformed training array, scores both splits
/// and persists the model together with its preprocessor.
pub struct ModelTrainer {
    transformation_artifact: DataTransformationArtifact,
    config: ModelTrainerConfig,
}

impl ModelTrainer {
    #[must_use]
    pub fn new(transformation_artifact: DataTransformationArtifact, config: ModelTrainerConfig) -> Self {
        Self { transformation_artifact, config }
    }

    pub fn train_model(&self, x_train: &Array2<f64>, y_train: &Array1<f64>) -> PipelineResult<LogisticRegression> {
        let mut model = LogisticRegression::new(self.config.params.clone());
        info!(model = model.id(), epochs = self.config.params.epochs, "fitting model");
        model.fit(x_train, y_train)?;
        Ok(model)
    }

    pub fn initiate_model_trainer(&self) -> PipelineResult<ModelTrainerArtifact> {
        let train = load_array(&self.transformation_artifact.transformed_train_file_path)?;
        let test = load_array(&self.transformation_artifact.transformed_test_file_path)?;
        let (x_train, y_train) = split_target(&train)?;
        let (x_test, y_test) = split_target(&test)?;

        let model = self.train_model(&x_train, &y_train)?;
        let train_metric = get_classification_score(&y_train, &model.predict(&x_train)?)?;
        let test_metric = get_classification_score(&y_test, &model.predict(&x_test)?)?;
        info!(
            train_f1 = train_metric.f1_score,
            test_f1 = test_metric.f1_score,
            test_accuracy = test_metric.accuracy,
            "model scored"
        );

        let rejection = self.quality_gate(&train_metric, &test_metric);
        if let Some(reason) = &rejection {
            if self.config.enforce_quality_gate {
                return Err(PipelineError::Training(reason.clone()));
            }
            warn!(reason = %reason, "model did not pass the quality gate");
        }

        let preprocessor: Preprocessor =
            read_json(&self.transformation_artifact.transformed_object_file_path)?;
        NetworkModel::new(preprocessor, model).save(&self.config.trained_model_file_path)?;
        info!(path = %self.config.trained_model_file_path.display(), "saved model");

        Ok(ModelTrainerArtifact {
            trained_model_file_path: self.config.trained_model_file_path.clone(),
            train_metric_artifact: train_metric,
            test_metric_artifact: test_metric,
            quality_gate_passed: rejection.is_none(),
        })
    }

    /// Reason the scores fall short of the configured gate, if they do.
    fn quality_gate(
        &self,
        train_metric: &ClassificationMetricArtifact,
        test_metric: &ClassificationMetricArtifact,
    ) -> Option<String> {
        if test_metric.f1_score < self.config.expected_score {
            return Some(format!(
                "test f1 {:.4} is below the expected score {:.4}",
                test_metric.f1_score, self.config.expected_score
            ));
        }
        let gap = (train_metric.f1_score - test_metric.f1_score).abs();
        if gap > self.config.overfitting_threshold {
            return Some(format!(
                "train/test f1 gap {gap:.4} exceeds the overfitting threshold {:.4}",
                self.config.overfitting_threshold
            ));
        }
        None
    }
}

/// Splits a transformed array into features and the trailing target column.
fn split_target(array: &Array2<f64>) -> PipelineResult<(Array2<f64>, Array1<f64>)> {
    if array.ncols() < 2 || array.nrows() == 0 {
        return Err(PipelineError::Training(format!(
            "transformed array has shape {:?}; need at least one feature column and the target",
            array.dim()
        )));
    }
    let last = array.ncols() - 1;
    Ok((array.slice(s![.., ..last]).to_owned(), array.column(last).to_owned()))
}
