use crate::error::{PipelineError, PipelineResult};
use crate::frame::Frame;
use crate::fsio::{read_json, write_json};
use crate::preprocess::Preprocessor;
use crate::transformation::features;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A binary classifier over numeric feature matrices, labels in {0, 1}.
pub trait Classifier {
    fn id(&self) -> &'static str;

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> PipelineResult<()>;

    fn predict(&self, x: &Array2<f64>) -> PipelineResult<Array1<f64>>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticParams {
    pub learning_rate: f64,
    pub epochs: u32,
    pub l2_penalty: f64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self { learning_rate: 0.1, epochs: 500, l2_penalty: 1e-4 }
    }
}

impl LogisticParams {
    pub fn validate(&self) -> PipelineResult<()> {
        if self.epochs == 0 {
            return Err(PipelineError::InvalidConfig("epochs must be >= 1".to_string()));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(PipelineError::InvalidConfig("learning_rate must be > 0".to_string()));
        }
        if !self.l2_penalty.is_finite() || self.l2_penalty < 0.0 {
            return Err(PipelineError::InvalidConfig("l2_penalty must be >= 0".to_string()));
        }
        Ok(())
    }
}

/// Logistic regression fitted by full-batch gradient descent with L2 penalty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub params: LogisticParams,
    weights: Vec<f64>,
    bias: f64,
    final_loss: Option<f64>,
}

impl LogisticRegression {
    #[must_use]
    pub fn new(params: LogisticParams) -> Self {
        Self { params, weights: Vec::new(), bias: 0.0, final_loss: None }
    }

    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.final_loss.is_some()
    }

    #[must_use]
    pub fn final_loss(&self) -> Option<f64> {
        self.final_loss
    }

    pub fn predict_proba(&self, x: &Array2<f64>) -> PipelineResult<Array1<f64>> {
        if !self.is_fitted() {
            return Err(PipelineError::Training("model is not fitted".to_string()));
        }
        if x.ncols() != self.weights.len() {
            return Err(PipelineError::Training(format!(
                "model expects {} features, got {}",
                self.weights.len(),
                x.ncols()
            )));
        }
        let w = Array1::from(self.weights.clone());
        Ok((x.dot(&w) + self.bias).mapv(sigmoid))
    }
}

impl Classifier for LogisticRegression {
    fn id(&self) -> &'static str {
        "logistic-regression"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> PipelineResult<()> {
        self.params.validate()?;
        let (rows, cols) = x.dim();
        if rows == 0 || cols == 0 {
            return Err(PipelineError::Training(format!("cannot fit on a {rows}x{cols} matrix")));
        }
        if y.len() != rows {
            return Err(PipelineError::Training(format!(
                "feature rows ({rows}) and labels ({}) differ",
                y.len()
            )));
        }
        if let Some(bad) = y.iter().find(|v| **v != 0.0 && **v != 1.0) {
            return Err(PipelineError::Training(format!("labels must be 0 or 1, found {bad}")));
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(PipelineError::Training("features contain non-finite values".to_string()));
        }

        #[allow(clippy::cast_precision_loss)]
        let n = rows as f64;
        let lr = self.params.learning_rate;
        let mut w = Array1::<f64>::zeros(cols);
        let mut b = 0.0;

        for _ in 0..self.params.epochs {
            let p = (x.dot(&w) + b).mapv(sigmoid);
            let err = &p - y;
            let grad_w = x.t().dot(&err) / n + &w * self.params.l2_penalty;
            let grad_b = err.sum() / n;
            w.scaled_add(-lr, &grad_w);
            b -= lr * grad_b;
        }

        let p = (x.dot(&w) + b).mapv(sigmoid);
        let loss = log_loss(y, &p);
        if !loss.is_finite() || w.iter().any(|v| !v.is_finite()) || !b.is_finite() {
            return Err(PipelineError::Training(format!(
                "gradient descent diverged (loss {loss}); lower the learning rate"
            )));
        }

        self.weights = w.to_vec();
        self.bias = b;
        self.final_loss = Some(loss);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> PipelineResult<Array1<f64>> {
        Ok(self.predict_proba(x)?.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }))
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn log_loss(y: &Array1<f64>, p: &Array1<f64>) -> f64 {
    let eps = 1e-15;
    let total: f64 = y
        .iter()
        .zip(p)
        .map(|(&y, &p)| {
            let p = p.clamp(eps, 1.0 - eps);
            -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
        })
        .sum();
    #[allow(clippy::cast_precision_loss)]
    let n = y.len() as f64;
    total / n
}

/// The persisted model: the fitted preprocessor plus the classifier, so raw
/// feature rows can be scored directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkModel {
    pub preprocessor: Preprocessor,
    pub model: LogisticRegression,
}

impl NetworkModel {
    #[must_use]
    pub fn new(preprocessor: Preprocessor, model: LogisticRegression) -> Self {
        Self { preprocessor, model }
    }

    /// Predicts labels for a raw table holding (at least) the feature columns.
    pub fn predict(&self, frame: &Frame) -> PipelineResult<Array1<f64>> {
        let x = features(frame, &self.preprocessor.feature_columns)?;
        self.model.predict(&self.preprocessor.transform(&x)?)
    }

    pub fn save(&self, path: &Path) -> PipelineResult<()> {
        write_json(path, self)
    }

    pub fn load(path: &Path) -> PipelineResult<Self> {
        read_json(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn separable() -> (Array2<f64>, Array1<f64>) {
        (
            array![[-2.0, 0.1], [-1.5, -0.2], [-1.0, 0.0], [1.0, 0.1], [1.5, 0.3], [2.0, -0.1]],
            array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
        )
    }

    #[test]
    fn test_fits_separable_data() {
        let (x, y) = separable();
        let mut model = LogisticRegression::new(LogisticParams::default());
        model.fit(&x, &y).unwrap();

        assert_eq!(model.predict(&x).unwrap(), y);
        assert!(model.final_loss().unwrap() < 0.5);
    }

    #[test]
    fn test_rejects_non_binary_labels() {
        let (x, _) = separable();
        let y = array![0.0, 0.0, 2.0, 1.0, 1.0, 1.0];
        let err = LogisticRegression::new(LogisticParams::default()).fit(&x, &y).unwrap_err();
        assert!(matches!(err, PipelineError::Training(_)));
    }

    #[test]
    fn test_rejects_shape_mismatch() {
        let (x, _) = separable();
        let err = LogisticRegression::new(LogisticParams::default())
            .fit(&x, &array![0.0, 1.0])
            .unwrap_err();
        assert!(matches!(err, PipelineError::Training(_)));
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let (x, _) = separable();
        assert!(LogisticRegression::new(LogisticParams::default()).predict(&x).is_err());
    }

    #[test]
    fn test_params_validate() {
        assert!(LogisticParams { epochs: 0, ..Default::default() }.validate().is_err());
        assert!(LogisticParams { learning_rate: f64::NAN, ..Default::default() }.validate().is_err());
        assert!(LogisticParams::default().validate().is_ok());
    }

    #[test]
    fn test_sigmoid_is_stable_at_extremes() {
        assert!((sigmoid(1000.0) - 1.0).abs() < 1e-12);
        assert!(sigmoid(-1000.0).abs() < 1e-12);
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
    }
}
