use crate::artifacts::ClassificationMetricArtifact;
use crate::error::{PipelineError, PipelineResult};
use ndarray::Array1;

/// Binary classification scores with 1 as the positive label. Undefined
/// ratios (no predicted or no actual positives) score 0.
pub fn get_classification_score(
    y_true: &Array1<f64>,
    y_pred: &Array1<f64>,
) -> PipelineResult<ClassificationMetricArtifact> {
    if y_true.len() != y_pred.len() {
        return Err(PipelineError::Training(format!(
            "cannot score {} predictions against {} labels",
            y_pred.len(),
            y_true.len()
        )));
    }
    if y_true.is_empty() {
        return Err(PipelineError::Training("cannot score an empty split".to_string()));
    }

    let (mut tp, mut fp, mut fn_, mut correct) = (0_u32, 0_u32, 0_u32, 0_u32);
    for (&t, &p) in y_true.iter().zip(y_pred) {
        let (t, p) = (t >= 0.5, p >= 0.5);
        match (t, p) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (true, false) => fn_ += 1,
            (false, false) => {}
        }
        if t == p {
            correct += 1;
        }
    }

    let ratio = |num: u32, den: u32| if den == 0 { 0.0 } else { f64::from(num) / f64::from(den) };
    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);
    let f1 = if precision + recall > 0.0 { 2.0 * precision * recall / (precision + recall) } else { 0.0 };
    #[allow(clippy::cast_possible_truncation)]
    let accuracy = ratio(correct, y_true.len() as u32);

    Ok(ClassificationMetricArtifact {
        f1_score: f1,
        precision_score: precision,
        recall_score: recall,
        accuracy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_scores() {
        let y_true = array![1.0, 1.0, 0.0, 0.0];
        let y_pred = array![1.0, 0.0, 1.0, 0.0];
        let m = get_classification_score(&y_true, &y_pred).unwrap();
        assert!((m.precision_score - 0.5).abs() < 1e-12);
        assert!((m.recall_score - 0.5).abs() < 1e-12);
        assert!((m.f1_score - 0.5).abs() < 1e-12);
        assert!((m.accuracy - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_no_positive_predictions_score_zero() {
        let m = get_classification_score(&array![1.0, 0.0], &array![0.0, 0.0]).unwrap();
        assert!(m.precision_score.abs() < 1e-12);
        assert!(m.f1_score.abs() < 1e-12);
        assert!((m.accuracy - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_length_mismatch_is_error() {
        assert!(get_classification_score(&array![1.0], &array![1.0, 0.0]).is_err());
    }
}
