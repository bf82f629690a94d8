//! Train/test distribution drift via the two-sample Kolmogorov-Smirnov test.

use crate::error::PipelineResult;
use crate::frame::Frame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KsResult {
    pub statistic: f64,
    pub p_value: f64,
}

/// Two-sample KS test with the asymptotic p-value. `None` if a sample is empty.
#[must_use]
pub fn ks_two_sample(a: &[f64], b: &[f64]) -> Option<KsResult> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort_by(f64::total_cmp);
    b.sort_by(f64::total_cmp);

    #[allow(clippy::cast_precision_loss)]
    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let (mut i, mut j) = (0, 0);
    let mut statistic: f64 = 0.0;
    while i < a.len() && j < b.len() {
        let v = a[i].min(b[j]);
        while i < a.len() && a[i] <= v {
            i += 1;
        }
        while j < b.len() && b[j] <= v {
            j += 1;
        }
        #[allow(clippy::cast_precision_loss)]
        let gap = (i as f64 / n1 - j as f64 / n2).abs();
        statistic = statistic.max(gap);
    }

    let en = (n1 * n2 / (n1 + n2)).sqrt();
    let p_value = kolmogorov_survival((en + 0.12 + 0.11 / en) * statistic).clamp(0.0, 1.0);
    Some(KsResult { statistic, p_value })
}

/// P(K > z) for the Kolmogorov distribution.
fn kolmogorov_survival(z: f64) -> f64 {
    // exp() underflows below this
    if z < 0.042 {
        return 1.0;
    }
    if z < 1.18 {
        let y = (-1.233_700_550_136_169_8 / (z * z)).exp();
        let cdf = 2.256_758_334_191_025 * (-y.ln()).sqrt() * (y + y.powi(9) + y.powi(25) + y.powi(49));
        1.0 - cdf
    } else {
        let x = (-2.0 * z * z).exp();
        2.0 * (x - x.powi(4) + x.powi(9))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDrift {
    pub p_value: f64,
    pub statistic: f64,
    pub drift_status: bool,
}

/// Per-column drift results. Columns are kept sorted so the serialized report
/// is byte-identical for identical inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    pub threshold: f64,
    pub drift_detected: bool,
    pub columns: BTreeMap<String, ColumnDrift>,
}

/// Compares `current` against `base` on each named column both frames can
/// parse as numbers; other columns are skipped.
pub fn detect_dataset_drift(
    base: &Frame,
    current: &Frame,
    columns: &[String],
    threshold: f64,
) -> PipelineResult<DriftReport> {
    let mut report = DriftReport { threshold, drift_detected: false, columns: BTreeMap::new() };

    for name in columns {
        let (Ok(base_values), Ok(current_values)) = (base.numeric_column(name), current.numeric_column(name))
        else {
            continue;
        };
        let base_values: Vec<f64> = base_values.into_iter().flatten().collect();
        let current_values: Vec<f64> = current_values.into_iter().flatten().collect();

        let Some(result) = ks_two_sample(&base_values, &current_values) else {
            continue;
        };
        let drift_status = result.p_value < threshold;
        report.drift_detected |= drift_status;
        report.columns.insert(
            name.clone(),
            ColumnDrift { p_value: result.p_value, statistic: result.statistic, drift_status },
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_samples_have_no_drift() {
        let a: Vec<f64> = (0..50).map(f64::from).collect();
        let r = ks_two_sample(&a, &a).unwrap();
        assert!(r.statistic.abs() < 1e-12);
        assert!((r.p_value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_samples_drift() {
        let a: Vec<f64> = (0..50).map(f64::from).collect();
        let b: Vec<f64> = (100..150).map(f64::from).collect();
        let r = ks_two_sample(&a, &b).unwrap();
        assert!((r.statistic - 1.0).abs() < 1e-12);
        assert!(r.p_value < 1e-6);
    }

    #[test]
    fn test_ties_are_handled() {
        let a = [0.0, 0.0, 1.0, 1.0];
        let b = [0.0, 1.0, 1.0, 1.0];
        let r = ks_two_sample(&a, &b).unwrap();
        assert!((r.statistic - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_empty_sample_is_skipped() {
        assert!(ks_two_sample(&[], &[1.0]).is_none());
    }

    #[test]
    fn test_survival_is_monotone() {
        let mut prev = 1.0;
        for step in 1..40 {
            let p = kolmogorov_survival(f64::from(step) * 0.1);
            assert!(p <= prev + 1e-9, "z={}", f64::from(step) * 0.1);
            prev = p;
        }
    }

    #[test]
    fn test_detect_skips_non_numeric_columns() {
        let base = Frame::new(
            vec!["a".into(), "s".into()],
            vec![vec![Some("1".into()), Some("x".into())], vec![Some("2".into()), Some("y".into())]],
        )
        .unwrap();
        let report =
            detect_dataset_drift(&base, &base, &["a".to_string(), "s".to_string()], 0.05).unwrap();
        assert_eq!(report.columns.len(), 1);
        assert!(!report.drift_detected);
    }
}
