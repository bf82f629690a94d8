//! Fitted feature preprocessing: KNN imputation followed by optional
//! standardization. Everything stored here is learned from the training split.

use crate::error::{PipelineError, PipelineResult};
use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// Fills missing (NaN) cells with the mean of the `n_neighbors` nearest
/// training rows that have the cell, using nan-euclidean distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnnImputer {
    n_neighbors: usize,
    donors: Vec<Vec<Option<f64>>>,
    column_means: Vec<f64>,
}

impl KnnImputer {
    pub fn fit(x: &Array2<f64>, n_neighbors: usize) -> PipelineResult<Self> {
        if n_neighbors == 0 {
            return Err(PipelineError::InvalidConfig("n_neighbors must be >= 1".to_string()));
        }
        if x.nrows() == 0 {
            return Err(PipelineError::DataFormat("cannot fit imputer on zero rows".to_string()));
        }

        let donors = x
            .rows()
            .into_iter()
            .map(|row| row.iter().map(|v| (!v.is_nan()).then_some(*v)).collect())
            .collect();
        let column_means = x
            .columns()
            .into_iter()
            .map(|col| {
                let present: Vec<f64> = col.iter().copied().filter(|v| !v.is_nan()).collect();
                if present.is_empty() {
                    0.0
                } else {
                    #[allow(clippy::cast_precision_loss)]
                    let n = present.len() as f64;
                    present.iter().sum::<f64>() / n
                }
            })
            .collect();

        Ok(Self { n_neighbors, donors, column_means })
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.column_means.len()
    }

    pub fn transform(&self, x: &Array2<f64>) -> PipelineResult<Array2<f64>> {
        check_width(x, self.n_features())?;
        let mut out = x.clone();

        for (row_idx, mut row) in out.axis_iter_mut(Axis(0)).enumerate() {
            let missing: Vec<usize> = (0..row.len()).filter(|&j| row[j].is_nan()).collect();
            if missing.is_empty() {
                continue;
            }

            let source = x.row(row_idx);
            let distances: Vec<Option<f64>> =
                self.donors.iter().map(|donor| nan_euclidean(source, donor)).collect();

            for j in missing {
                let mut candidates: Vec<(f64, usize)> = self
                    .donors
                    .iter()
                    .enumerate()
                    .filter_map(|(idx, donor)| Some((distances[idx]?, idx)).filter(|_| donor[j].is_some()))
                    .collect();
                candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
                candidates.truncate(self.n_neighbors);

                row[j] = if candidates.is_empty() {
                    self.column_means[j]
                } else {
                    #[allow(clippy::cast_precision_loss)]
                    let n = candidates.len() as f64;
                    candidates.iter().filter_map(|&(_, idx)| self.donors[idx][j]).sum::<f64>() / n
                };
            }
        }

        Ok(out)
    }
}

/// Euclidean distance over coordinates present in both rows, scaled up by the
/// share of coordinates that were present. `None` when nothing overlaps.
fn nan_euclidean(a: ArrayView1<'_, f64>, b: &[Option<f64>]) -> Option<f64> {
    let mut sum = 0.0;
    let mut present = 0_usize;
    for (x, y) in a.iter().zip(b) {
        if let (false, Some(y)) = (x.is_nan(), y) {
            sum += (x - y) * (x - y);
            present += 1;
        }
    }
    if present == 0 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let weight = b.len() as f64 / present as f64;
    Some((weight * sum).sqrt())
}

/// Zero-mean, unit-variance scaling; constant columns are only centered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(x: &Array2<f64>) -> PipelineResult<Self> {
        if x.nrows() == 0 {
            return Err(PipelineError::DataFormat("cannot fit scaler on zero rows".to_string()));
        }
        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| PipelineError::DataFormat("cannot fit scaler on zero rows".to_string()))?;
        let std = x.std_axis(Axis(0), 0.0);
        Ok(Self {
            mean: mean.to_vec(),
            scale: std.iter().map(|&s| if s > f64::EPSILON { s } else { 1.0 }).collect(),
        })
    }

    pub fn transform(&self, x: &Array2<f64>) -> PipelineResult<Array2<f64>> {
        check_width(x, self.mean.len())?;
        let mut out = x.clone();
        for mut row in out.axis_iter_mut(Axis(0)) {
            for (j, v) in row.iter_mut().enumerate() {
                *v = (*v - self.mean[j]) / self.scale[j];
            }
        }
        Ok(out)
    }
}

/// The serialized transformer object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    pub feature_columns: Vec<String>,
    imputer: KnnImputer,
    scaler: Option<StandardScaler>,
}

impl Preprocessor {
    pub fn fit(
        feature_columns: Vec<String>,
        x_train: &Array2<f64>,
        n_neighbors: usize,
        scale: bool,
    ) -> PipelineResult<Self> {
        check_width(x_train, feature_columns.len())?;
        let imputer = KnnImputer::fit(x_train, n_neighbors)?;
        let scaler = if scale { Some(StandardScaler::fit(&imputer.transform(x_train)?)?) } else { None };
        Ok(Self { feature_columns, imputer, scaler })
    }

    pub fn transform(&self, x: &Array2<f64>) -> PipelineResult<Array2<f64>> {
        let imputed = self.imputer.transform(x)?;
        match &self.scaler {
            Some(scaler) => scaler.transform(&imputed),
            None => Ok(imputed),
        }
    }
}

fn check_width(x: &Array2<f64>, expected: usize) -> PipelineResult<()> {
    if x.ncols() == expected {
        Ok(())
    } else {
        Err(PipelineError::DataFormat(format!(
            "expected {expected} feature columns, found {}",
            x.ncols()
        )))
    }
}
