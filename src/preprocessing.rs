//! Feature preprocessing: standard scaling for continuous rating factors
//! and one-hot encoding for categorical ones. Transformers are fit on the
//! training rows only; the fitted state is a separate type so transform
//! cannot be called before fit.

use std::error::Error;
use std::fmt;

use ndarray::{Array1, Array2, Axis};

/// Error type for preprocessing operations
#[derive(Debug)]
pub enum PreprocessingError {
    /// Empty data provided where non-empty was required
    EmptyData(String),
    /// Feature dimension mismatch between fit and transform
    FeatureMismatch { expected: usize, got: usize },
    /// A category at transform time that was never seen during fit
    UnknownCategory(String),
}

impl fmt::Display for PreprocessingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreprocessingError::EmptyData(msg) => write!(f, "Empty data: {}", msg),
            PreprocessingError::FeatureMismatch { expected, got } => {
                write!(f, "Feature mismatch: expected {} columns, got {}", expected, got)
            }
            PreprocessingError::UnknownCategory(value) => {
                write!(f, "Unknown category: {:?}", value)
            }
        }
    }
}

impl Error for PreprocessingError {}

/// Standard scaler (z-score normalization). Fit learns per-column mean and
/// standard deviation; transform maps x to (x - mean) / std.
pub struct StandardScaler;

impl StandardScaler {
    pub fn fit(data: &Array2<f32>) -> Result<FittedScaler, PreprocessingError> {
        if data.nrows() == 0 {
            return Err(PreprocessingError::EmptyData(
                "Cannot fit StandardScaler on empty data".to_string(),
            ));
        }

        let mean = data.mean_axis(Axis(0)).unwrap();
        let n = data.nrows() as f32;
        let variance = data
            .axis_iter(Axis(1))
            .zip(mean.iter())
            .map(|(col, &m)| col.mapv(|x| (x - m).powi(2)).sum() / n)
            .collect::<Array1<f32>>();

        // Constant columns scale by 1 so they map to zero, not NaN
        let std = variance.mapv(|v| {
            let s = v.sqrt();
            if s == 0.0 {
                1.0
            } else {
                s
            }
        });

        Ok(FittedScaler {
            mean,
            std,
            n_features: data.ncols(),
        })
    }
}

/// A fitted standard scaler ready to transform
pub struct FittedScaler {
    pub mean: Array1<f32>,
    pub std: Array1<f32>,
    n_features: usize,
}

impl FittedScaler {
    pub fn transform(&self, data: &Array2<f32>) -> Result<Array2<f32>, PreprocessingError> {
        if data.ncols() != self.n_features {
            return Err(PreprocessingError::FeatureMismatch {
                expected: self.n_features,
                got: data.ncols(),
            });
        }

        let mut out = data.clone();
        for mut row in out.axis_iter_mut(Axis(0)) {
            row -= &self.mean;
            row /= &self.std;
        }
        Ok(out)
    }
}

/// One-hot encoder for a single categorical column. Categories are the
/// sorted distinct values seen during fit.
pub struct OneHotEncoder;

impl OneHotEncoder {
    pub fn fit(values: &[String]) -> Result<FittedOneHot, PreprocessingError> {
        if values.is_empty() {
            return Err(PreprocessingError::EmptyData(
                "Cannot fit OneHotEncoder on empty data".to_string(),
            ));
        }

        let mut categories: Vec<String> = values.to_vec();
        categories.sort();
        categories.dedup();

        Ok(FittedOneHot { categories })
    }
}

/// A fitted one-hot encoder ready to transform
pub struct FittedOneHot {
    pub categories: Vec<String>,
}

impl FittedOneHot {
    /// Number of indicator columns this encoding produces
    pub fn width(&self) -> usize {
        self.categories.len()
    }

    /// Encodes one value as indicator columns
    pub fn encode(&self, value: &str) -> Result<Vec<f32>, PreprocessingError> {
        let index = self
            .categories
            .iter()
            .position(|c| c == value)
            .ok_or_else(|| PreprocessingError::UnknownCategory(value.to_string()))?;

        let mut row = vec![0.0; self.categories.len()];
        row[index] = 1.0;
        Ok(row)
    }

    pub fn transform(&self, values: &[String]) -> Result<Array2<f32>, PreprocessingError> {
        let mut out = Array2::zeros((values.len(), self.categories.len()));
        for (i, value) in values.iter().enumerate() {
            let row = self.encode(value)?;
            for (j, v) in row.into_iter().enumerate() {
                out[[i, j]] = v;
            }
        }
        Ok(out)
    }
}
