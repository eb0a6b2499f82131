//! Min-max feature scaling.
//!
//! The scaler is fitted on training features only; the captured bounds are
//! then applied, never refitted, to test and inference features.

use serde::{Deserialize, Serialize};

use crate::error::{BotDetectError, Result};
use crate::primitives::Matrix;
use crate::traits::Transformer;

/// Ranges at or below this are treated as constant columns.
const MIN_RANGE: f32 = 1e-10;

/// Per-column bounds captured by [`MinMaxScaler::fit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerState {
    /// Minimum of each column in the training data
    pub data_min: Vec<f32>,
    /// Maximum of each column in the training data
    pub data_max: Vec<f32>,
}

impl ScalerState {
    /// Computes column bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if `x` has no rows, holds a non-finite value, or a
    /// column's range overflows `f32`.
    pub fn fit(x: &Matrix<f32>) -> Result<Self> {
        let (n_samples, n_features) = x.shape();

        if n_samples == 0 {
            return Err("Cannot fit with zero samples".into());
        }

        let mut data_min = vec![f32::INFINITY; n_features];
        let mut data_max = vec![f32::NEG_INFINITY; n_features];

        for row in x.rows() {
            for (j, &val) in row.iter().enumerate() {
                if !val.is_finite() {
                    return Err(format!("Cannot fit on non-finite value {val} in column {j}").into());
                }
                if val < data_min[j] {
                    data_min[j] = val;
                }
                if val > data_max[j] {
                    data_max[j] = val;
                }
            }
        }

        if let Some(j) = (0..n_features).find(|&j| !(data_max[j] - data_min[j]).is_finite()) {
            return Err(format!("Column {j} range overflows f32").into());
        }

        Ok(Self { data_min, data_max })
    }

    /// Number of columns the bounds cover.
    #[must_use]
    pub fn width(&self) -> usize {
        self.data_min.len()
    }

    /// Scales `x` with the captured bounds.
    ///
    /// Values outside the training range map outside `[0, 1]`; they are not
    /// clipped. Constant columns map to `0.0`.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if `x` has a different width.
    pub fn apply(&self, x: &Matrix<f32>) -> Result<Matrix<f32>> {
        let (n_samples, n_features) = x.shape();
        if n_features != self.width() || self.data_max.len() != self.width() {
            return Err(BotDetectError::dimension_mismatch(
                "features",
                self.width(),
                n_features,
            ));
        }

        let mut result = Vec::with_capacity(n_samples * n_features);
        for row in x.rows() {
            for (j, &val) in row.iter().enumerate() {
                let data_range = self.data_max[j] - self.data_min[j];
                let scaled = if data_range.abs() > MIN_RANGE {
                    (val - self.data_min[j]) / data_range
                } else {
                    0.0
                };
                result.push(scaled);
            }
        }

        Matrix::from_vec(n_samples, n_features, result).map_err(Into::into)
    }
}

/// Scales each feature to `[0, 1]` using training-set bounds.
///
/// # Example
///
/// ```
/// use botdetect::preprocessing::MinMaxScaler;
/// use botdetect::primitives::Matrix;
/// use botdetect::traits::Transformer;
///
/// let train = Matrix::from_vec(3, 1, vec![0.0, 5.0, 10.0]).expect("3 x 1");
/// let mut scaler = MinMaxScaler::new();
/// let scaled = scaler.fit_transform(&train).expect("fit succeeds");
/// assert_eq!(scaled.column(0), vec![0.0, 0.5, 1.0]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    state: Option<ScalerState>,
}

impl MinMaxScaler {
    /// Creates an unfitted scaler.
    #[must_use]
    pub fn new() -> Self {
        Self { state: None }
    }

    /// Rebuilds a fitted scaler from persisted bounds.
    #[must_use]
    pub fn from_state(state: ScalerState) -> Self {
        Self { state: Some(state) }
    }

    /// Fitted bounds, `None` before `fit`.
    #[must_use]
    pub fn state(&self) -> Option<&ScalerState> {
        self.state.as_ref()
    }

    /// Returns true if the scaler has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    /// Minimum of each feature, `None` before `fit`.
    #[must_use]
    pub fn data_min(&self) -> Option<&[f32]> {
        self.state.as_ref().map(|s| s.data_min.as_slice())
    }

    /// Maximum of each feature, `None` before `fit`.
    #[must_use]
    pub fn data_max(&self) -> Option<&[f32]> {
        self.state.as_ref().map(|s| s.data_max.as_slice())
    }
}

impl Transformer for MinMaxScaler {
    fn fit(&mut self, x: &Matrix<f32>) -> Result<()> {
        let state = ScalerState::fit(x)?;
        tracing::debug!(rows = x.n_rows(), width = state.width(), "fitted scaler");
        self.state = Some(state);
        Ok(())
    }

    fn transform(&self, x: &Matrix<f32>) -> Result<Matrix<f32>> {
        self.state
            .as_ref()
            .ok_or(BotDetectError::ModelNotReady)?
            .apply(x)
    }
}
