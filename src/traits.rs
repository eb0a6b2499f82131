//! Core traits for classifiers and transformers.
//!
//! These traits define the fit/predict contract every classifier variant
//! honours and the fit/transform contract of the feature scaler.

use crate::error::Result;
use crate::primitives::Matrix;

/// Binary (or multi-class) classifier with a fit/predict capability.
///
/// `predict` and `predict_scores` fail closed: they return `None` when the
/// classifier has not been fitted (or imported), and when the input width
/// differs from the width seen during training.
///
/// # Examples
///
/// ```
/// use botdetect::prelude::*;
///
/// let x = Matrix::from_vec(4, 1, vec![0.0, 0.1, 0.9, 1.0]).unwrap();
/// let y = vec![0, 0, 1, 1];
///
/// let mut tree = DecisionTreeClassifier::new();
/// assert!(tree.predict(&x).is_none());
///
/// tree.fit(&x, &y).unwrap();
/// assert_eq!(tree.predict(&x), Some(vec![0, 0, 1, 1]));
/// ```
pub trait Classifier {
    /// Fits the classifier to training data.
    ///
    /// # Errors
    ///
    /// Returns an error if `x` and `y` disagree in length, the input is
    /// empty, or the estimator rejects its hyperparameters.
    fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()>;

    /// Predicts class labels, or `None` if the classifier cannot answer.
    fn predict(&self, x: &Matrix<f32>) -> Option<Vec<usize>>;

    /// Probability-like score for class 1 per sample, or `None` if the
    /// classifier cannot answer.
    fn predict_scores(&self, x: &Matrix<f32>) -> Option<Vec<f32>>;

    /// Number of features seen during `fit`, `None` while unfitted.
    fn n_features(&self) -> Option<usize>;

    /// Returns true once the classifier can produce predictions.
    fn is_fitted(&self) -> bool {
        self.n_features().is_some()
    }

    /// Fraction of correct predictions, `None` when `predict` is `None`.
    fn score(&self, x: &Matrix<f32>, y: &[usize]) -> Option<f32> {
        let predictions = self.predict(x)?;
        if y.is_empty() || predictions.len() != y.len() {
            return None;
        }
        Some(crate::metrics::accuracy(&predictions, y))
    }
}

/// Trait for data transformers (scalers).
pub trait Transformer {
    /// Fits the transformer to data.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails.
    fn fit(&mut self, x: &Matrix<f32>) -> Result<()>;

    /// Transforms data using fitted parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if transformer is not fitted.
    fn transform(&self, x: &Matrix<f32>) -> Result<Matrix<f32>>;

    /// Fits and transforms in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails.
    fn fit_transform(&mut self, x: &Matrix<f32>) -> Result<Matrix<f32>> {
        self.fit(x)?;
        self.transform(x)
    }
}

/// Checks an inference input against the training width.
///
/// Returns `false` (and logs) when the model is unfitted or the widths
/// disagree, so callers can return `None`.
pub(crate) fn accepts_input(model: &str, trained: Option<usize>, x: &Matrix<f32>) -> bool {
    match trained {
        None => false,
        Some(expected) if expected != x.n_cols() => {
            tracing::warn!(
                model,
                expected,
                actual = x.n_cols(),
                "refusing prediction: input width differs from training width"
            );
            false
        }
        Some(_) => true,
    }
}

/// Validates the shared preconditions of every `fit`.
pub(crate) fn check_fit_input(x: &Matrix<f32>, y: &[usize]) -> Result<()> {
    let n_rows = x.n_rows();
    if n_rows != y.len() {
        return Err(crate::error::BotDetectError::dimension_mismatch(
            "labels",
            n_rows,
            y.len(),
        ));
    }
    if n_rows == 0 {
        return Err("Cannot fit with zero samples".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BotDetectError;

    // Predicts the label seen most often during fit.
    struct MajorityClassifier {
        label: Option<usize>,
        width: Option<usize>,
    }

    impl MajorityClassifier {
        fn new() -> Self {
            Self {
                label: None,
                width: None,
            }
        }
    }

    impl Classifier for MajorityClassifier {
        fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
            check_fit_input(x, y)?;
            let ones = y.iter().filter(|&&l| l == 1).count();
            self.label = Some(usize::from(ones * 2 > y.len()));
            self.width = Some(x.n_cols());
            Ok(())
        }

        fn predict(&self, x: &Matrix<f32>) -> Option<Vec<usize>> {
            if !accepts_input("majority", self.width, x) {
                return None;
            }
            Some(vec![self.label?; x.n_rows()])
        }

        fn predict_scores(&self, x: &Matrix<f32>) -> Option<Vec<f32>> {
            self.predict(x)
                .map(|p| p.into_iter().map(|l| l as f32).collect())
        }

        fn n_features(&self) -> Option<usize> {
            self.width
        }
    }

    #[test]
    fn test_unfitted_classifier_returns_none() {
        let clf = MajorityClassifier::new();
        let x = Matrix::zeros(3, 2);
        assert!(!clf.is_fitted());
        assert!(clf.predict(&x).is_none());
        assert!(clf.score(&x, &[0, 0, 0]).is_none());
    }

    #[test]
    fn test_score_default_uses_accuracy() {
        let mut clf = MajorityClassifier::new();
        let x = Matrix::zeros(4, 1);
        clf.fit(&x, &[1, 1, 1, 0]).expect("valid input");
        let score = clf.score(&x, &[1, 1, 1, 0]).expect("fitted");
        assert!((score - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_width_mismatch_fails_closed() {
        let mut clf = MajorityClassifier::new();
        clf.fit(&Matrix::zeros(2, 3), &[0, 1]).expect("valid input");
        assert!(clf.predict(&Matrix::zeros(2, 4)).is_none());
        assert!(clf.predict(&Matrix::zeros(2, 3)).is_some());
    }

    #[test]
    fn test_check_fit_input_rejects_length_mismatch() {
        let err = check_fit_input(&Matrix::zeros(3, 1), &[0, 1]).unwrap_err();
        assert!(matches!(err, BotDetectError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_check_fit_input_rejects_empty() {
        assert!(check_fit_input(&Matrix::zeros(0, 1), &[]).is_err());
    }

    struct DoublingTransformer {
        fitted: bool,
    }

    impl Transformer for DoublingTransformer {
        fn fit(&mut self, _x: &Matrix<f32>) -> Result<()> {
            self.fitted = true;
            Ok(())
        }

        fn transform(&self, x: &Matrix<f32>) -> Result<Matrix<f32>> {
            if !self.fitted {
                return Err(BotDetectError::ModelNotReady);
            }
            let data = x.as_slice().iter().map(|v| v * 2.0).collect();
            Matrix::from_vec(x.n_rows(), x.n_cols(), data).map_err(Into::into)
        }
    }

    #[test]
    fn test_fit_transform_default() {
        let mut t = DoublingTransformer { fitted: false };
        assert!(t.transform(&Matrix::zeros(1, 1)).is_err());
        let out = t
            .fit_transform(&Matrix::filled(1, 2, 3.0))
            .expect("fit_transform succeeds");
        assert_eq!(out.row(0), &[6.0, 6.0]);
    }
}
