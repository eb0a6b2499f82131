//! Probabilistic classifiers.
//!
//! Currently one estimator: [`MultinomialNB`], the "bayesian" model kind.

use serde::{Deserialize, Serialize};

use crate::error::{BotDetectError, Result};
use crate::primitives::Matrix;
use crate::traits::{accepts_input, check_fit_input, Classifier};

/// Smallest effective smoothing, so a zero `alpha` never produces `ln(0)`.
const MIN_ALPHA: f32 = 1e-10;

/// Multinomial Naive Bayes classifier.
///
/// Treats each feature as a count (or frequency) and models every class as
/// a multinomial over features with additive (Lidstone) smoothing `alpha`.
/// Min-max scaled features are non-negative; any negative input that slips
/// through (test data below the training minimum) is read as zero.
///
/// # Example
///
/// ```
/// use botdetect::classification::MultinomialNB;
/// use botdetect::primitives::Matrix;
/// use botdetect::traits::Classifier;
///
/// let x = Matrix::from_vec(4, 2, vec![
///     5.0, 0.0,
///     4.0, 1.0,
///     0.0, 5.0,
///     1.0, 4.0,
/// ]).expect("4x2 matrix with 8 values");
/// let y = vec![0, 0, 1, 1];
///
/// let mut model = MultinomialNB::new();
/// model.fit(&x, &y).expect("Valid training data");
/// assert_eq!(model.predict(&x), Some(vec![0, 0, 1, 1]));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultinomialNB {
    /// Additive smoothing
    alpha: f32,
    /// Sorted class labels
    classes: Option<Vec<usize>>,
    /// ln P(y=c)
    class_log_prior: Option<Vec<f32>>,
    /// ln P(x_j | y=c): feature_log_prob[class][feature]
    feature_log_prob: Option<Vec<Vec<f32>>>,
}

impl MultinomialNB {
    /// Creates an unfitted model with `alpha = 0.0009`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            alpha: 0.0009,
            classes: None,
            class_log_prior: None,
            feature_log_prob: None,
        }
    }

    /// Sets the smoothing parameter.
    #[must_use]
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Smoothing parameter.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Class labels seen during fit.
    #[must_use]
    pub fn classes(&self) -> Option<&[usize]> {
        self.classes.as_deref()
    }

    /// Posterior probability of each class, per sample.
    ///
    /// Columns follow [`classes`](Self::classes). `None` if unfitted or the
    /// input width differs from training.
    #[must_use]
    pub fn predict_proba(&self, x: &Matrix<f32>) -> Option<Vec<Vec<f32>>> {
        if !accepts_input("bayesian", self.n_features(), x) {
            return None;
        }
        let priors = self.class_log_prior.as_ref()?;
        let feature_log_prob = self.feature_log_prob.as_ref()?;

        let probabilities = x
            .rows()
            .map(|row| {
                let log_probs: Vec<f32> = priors
                    .iter()
                    .zip(feature_log_prob)
                    .map(|(&prior, log_prob)| {
                        prior
                            + row
                                .iter()
                                .zip(log_prob)
                                .map(|(&v, &lp)| v.max(0.0) * lp)
                                .sum::<f32>()
                    })
                    .collect();

                // log-sum-exp
                let max_log_prob = log_probs.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                let exp_probs: Vec<f32> = log_probs
                    .iter()
                    .map(|&log_p| (log_p - max_log_prob).exp())
                    .collect();
                let sum: f32 = exp_probs.iter().sum();
                exp_probs.iter().map(|p| p / sum).collect()
            })
            .collect();

        Some(probabilities)
    }
}

impl Default for MultinomialNB {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for MultinomialNB {
    /// Computes class priors and smoothed per-class feature distributions.
    ///
    /// # Errors
    ///
    /// Returns an error on mismatched or empty input, fewer than two
    /// classes, or a negative `alpha`.
    fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
        check_fit_input(x, y)?;
        if !(self.alpha >= 0.0) {
            return Err(BotDetectError::invalid_hyperparameter(
                "alpha",
                self.alpha,
                ">= 0",
            ));
        }

        let mut classes: Vec<usize> = y.to_vec();
        classes.sort_unstable();
        classes.dedup();
        if classes.len() < 2 {
            return Err("Need at least 2 classes".into());
        }

        let n_features = x.n_cols();
        let n_samples = y.len() as f32;
        let alpha = self.alpha.max(MIN_ALPHA);

        let mut class_log_prior = Vec::with_capacity(classes.len());
        let mut feature_log_prob = Vec::with_capacity(classes.len());

        for &class_label in &classes {
            let mut counts = vec![0.0_f32; n_features];
            let mut n_class = 0usize;
            for (row, _) in x.rows().zip(y).filter(|(_, &label)| label == class_label) {
                n_class += 1;
                for (count, &v) in counts.iter_mut().zip(row) {
                    *count += v.max(0.0);
                }
            }
            class_log_prior.push((n_class as f32 / n_samples).ln());

            let total: f32 = counts.iter().sum::<f32>() + alpha * n_features as f32;
            feature_log_prob.push(
                counts
                    .iter()
                    .map(|&c| ((c + alpha) / total).ln())
                    .collect(),
            );
        }

        tracing::debug!(
            samples = y.len(),
            features = n_features,
            classes = classes.len(),
            "fitted multinomial naive bayes"
        );

        self.classes = Some(classes);
        self.class_log_prior = Some(class_log_prior);
        self.feature_log_prob = Some(feature_log_prob);
        Ok(())
    }

    fn predict(&self, x: &Matrix<f32>) -> Option<Vec<usize>> {
        let classes = self.classes.as_ref()?;
        let probabilities = self.predict_proba(x)?;
        Some(
            probabilities
                .iter()
                .map(|probs| {
                    // first maximum wins, so ties go to the lower label
                    let mut best = 0;
                    for (idx, &p) in probs.iter().enumerate() {
                        if p > probs[best] {
                            best = idx;
                        }
                    }
                    classes[best]
                })
                .collect(),
        )
    }

    fn predict_scores(&self, x: &Matrix<f32>) -> Option<Vec<f32>> {
        let positive = self.classes.as_ref()?.iter().position(|&c| c == 1);
        let probabilities = self.predict_proba(x)?;
        Some(
            probabilities
                .iter()
                .map(|probs| positive.map_or(0.0, |idx| probs[idx]))
                .collect(),
        )
    }

    fn n_features(&self) -> Option<usize> {
        self.feature_log_prob
            .as_ref()
            .and_then(|f| f.first())
            .map(Vec::len)
    }
}
