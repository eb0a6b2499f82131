//! Evaluation metrics for binary bot/non-bot classification.
//!
//! Label `1` is the positive (bot) class throughout.

use serde::{Deserialize, Serialize};

use crate::error::{BotDetectError, Result};

/// Compute classification accuracy.
///
/// accuracy = `correct_predictions` / `total_predictions`
///
/// # Panics
///
/// Panics if vectors have different lengths or are empty.
///
/// # Examples
///
/// ```
/// use botdetect::metrics::accuracy;
///
/// let y_true = vec![0, 1, 1, 0];
/// let y_pred = vec![0, 1, 0, 0];
/// assert!((accuracy(&y_pred, &y_true) - 0.75).abs() < 1e-6);
/// ```
#[must_use]
pub fn accuracy(y_pred: &[usize], y_true: &[usize]) -> f32 {
    assert_eq!(y_pred.len(), y_true.len(), "Vectors must have same length");
    assert!(!y_true.is_empty(), "Vectors cannot be empty");

    let correct = y_pred
        .iter()
        .zip(y_true.iter())
        .filter(|(p, t)| p == t)
        .count();

    correct as f32 / y_true.len() as f32
}

/// Binary confusion matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    /// Bots flagged as bots
    pub tp: usize,
    /// Humans passed as humans
    pub tn: usize,
    /// Humans flagged as bots
    pub fp: usize,
    /// Bots passed as humans
    pub fn_: usize,
}

impl ConfusionMatrix {
    /// Create a new empty confusion matrix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a matrix from paired predictions and ground truth.
    #[must_use]
    pub fn from_predictions(y_pred: &[usize], y_true: &[usize]) -> Self {
        let mut cm = Self::new();
        for (&p, &t) in y_pred.iter().zip(y_true) {
            cm.record(t == 1, p == 1);
        }
        cm
    }

    /// Record a prediction.
    pub fn record(&mut self, actual_bot: bool, predicted_bot: bool) {
        match (actual_bot, predicted_bot) {
            (true, true) => self.tp += 1,
            (false, false) => self.tn += 1,
            (false, true) => self.fp += 1,
            (true, false) => self.fn_ += 1,
        }
    }

    /// Total number of samples.
    #[must_use]
    pub fn total(&self) -> usize {
        self.tp + self.tn + self.fp + self.fn_
    }

    /// Precision = TP / (TP + FP), 0 when nothing was flagged.
    #[must_use]
    pub fn precision(&self) -> f32 {
        ratio(self.tp, self.tp + self.fp)
    }

    /// Recall (true positive rate) = TP / (TP + FN).
    #[must_use]
    pub fn recall(&self) -> f32 {
        ratio(self.tp, self.tp + self.fn_)
    }

    /// F1 = harmonic mean of precision and recall.
    #[must_use]
    pub fn f1(&self) -> f32 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

fn ratio(num: usize, den: usize) -> f32 {
    if den == 0 {
        0.0
    } else {
        num as f32 / den as f32
    }
}

/// Receiver operating characteristic curve.
///
/// Point `i` is the (FPR, TPR) obtained by flagging every sample whose
/// score is `>= thresholds[i]`. The first point is `(0, 0)` with an
/// infinite threshold, the last is `(1, 1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RocCurve {
    /// False positive rates, non-decreasing
    pub fpr: Vec<f32>,
    /// True positive rates, non-decreasing
    pub tpr: Vec<f32>,
    /// Decreasing score thresholds
    pub thresholds: Vec<f32>,
}

impl RocCurve {
    /// Number of points on the curve.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fpr.len()
    }

    /// True if the curve has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fpr.is_empty()
    }

    /// Area under this curve.
    #[must_use]
    pub fn auc(&self) -> f32 {
        trapezoid(&self.fpr, &self.tpr)
    }
}

/// Computes the ROC curve of `scores` against binary ground truth.
///
/// Sweeps every distinct score as a threshold. Hard 0/1 predictions are
/// accepted as scores but give a degenerate three-point curve.
///
/// # Errors
///
/// Returns `DimensionMismatch` if the lengths differ and `InsufficientData`
/// unless both classes are present.
///
/// # Examples
///
/// ```
/// use botdetect::metrics::roc_curve;
///
/// let roc = roc_curve(&[0, 0, 1, 1], &[0.1, 0.4, 0.35, 0.8]).expect("both classes present");
/// assert_eq!(roc.fpr, vec![0.0, 0.0, 0.5, 0.5, 1.0]);
/// assert_eq!(roc.tpr, vec![0.0, 0.5, 0.5, 1.0, 1.0]);
/// assert!((roc.auc() - 0.75).abs() < 1e-6);
/// ```
pub fn roc_curve(y_true: &[usize], scores: &[f32]) -> Result<RocCurve> {
    if y_true.len() != scores.len() {
        return Err(BotDetectError::dimension_mismatch(
            "scores",
            y_true.len(),
            scores.len(),
        ));
    }
    let positives = y_true.iter().filter(|&&t| t == 1).count();
    let negatives = y_true.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(BotDetectError::InsufficientData {
            bots: positives,
            humans: negatives,
        });
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut fpr = vec![0.0];
    let mut tpr = vec![0.0];
    let mut thresholds = vec![f32::INFINITY];
    let (mut tp, mut fp) = (0usize, 0usize);

    for (pos, &idx) in order.iter().enumerate() {
        if y_true[idx] == 1 {
            tp += 1;
        } else {
            fp += 1;
        }
        // emit a point once all samples sharing this score are counted
        let last_of_group = order
            .get(pos + 1)
            .map_or(true, |&next| scores[next].total_cmp(&scores[idx]).is_ne());
        if last_of_group {
            fpr.push(fp as f32 / negatives as f32);
            tpr.push(tp as f32 / positives as f32);
            thresholds.push(scores[idx]);
        }
    }

    Ok(RocCurve {
        fpr,
        tpr,
        thresholds,
    })
}

fn trapezoid(x: &[f32], y: &[f32]) -> f32 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| (xs[1] - xs[0]) * (ys[1] + ys[0]) / 2.0)
        .sum()
}

/// Area under a curve by the trapezoidal rule.
///
/// # Errors
///
/// Returns an error if the inputs differ in length or hold fewer than two
/// points.
pub fn auc(x: &[f32], y: &[f32]) -> Result<f32> {
    if x.len() != y.len() {
        return Err(BotDetectError::dimension_mismatch("points", x.len(), y.len()));
    }
    if x.len() < 2 {
        return Err("At least 2 points are needed to compute area under curve".into());
    }
    Ok(trapezoid(x, y))
}

/// Area under the ROC curve of `scores`.
///
/// # Errors
///
/// Same as [`roc_curve`].
pub fn roc_auc_score(y_true: &[usize], scores: &[f32]) -> Result<f32> {
    Ok(roc_curve(y_true, scores)?.auc())
}

/// Result of evaluating one model on a held-out set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Fraction of correct predictions
    pub accuracy: f32,
    /// ROC curve, `None` if the held-out set lacks a class
    pub roc: Option<RocCurve>,
    /// Area under `roc`
    pub auc: Option<f32>,
    /// Counts of each prediction outcome
    pub confusion: ConfusionMatrix,
}
