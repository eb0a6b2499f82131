//! Model training and evaluation.
//!
//! [`TrainedModel`] puts the three classifier variants behind one
//! serializable type; [`train`] and [`evaluate`] are the trainer/evaluator
//! entry points used by the pipeline and the CLI.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::classification::MultinomialNB;
use crate::data::{BOT, HUMAN};
use crate::error::{BotDetectError, Result};
use crate::metrics::{accuracy, roc_curve, ConfusionMatrix, Evaluation};
use crate::pipeline::PipelineConfig;
use crate::primitives::Matrix;
use crate::traits::Classifier;
use crate::tree::{DecisionTreeClassifier, RandomForestClassifier};

/// Classifier variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Multinomial Naive Bayes
    Bayesian,
    /// Single CART decision tree
    Tree,
    /// Random forest of CART trees
    Forest,
}

impl ModelKind {
    /// Every variant, in reporting order.
    pub const ALL: [ModelKind; 3] = [ModelKind::Bayesian, ModelKind::Tree, ModelKind::Forest];

    /// Lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ModelKind::Bayesian => "bayesian",
            ModelKind::Tree => "tree",
            ModelKind::Forest => "forest",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = BotDetectError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bayesian" | "bayes" | "nb" => Ok(ModelKind::Bayesian),
            "tree" => Ok(ModelKind::Tree),
            "forest" => Ok(ModelKind::Forest),
            other => Err(BotDetectError::invalid_hyperparameter(
                "model kind",
                other,
                "one of bayesian, tree, forest",
            )),
        }
    }
}

/// A classifier of any supported kind.
///
/// Before `fit` (or after construction without import) every prediction
/// method returns `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrainedModel {
    /// Multinomial Naive Bayes
    Bayesian(MultinomialNB),
    /// Single decision tree
    Tree(DecisionTreeClassifier),
    /// Random forest
    Forest(RandomForestClassifier),
}

impl TrainedModel {
    /// Unfitted model of `kind` with hyperparameters from `config`.
    #[must_use]
    pub fn new(kind: ModelKind, config: &PipelineConfig) -> Self {
        match kind {
            ModelKind::Bayesian => {
                TrainedModel::Bayesian(MultinomialNB::new().with_alpha(config.bayes_alpha))
            }
            ModelKind::Tree => {
                let mut tree = DecisionTreeClassifier::new()
                    .with_max_depth_opt(config.tree.max_depth)
                    .with_criterion(config.tree.criterion);
                if let Some(seed) = config.tree.random_state {
                    tree = tree.with_random_state(seed);
                }
                TrainedModel::Tree(tree)
            }
            ModelKind::Forest => TrainedModel::Forest(
                RandomForestClassifier::new(config.forest.n_trees)
                    .with_n_jobs(config.forest.n_jobs)
                    .with_max_depth_opt(config.forest.max_depth)
                    .with_criterion(config.forest.criterion)
                    .with_random_state_opt(config.forest.random_state),
            ),
        }
    }

    /// Variant of this model.
    #[must_use]
    pub fn kind(&self) -> ModelKind {
        match self {
            TrainedModel::Bayesian(_) => ModelKind::Bayesian,
            TrainedModel::Tree(_) => ModelKind::Tree,
            TrainedModel::Forest(_) => ModelKind::Forest,
        }
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            TrainedModel::Bayesian(m) => m,
            TrainedModel::Tree(m) => m,
            TrainedModel::Forest(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Classifier {
        match self {
            TrainedModel::Bayesian(m) => m,
            TrainedModel::Tree(m) => m,
            TrainedModel::Forest(m) => m,
        }
    }
}

impl Classifier for TrainedModel {
    fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
        self.inner_mut().fit(x, y)
    }

    fn predict(&self, x: &Matrix<f32>) -> Option<Vec<usize>> {
        self.inner().predict(x)
    }

    fn predict_scores(&self, x: &Matrix<f32>) -> Option<Vec<f32>> {
        self.inner().predict_scores(x)
    }

    fn n_features(&self) -> Option<usize> {
        self.inner().n_features()
    }
}

/// Trains a model of `kind` on scaled features.
///
/// # Errors
///
/// Returns `InsufficientData` unless both labels are present, and any
/// error raised by the estimator's `fit`.
pub fn train(
    x: &Matrix<f32>,
    y: &[usize],
    kind: ModelKind,
    config: &PipelineConfig,
) -> Result<TrainedModel> {
    let bots = y.iter().filter(|&&l| l == BOT).count();
    let humans = y.iter().filter(|&&l| l == HUMAN).count();
    if bots == 0 || humans == 0 {
        return Err(BotDetectError::InsufficientData { bots, humans });
    }

    let mut model = TrainedModel::new(kind, config);
    model.fit(x, y)?;
    tracing::info!(%kind, rows = y.len(), features = x.n_cols(), "model trained");
    Ok(model)
}

/// Scores a model on held-out scaled features.
///
/// ROC and AUC are computed from the model's class-1 scores; they are
/// `None` when the held-out labels contain a single class.
///
/// # Errors
///
/// Returns `ModelNotReady` if the model cannot predict `x` (unfitted or
/// trained on a different width), `DimensionMismatch` if `y` does not
/// match `x`, and `InsufficientData` for an empty held-out set.
pub fn evaluate(model: &TrainedModel, x: &Matrix<f32>, y: &[usize]) -> Result<Evaluation> {
    if x.n_rows() != y.len() {
        return Err(BotDetectError::dimension_mismatch("labels", x.n_rows(), y.len()));
    }
    if y.is_empty() {
        return Err(BotDetectError::InsufficientData { bots: 0, humans: 0 });
    }

    let predictions = model.predict(x).ok_or(BotDetectError::ModelNotReady)?;
    let scores = model.predict_scores(x).ok_or(BotDetectError::ModelNotReady)?;

    let roc = match roc_curve(y, &scores) {
        Ok(roc) => Some(roc),
        Err(BotDetectError::InsufficientData { bots, humans }) => {
            tracing::warn!(bots, humans, "held-out set has one class, ROC undefined");
            None
        }
        Err(e) => return Err(e),
    };

    let evaluation = Evaluation {
        accuracy: accuracy(&predictions, y),
        auc: roc.as_ref().map(|r| r.auc()),
        roc,
        confusion: ConfusionMatrix::from_predictions(&predictions, y),
    };
    tracing::debug!(
        kind = %model.kind(),
        accuracy = evaluation.accuracy,
        auc = ?evaluation.auc,
        "model evaluated"
    );
    Ok(evaluation)
}
