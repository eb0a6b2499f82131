//! Random Forest classifier.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::helpers::{accumulate_importances, bootstrap_sample, feature_seed, majority_class};
use super::{DecisionTreeClassifier, SplitCriterion};
use crate::error::{BotDetectError, Result};
use crate::primitives::Matrix;
use crate::traits::{accepts_input, check_fit_input, Classifier};

/// Random Forest classifier - an ensemble of decision trees.
///
/// Each tree is grown on a bootstrap sample with a random feature subset
/// considered at every split; predictions are a majority vote (ties go to
/// the lower label). Trees are trained on a dedicated pool of `n_jobs`
/// threads, and with a fixed `random_state` the fitted forest is identical
/// regardless of `n_jobs`.
///
/// # Example
///
/// ```
/// use botdetect::prelude::*;
///
/// let x = Matrix::from_vec(6, 1, vec![0.0, 0.1, 0.2, 0.8, 0.9, 1.0]).expect("6x1");
/// let y = vec![0, 0, 0, 1, 1, 1];
///
/// let mut forest = RandomForestClassifier::new(10).with_random_state(42);
/// forest.fit(&x, &y).expect("fit should succeed");
/// assert_eq!(forest.predict(&x).map(|p| p.len()), Some(6));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    trees: Vec<DecisionTreeClassifier>,
    n_estimators: usize,
    n_jobs: usize,
    max_depth: Option<usize>,
    max_features: Option<usize>,
    criterion: SplitCriterion,
    random_state: Option<u64>,
    n_features: Option<usize>,
    n_classes: usize,
    oob_score: Option<f32>,
}

impl RandomForestClassifier {
    /// Creates a new Random Forest classifier.
    ///
    /// # Arguments
    ///
    /// * `n_estimators` - Number of trees in the forest
    #[must_use]
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            n_jobs: 1,
            max_depth: None,
            max_features: None,
            criterion: SplitCriterion::Gini,
            random_state: None,
            n_features: None,
            n_classes: 0,
            oob_score: None,
        }
    }

    /// Sets the maximum depth for each tree.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Sets the optional maximum depth for each tree.
    #[must_use]
    pub fn with_max_depth_opt(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Features considered per split (default: square root of the width).
    #[must_use]
    pub fn with_max_features(mut self, k: usize) -> Self {
        self.max_features = Some(k);
        self
    }

    /// Sets the split criterion of every tree.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Sets the number of worker threads used by `fit`.
    #[must_use]
    pub fn with_n_jobs(mut self, n_jobs: usize) -> Self {
        self.n_jobs = n_jobs;
        self
    }

    /// Sets the random state for reproducibility.
    #[must_use]
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self
    }

    /// Sets the optional random state.
    #[must_use]
    pub fn with_random_state_opt(mut self, random_state: Option<u64>) -> Self {
        self.random_state = random_state;
        self
    }

    /// Number of trees requested.
    #[must_use]
    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }

    /// Fitted trees.
    #[must_use]
    pub fn trees(&self) -> &[DecisionTreeClassifier] {
        &self.trees
    }

    fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(BotDetectError::invalid_hyperparameter(
                "n_estimators",
                self.n_estimators,
                ">= 1",
            ));
        }
        if self.n_jobs == 0 {
            return Err(BotDetectError::invalid_hyperparameter(
                "n_jobs",
                self.n_jobs,
                ">= 1",
            ));
        }
        Ok(())
    }

    /// Grows tree `i` and returns it with its out-of-bag row indices.
    fn grow_tree(
        &self,
        i: usize,
        x: &Matrix<f32>,
        y: &[usize],
        n_classes: usize,
    ) -> (DecisionTreeClassifier, Vec<usize>) {
        let n_samples = y.len();
        let seed = self.random_state.map(|s| s.wrapping_add(i as u64));
        let bootstrap = bootstrap_sample(n_samples, seed);

        let mut in_bag = vec![false; n_samples];
        for &idx in &bootstrap {
            in_bag[idx] = true;
        }
        let oob: Vec<usize> = (0..n_samples).filter(|&idx| !in_bag[idx]).collect();

        let max_features = self
            .max_features
            .unwrap_or_else(|| ((x.n_cols() as f32).sqrt() as usize).max(1));
        let mut tree = DecisionTreeClassifier::new()
            .with_max_depth_opt(self.max_depth)
            .with_criterion(self.criterion)
            .with_max_features(max_features);
        if let Some(seed) = seed {
            tree = tree.with_random_state(feature_seed(seed));
        }
        tree.fit_rows(x, y, &bootstrap, n_classes);
        (tree, oob)
    }

    /// Tallies one vote per tree for each row.
    fn votes(&self, x: &Matrix<f32>) -> Option<Vec<Vec<usize>>> {
        if !accepts_input("forest", self.n_features, x) || self.trees.is_empty() {
            return None;
        }
        let mut votes = vec![vec![0usize; self.n_classes]; x.n_rows()];
        for tree in &self.trees {
            for (tally, label) in votes.iter_mut().zip(tree.predict(x)?) {
                tally[label] += 1;
            }
        }
        Some(votes)
    }

    /// Vote share of each class, per sample.
    ///
    /// Each row sums to 1.0.
    #[must_use]
    pub fn predict_proba(&self, x: &Matrix<f32>) -> Option<Vec<Vec<f32>>> {
        let n_trees = self.trees.len() as f32;
        Some(
            self.votes(x)?
                .into_iter()
                .map(|tally| tally.into_iter().map(|v| v as f32 / n_trees).collect())
                .collect(),
        )
    }

    /// Out-of-bag accuracy computed at fit time.
    ///
    /// Each training row is predicted only by the trees whose bootstrap
    /// sample left it out; rows that were in every bootstrap are ignored.
    /// `None` before fit or when no row was ever out of bag.
    #[must_use]
    pub fn oob_score(&self) -> Option<f32> {
        self.oob_score
    }

    /// Returns feature importances based on mean decrease in impurity.
    ///
    /// Each split adds its sample-weighted impurity decrease to its feature;
    /// totals are normalized to sum to 1.0 (all zeros if no tree split).
    #[must_use]
    pub fn feature_importances(&self) -> Option<Vec<f32>> {
        let n_features = self.n_features?;
        let mut total = vec![0.0; n_features];
        for tree in &self.trees {
            if let Some(root) = tree.root() {
                accumulate_importances(root, &mut total);
            }
        }
        let sum: f32 = total.iter().sum();
        if sum > 0.0 {
            for importance in &mut total {
                *importance /= sum;
            }
        }
        Some(total)
    }
}

/// Majority vote over out-of-bag predictions, as accuracy.
fn out_of_bag_accuracy(
    grown: &[(DecisionTreeClassifier, Vec<usize>)],
    x: &Matrix<f32>,
    y: &[usize],
    n_classes: usize,
) -> Option<f32> {
    let mut votes = vec![vec![0usize; n_classes]; y.len()];
    for (tree, oob) in grown {
        if oob.is_empty() {
            continue;
        }
        let predictions = tree.predict(&x.select_rows(oob))?;
        for (&row, label) in oob.iter().zip(predictions) {
            votes[row][label] += 1;
        }
    }

    let (correct, seen) = votes
        .iter()
        .zip(y)
        .filter(|(tally, _)| tally.iter().any(|&v| v > 0))
        .fold((0usize, 0usize), |(correct, seen), (tally, &label)| {
            (correct + usize::from(majority_class(tally) == label), seen + 1)
        });

    (seen > 0).then(|| correct as f32 / seen as f32)
}

impl Classifier for RandomForestClassifier {
    /// Fits the random forest to training data.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid input, zero trees or zero jobs, or if
    /// the worker pool cannot be created.
    fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
        check_fit_input(x, y)?;
        self.validate()?;
        let n_classes = y.iter().copied().max().map_or(0, |m| m + 1);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.n_jobs)
            .build()
            .map_err(|e| BotDetectError::Other(format!("Failed to build worker pool: {e}")))?;

        let grown: Vec<(DecisionTreeClassifier, Vec<usize>)> = pool.install(|| {
            (0..self.n_estimators)
                .into_par_iter()
                .map(|i| self.grow_tree(i, x, y, n_classes))
                .collect()
        });

        self.n_features = Some(x.n_cols());
        self.n_classes = n_classes;
        self.oob_score = out_of_bag_accuracy(&grown, x, y, n_classes);
        self.trees = grown.into_iter().map(|(tree, _)| tree).collect();

        tracing::debug!(
            trees = self.trees.len(),
            n_jobs = self.n_jobs,
            oob_score = ?self.oob_score,
            "fitted random forest"
        );
        Ok(())
    }

    fn predict(&self, x: &Matrix<f32>) -> Option<Vec<usize>> {
        Some(
            self.votes(x)?
                .iter()
                .map(|tally| majority_class(tally))
                .collect(),
        )
    }

    fn predict_scores(&self, x: &Matrix<f32>) -> Option<Vec<f32>> {
        let n_trees = self.trees.len() as f32;
        Some(
            self.votes(x)?
                .iter()
                .map(|tally| tally.get(1).copied().unwrap_or(0) as f32 / n_trees)
                .collect(),
        )
    }

    fn n_features(&self) -> Option<usize> {
        if self.trees.is_empty() {
            None
        } else {
            self.n_features
        }
    }
}
