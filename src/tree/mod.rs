//! Decision tree algorithms and ensemble methods.
//!
//! This module implements:
//! - CART (Classification and Regression Trees) with Gini or entropy splits
//! - Random Forest ensemble classifier
//!
//! # Example
//!
//! ```rust
//! use botdetect::prelude::*;
//!
//! // Training data (simple 2D binary classification)
//! let x = Matrix::from_vec(4, 2, vec![
//!     0.0, 0.0,  // class 0
//!     0.0, 1.0,  // class 0
//!     1.0, 0.0,  // class 1
//!     1.0, 1.0,  // class 1
//! ]).expect("4x2 matrix");
//! let y = vec![0, 0, 1, 1];
//!
//! let mut tree = DecisionTreeClassifier::new().with_max_depth(3);
//! tree.fit(&x, &y).expect("fit should succeed");
//! assert_eq!(tree.predict(&x), Some(y));
//! ```

mod helpers;
mod random_forest;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::primitives::Matrix;
use crate::traits::{accepts_input, check_fit_input, Classifier};

pub use helpers::{entropy, gini_impurity};
pub use random_forest::RandomForestClassifier;

use helpers::{build_tree, rng_from, TreeParams};

/// Internal node in a decision tree.
///
/// Contains a split condition (feature and threshold) and pointers to
/// left and right subtrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Index of the feature to split on
    pub feature_idx: usize,
    /// Threshold value for the split
    pub threshold: f32,
    /// Training samples that reached this node
    pub n_samples: usize,
    /// Impurity decrease achieved by the split
    pub impurity_decrease: f32,
    /// Left subtree (samples where feature <= threshold)
    pub left: Box<TreeNode>,
    /// Right subtree (samples where feature > threshold)
    pub right: Box<TreeNode>,
}

/// Leaf node in a decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaf {
    /// Predicted class label for this leaf
    pub class_label: usize,
    /// Number of training samples in this leaf
    pub n_samples: usize,
    /// Training samples per class label
    pub class_counts: Vec<usize>,
}

impl Leaf {
    /// Fraction of this leaf's training samples labeled `class`.
    #[must_use]
    pub fn class_fraction(&self, class: usize) -> f32 {
        if self.n_samples == 0 {
            return 0.0;
        }
        self.class_counts.get(class).copied().unwrap_or(0) as f32 / self.n_samples as f32
    }
}

/// A node in a decision tree (either internal node or leaf).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Internal decision node with split condition
    Node(Node),
    /// Leaf node with class prediction
    Leaf(Leaf),
}

impl TreeNode {
    /// Returns the depth of the tree rooted at this node.
    ///
    /// Leaf nodes have depth 0, internal nodes have depth 1 + max(left, right).
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf(_) => 0,
            TreeNode::Node(node) => 1 + node.left.depth().max(node.right.depth()),
        }
    }

    /// Number of leaves under this node.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf(_) => 1,
            TreeNode::Node(node) => node.left.n_leaves() + node.right.n_leaves(),
        }
    }

    /// Leaf reached by one sample.
    #[must_use]
    pub fn leaf_for(&self, sample: &[f32]) -> &Leaf {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf(leaf) => return leaf,
                TreeNode::Node(internal) => {
                    node = if sample[internal.feature_idx] <= internal.threshold {
                        &internal.left
                    } else {
                        &internal.right
                    };
                }
            }
        }
    }
}

/// Impurity measure used to rank candidate splits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitCriterion {
    /// Gini impurity
    #[default]
    Gini,
    /// Shannon entropy (information gain)
    Entropy,
}

impl SplitCriterion {
    /// Impurity of a class distribution under this criterion.
    #[must_use]
    pub fn impurity(self, counts: &[usize]) -> f32 {
        match self {
            SplitCriterion::Gini => gini_impurity(counts),
            SplitCriterion::Entropy => entropy(counts),
        }
    }
}

/// Decision tree classifier using the CART algorithm.
///
/// Builds binary trees recursively, choosing at every node the split with
/// the largest impurity decrease. Leaves keep their class counts, so the
/// tree also yields class-1 scores for ROC analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    tree: Option<TreeNode>,
    max_depth: Option<usize>,
    criterion: SplitCriterion,
    max_features: Option<usize>,
    random_state: Option<u64>,
    /// Number of features the model was trained on (for validation)
    n_features: Option<usize>,
    n_classes: usize,
}

impl DecisionTreeClassifier {
    /// Creates a new decision tree classifier with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: None,
            max_depth: None,
            criterion: SplitCriterion::Gini,
            max_features: None,
            random_state: None,
            n_features: None,
            n_classes: 0,
        }
    }

    /// Sets the maximum depth of the tree (root has depth 0).
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Sets the optional maximum depth.
    #[must_use]
    pub fn with_max_depth_opt(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets the split criterion.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Considers only a random subset of `k` features at each split.
    #[must_use]
    pub fn with_max_features(mut self, k: usize) -> Self {
        self.max_features = Some(k);
        self
    }

    /// Seeds the feature subsampling.
    #[must_use]
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self
    }

    /// Split criterion in use.
    #[must_use]
    pub fn criterion(&self) -> SplitCriterion {
        self.criterion
    }

    /// Root of the fitted tree.
    #[must_use]
    pub fn root(&self) -> Option<&TreeNode> {
        self.tree.as_ref()
    }

    /// Depth of the fitted tree.
    #[must_use]
    pub fn depth(&self) -> Option<usize> {
        self.tree.as_ref().map(TreeNode::depth)
    }

    /// Grows the tree on the rows at `indices` (repeats allowed).
    ///
    /// `n_classes` fixes the width of every leaf's class counts, so trees
    /// grown on different bootstrap samples agree on the label space.
    pub(crate) fn fit_rows(
        &mut self,
        x: &Matrix<f32>,
        y: &[usize],
        indices: &[usize],
        n_classes: usize,
    ) {
        let params = TreeParams {
            max_depth: self.max_depth,
            criterion: self.criterion,
            max_features: self.max_features,
            n_classes,
        };
        let mut rng = rng_from(self.random_state);
        self.tree = Some(build_tree(x, y, indices, 0, &params, &mut rng));
        self.n_features = Some(x.n_cols());
        self.n_classes = n_classes;
    }

    /// Leaf reached by each row, `None` if the tree cannot answer.
    fn leaves<'a>(&'a self, x: &'a Matrix<f32>) -> Option<impl Iterator<Item = &'a Leaf> + 'a> {
        if !accepts_input("tree", self.n_features, x) {
            return None;
        }
        let tree = self.tree.as_ref()?;
        Some(x.rows().map(move |row| tree.leaf_for(row)))
    }

    /// Class distribution of the reached leaf, per sample.
    #[must_use]
    pub fn predict_proba(&self, x: &Matrix<f32>) -> Option<Vec<Vec<f32>>> {
        let n_classes = self.n_classes;
        Some(
            self.leaves(x)?
                .map(|leaf| (0..n_classes).map(|c| leaf.class_fraction(c)).collect())
                .collect(),
        )
    }
}

impl Default for DecisionTreeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for DecisionTreeClassifier {
    /// Fits the decision tree to training data.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is empty or `x` and `y` disagree in length.
    fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
        check_fit_input(x, y)?;
        let n_classes = y.iter().copied().max().map_or(0, |m| m + 1);
        let indices: Vec<usize> = (0..y.len()).collect();
        self.fit_rows(x, y, &indices, n_classes);
        tracing::debug!(
            samples = y.len(),
            depth = self.depth().unwrap_or(0),
            criterion = ?self.criterion,
            "fitted decision tree"
        );
        Ok(())
    }

    fn predict(&self, x: &Matrix<f32>) -> Option<Vec<usize>> {
        Some(self.leaves(x)?.map(|leaf| leaf.class_label).collect())
    }

    fn predict_scores(&self, x: &Matrix<f32>) -> Option<Vec<f32>> {
        Some(self.leaves(x)?.map(|leaf| leaf.class_fraction(1)).collect())
    }

    fn n_features(&self) -> Option<usize> {
        self.tree.as_ref().and(self.n_features)
    }
}

#[cfg(test)]
mod tests;
