//! Tests for decision tree algorithms.

use super::helpers::{
    bootstrap_sample, candidate_features, class_counts, feature_seed, find_best_split,
    majority_class, rng_from, TreeParams,
};
use super::*;
use crate::error::BotDetectError;

fn params(criterion: SplitCriterion) -> TreeParams {
    TreeParams {
        max_depth: None,
        criterion,
        max_features: None,
        n_classes: 2,
    }
}

/// Class 0 rows are all zeros, class 1 rows all tens.
fn zeros_and_tens(n_per_class: usize, width: usize) -> (Matrix<f32>, Vec<usize>) {
    let mut data = vec![0.0; n_per_class * width];
    data.extend(vec![10.0; n_per_class * width]);
    let x = Matrix::from_vec(2 * n_per_class, width, data).expect("valid dimensions");
    let y = [vec![0; n_per_class], vec![1; n_per_class]].concat();
    (x, y)
}

#[test]
fn test_tree_depth_and_leaves() {
    let leaf = |label| {
        Box::new(TreeNode::Leaf(Leaf {
            class_label: label,
            n_samples: 1,
            class_counts: vec![1 - label, label],
        }))
    };
    let tree = TreeNode::Node(Node {
        feature_idx: 0,
        threshold: 0.5,
        n_samples: 2,
        impurity_decrease: 0.5,
        left: leaf(0),
        right: leaf(1),
    });
    assert_eq!(tree.depth(), 1);
    assert_eq!(tree.n_leaves(), 2);
    assert_eq!(tree.leaf_for(&[0.2]).class_label, 0);
    assert_eq!(tree.leaf_for(&[0.7]).class_label, 1);
}

#[test]
fn test_gini_impurity() {
    assert!(gini_impurity(&[4, 0]).abs() < 1e-6);
    assert!((gini_impurity(&[2, 2]) - 0.5).abs() < 1e-6);
    assert!(gini_impurity(&[0, 0]).abs() < 1e-6);
}

#[test]
fn test_entropy() {
    assert!(entropy(&[3, 0]).abs() < 1e-6);
    assert!((entropy(&[5, 5]) - 1.0).abs() < 1e-6);
    assert!((SplitCriterion::Entropy.impurity(&[1, 1]) - 1.0).abs() < 1e-6);
}

#[test]
fn test_majority_class_ties_go_low() {
    assert_eq!(majority_class(&[2, 2]), 0);
    assert_eq!(majority_class(&[1, 3]), 1);
    assert_eq!(majority_class(&[0, 0, 5, 5]), 2);
}

#[test]
fn test_class_counts_with_repeats() {
    let y = [0, 1, 1];
    assert_eq!(class_counts(&y, &[1, 1, 2, 0], 2), vec![1, 3]);
}

#[test]
fn test_find_best_split_midpoint() {
    let x = Matrix::from_vec(4, 1, vec![1.0, 2.0, 5.0, 6.0]).expect("4x1");
    let y = [0, 0, 1, 1];
    let split = find_best_split(&x, &y, &[0, 1, 2, 3], &[0], &params(SplitCriterion::Gini))
        .expect("separable");
    assert_eq!(split.feature_idx, 0);
    assert!((split.threshold - 3.5).abs() < 1e-6);
    assert!((split.gain - 0.5).abs() < 1e-6);
}

#[test]
fn test_find_best_split_none_for_constant_feature() {
    let x = Matrix::filled(4, 1, 3.0);
    let y = [0, 1, 0, 1];
    assert!(find_best_split(&x, &y, &[0, 1, 2, 3], &[0], &params(SplitCriterion::Gini)).is_none());
}

#[test]
fn test_find_best_split_prefers_informative_feature() {
    // feature 0 is noise, feature 1 separates the classes
    let x = Matrix::from_vec(4, 2, vec![1.0, 0.0, 0.0, 0.1, 1.0, 0.9, 0.0, 1.0]).expect("4x2");
    let y = [0, 0, 1, 1];
    let split = find_best_split(&x, &y, &[0, 1, 2, 3], &[0, 1], &params(SplitCriterion::Entropy))
        .expect("separable");
    assert_eq!(split.feature_idx, 1);
}

#[test]
fn test_candidate_features_subset() {
    let mut rng = rng_from(Some(3));
    let picked = candidate_features(10, Some(3), &mut rng);
    assert_eq!(picked.len(), 3);
    assert!(picked.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(candidate_features(4, None, &mut rng), vec![0, 1, 2, 3]);
    assert_eq!(candidate_features(4, Some(9), &mut rng).len(), 4);
}

#[test]
fn test_bootstrap_sample_seeded() {
    let a = bootstrap_sample(50, Some(7));
    let b = bootstrap_sample(50, Some(7));
    assert_eq!(a, b);
    assert_eq!(a.len(), 50);
    assert!(a.iter().all(|&i| i < 50));
    assert_ne!(a, bootstrap_sample(50, Some(8)));
}

#[test]
fn test_tree_unfitted_returns_none() {
    let tree = DecisionTreeClassifier::new();
    assert!(!tree.is_fitted());
    assert!(tree.predict(&Matrix::zeros(1, 1)).is_none());
    assert!(tree.predict_scores(&Matrix::zeros(1, 1)).is_none());
}

#[test]
fn test_tree_fits_training_data() {
    let x = Matrix::from_vec(6, 2, vec![0.0, 0.0, 0.1, 0.2, 0.2, 0.1, 0.9, 0.8, 0.8, 1.0, 1.0, 0.9])
        .expect("6x2");
    let y = vec![0, 0, 0, 1, 1, 1];
    let mut tree = DecisionTreeClassifier::new();
    tree.fit(&x, &y).expect("fit should succeed");
    assert_eq!(tree.predict(&x), Some(y));
    assert_eq!(tree.n_features(), Some(2));
    assert_eq!(tree.depth(), Some(1));
}

#[test]
fn test_tree_xor_needs_depth() {
    let x = Matrix::from_vec(4, 2, vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0]).expect("4x2");
    let y = vec![0, 1, 1, 0];
    let mut stump = DecisionTreeClassifier::new().with_max_depth(0);
    stump.fit(&x, &y).expect("fit should succeed");
    assert_eq!(stump.depth(), Some(0));
    assert_eq!(stump.predict(&x), Some(vec![0, 0, 0, 0]));
}

#[test]
fn test_tree_scores_are_leaf_fractions() {
    let x = Matrix::from_vec(4, 1, vec![0.0, 0.0, 1.0, 1.0]).expect("4x1");
    let y = vec![0, 1, 1, 1];
    let mut tree = DecisionTreeClassifier::new();
    tree.fit(&x, &y).expect("fit should succeed");
    let scores = tree.predict_scores(&x).expect("fitted");
    assert!((scores[0] - 0.5).abs() < 1e-6);
    assert!((scores[3] - 1.0).abs() < 1e-6);
    let proba = tree.predict_proba(&x).expect("fitted");
    assert!((proba[0].iter().sum::<f32>() - 1.0).abs() < 1e-6);
}

#[test]
fn test_tree_width_mismatch_returns_none() {
    let (x, y) = zeros_and_tens(3, 2);
    let mut tree = DecisionTreeClassifier::new();
    tree.fit(&x, &y).expect("fit should succeed");
    assert!(tree.predict(&Matrix::zeros(1, 3)).is_none());
}

#[test]
fn test_tree_fit_rejects_mismatched_labels() {
    let err = DecisionTreeClassifier::new()
        .fit(&Matrix::zeros(3, 1), &[0, 1])
        .expect_err("length mismatch");
    assert!(matches!(err, BotDetectError::DimensionMismatch { .. }));
}

#[test]
fn test_forest_separable_accuracy() {
    let (x_train, y_train) = zeros_and_tens(20, 11);
    let (x_test, y_test) = zeros_and_tens(5, 11);
    let mut forest = RandomForestClassifier::new(50)
        .with_n_jobs(2)
        .with_random_state(42);
    forest.fit(&x_train, &y_train).expect("fit should succeed");
    let score = forest.score(&x_test, &y_test).expect("fitted");
    assert!((score - 1.0).abs() < f32::EPSILON);
    assert_eq!(forest.trees().len(), 50);
}

#[test]
fn test_forest_reproducible_across_job_counts() {
    let x = Matrix::from_vec(8, 2, (0..16).map(|i| (i * 7 % 11) as f32).collect()).expect("8x2");
    let y = vec![0, 1, 0, 1, 1, 0, 1, 0];
    let mut single = RandomForestClassifier::new(8)
        .with_n_jobs(1)
        .with_random_state(5);
    let mut multi = RandomForestClassifier::new(8)
        .with_n_jobs(4)
        .with_random_state(5);
    single.fit(&x, &y).expect("fit");
    multi.fit(&x, &y).expect("fit");
    assert_eq!(single, multi.with_n_jobs(1));
}

#[test]
fn test_forest_proba_rows_sum_to_one() {
    let (x, y) = zeros_and_tens(6, 3);
    let mut forest = RandomForestClassifier::new(7).with_random_state(1);
    forest.fit(&x, &y).expect("fit");
    for row in forest.predict_proba(&x).expect("fitted") {
        assert!((row.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }
    let scores = forest.predict_scores(&x).expect("fitted");
    assert!(scores[0] < 0.5 && scores[11] > 0.5);
}

#[test]
fn test_forest_oob_and_importances() {
    let (x, y) = zeros_and_tens(15, 4);
    let mut forest = RandomForestClassifier::new(20).with_random_state(0);
    assert!(forest.oob_score().is_none());
    assert!(forest.feature_importances().is_none());
    forest.fit(&x, &y).expect("fit");

    let oob = forest.oob_score().expect("some rows were out of bag");
    assert!((oob - 1.0).abs() < f32::EPSILON);

    let importances = forest.feature_importances().expect("fitted");
    assert_eq!(importances.len(), 4);
    assert!((importances.iter().sum::<f32>() - 1.0).abs() < 1e-5);
}

#[test]
fn test_forest_rejects_zero_trees_and_jobs() {
    let (x, y) = zeros_and_tens(2, 1);
    let err = RandomForestClassifier::new(0)
        .fit(&x, &y)
        .expect_err("zero trees");
    assert!(matches!(err, BotDetectError::InvalidHyperparameter { .. }));
    let err = RandomForestClassifier::new(3)
        .with_n_jobs(0)
        .fit(&x, &y)
        .expect_err("zero jobs");
    assert!(matches!(err, BotDetectError::InvalidHyperparameter { .. }));
}

#[test]
fn test_forest_unfitted_returns_none() {
    let forest = RandomForestClassifier::new(3);
    assert!(forest.predict(&Matrix::zeros(1, 2)).is_none());
    assert!(forest.predict_scores(&Matrix::zeros(1, 2)).is_none());
}

#[test]
fn test_forest_trees_use_distinct_feature_seeds() {
    let (x, y) = zeros_and_tens(4, 4);
    let mut forest = RandomForestClassifier::new(3).with_random_state(0);
    forest.fit(&x, &y).expect("fit should succeed");

    for (i, tree) in forest.trees().iter().enumerate() {
        let bootstrap_seed = i as u64;
        assert_eq!(tree.random_state, Some(feature_seed(bootstrap_seed)));
        assert_ne!(tree.random_state, Some(bootstrap_seed));
    }
}

#[test]
fn test_feature_seed_never_repeats_bootstrap_seed() {
    for seed in [0, 1, 42, u64::MAX] {
        assert_ne!(feature_seed(seed), seed);
    }
}
