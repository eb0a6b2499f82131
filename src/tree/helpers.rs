//! Helper functions for tree building.
//!
//! Trees are grown over index lists into the training matrix, so bootstrap
//! samples (which repeat rows) never copy feature data.

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{Leaf, Node, SplitCriterion, TreeNode};
use crate::primitives::Matrix;

/// Values closer than this are treated as equal when placing thresholds.
const MIN_GAP: f32 = 1e-10;

/// Per-class counts of the labels at `indices`.
pub(super) fn class_counts(y: &[usize], indices: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0; n_classes];
    for &idx in indices {
        counts[y[idx]] += 1;
    }
    counts
}

/// Gini impurity of a class distribution: `1 - Σ p_i²`.
#[must_use]
pub fn gini_impurity(counts: &[usize]) -> f32 {
    let n: usize = counts.iter().sum();
    if n == 0 {
        return 0.0;
    }
    let n = n as f32;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f32 / n;
            p * p
        })
        .sum::<f32>()
}

/// Shannon entropy (bits) of a class distribution: `-Σ p_i log2 p_i`.
#[must_use]
pub fn entropy(counts: &[usize]) -> f32 {
    let n: usize = counts.iter().sum();
    if n == 0 {
        return 0.0;
    }
    let n = n as f32;
    -counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f32 / n;
            p * p.log2()
        })
        .sum::<f32>()
}

/// Most frequent class; ties go to the lower label.
pub(super) fn majority_class(counts: &[usize]) -> usize {
    let mut best = 0;
    for (label, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = label;
        }
    }
    best
}

/// Fixed parameters of one tree build.
pub(super) struct TreeParams {
    pub max_depth: Option<usize>,
    pub criterion: SplitCriterion,
    pub max_features: Option<usize>,
    pub n_classes: usize,
}

/// Chosen split of one node.
pub(super) struct BestSplit {
    pub feature_idx: usize,
    pub threshold: f32,
    pub gain: f32,
}

/// Features considered at one node: all of them, or a random subset.
pub(super) fn candidate_features(
    n_features: usize,
    max_features: Option<usize>,
    rng: &mut StdRng,
) -> Vec<usize> {
    let mut features: Vec<usize> = (0..n_features).collect();
    if let Some(k) = max_features {
        if k < n_features {
            features.shuffle(rng);
            features.truncate(k.max(1));
            features.sort_unstable();
        }
    }
    features
}

/// Finds the split with the largest impurity decrease.
///
/// Thresholds are midpoints between consecutive distinct values of a
/// feature; samples with `value <= threshold` go left. Returns `None` when
/// no split decreases impurity.
pub(super) fn find_best_split(
    x: &Matrix<f32>,
    y: &[usize],
    indices: &[usize],
    features: &[usize],
    params: &TreeParams,
) -> Option<BestSplit> {
    let n = indices.len();
    if n < 2 {
        return None;
    }

    let parent_counts = class_counts(y, indices, params.n_classes);
    let parent_impurity = params.criterion.impurity(&parent_counts);
    let mut best: Option<BestSplit> = None;
    let mut sorted = indices.to_vec();

    for &feature_idx in features {
        sorted.sort_by(|&a, &b| x.get(a, feature_idx).total_cmp(&x.get(b, feature_idx)));

        let mut left_counts = vec![0; params.n_classes];
        let mut right_counts = parent_counts.clone();

        for pos in 0..n - 1 {
            let label = y[sorted[pos]];
            left_counts[label] += 1;
            right_counts[label] -= 1;

            let value = x.get(sorted[pos], feature_idx);
            let next = x.get(sorted[pos + 1], feature_idx);
            if !(next - value > MIN_GAP) {
                continue;
            }

            let n_left = (pos + 1) as f32;
            let n_right = (n - pos - 1) as f32;
            let weighted = (n_left * params.criterion.impurity(&left_counts)
                + n_right * params.criterion.impurity(&right_counts))
                / n as f32;
            let gain = parent_impurity - weighted;

            if gain > best.as_ref().map_or(0.0, |b| b.gain) {
                let mut threshold = value + (next - value) / 2.0;
                if !(threshold < next) {
                    threshold = value;
                }
                best = Some(BestSplit {
                    feature_idx,
                    threshold,
                    gain,
                });
            }
        }
    }

    best
}

fn leaf(counts: Vec<usize>) -> TreeNode {
    TreeNode::Leaf(Leaf {
        class_label: majority_class(&counts),
        n_samples: counts.iter().sum(),
        class_counts: counts,
    })
}

/// Builds a decision tree recursively over the rows at `indices`.
pub(super) fn build_tree(
    x: &Matrix<f32>,
    y: &[usize],
    indices: &[usize],
    depth: usize,
    params: &TreeParams,
    rng: &mut StdRng,
) -> TreeNode {
    let counts = class_counts(y, indices, params.n_classes);

    let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
    let too_deep = params.max_depth.is_some_and(|max| depth >= max);
    if pure || too_deep {
        return leaf(counts);
    }

    let features = candidate_features(x.n_cols(), params.max_features, rng);
    let Some(split) = find_best_split(x, y, indices, &features, params) else {
        return leaf(counts);
    };

    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&idx| x.get(idx, split.feature_idx) <= split.threshold);
    if left.is_empty() || right.is_empty() {
        return leaf(counts);
    }

    let left_child = build_tree(x, y, &left, depth + 1, params, rng);
    let right_child = build_tree(x, y, &right, depth + 1, params, rng);

    TreeNode::Node(Node {
        feature_idx: split.feature_idx,
        threshold: split.threshold,
        n_samples: indices.len(),
        impurity_decrease: split.gain,
        left: Box::new(left_child),
        right: Box::new(right_child),
    })
}

/// Seeded RNG, or one seeded from OS entropy when no seed is given.
pub(super) fn rng_from(random_state: Option<u64>) -> StdRng {
    match random_state {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Mixed into a tree's bootstrap seed to seed its feature subsampling.
const FEATURE_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Seed of the feature-subsampling stream paired with a bootstrap seed.
///
/// Always differs from `bootstrap_seed`, so the two streams never coincide.
pub(super) fn feature_seed(bootstrap_seed: u64) -> u64 {
    bootstrap_seed ^ FEATURE_SEED_SALT
}

/// Bootstrap sample: `n_samples` indices drawn with replacement.
pub(super) fn bootstrap_sample(n_samples: usize, random_state: Option<u64>) -> Vec<usize> {
    let dist = Uniform::from(0..n_samples);
    let mut rng = rng_from(random_state);
    (0..n_samples).map(|_| dist.sample(&mut rng)).collect()
}

/// Adds each split's sample-weighted impurity decrease to its feature.
pub(super) fn accumulate_importances(node: &TreeNode, importances: &mut [f32]) {
    if let TreeNode::Node(n) = node {
        importances[n.feature_idx] += n.n_samples as f32 * n.impurity_decrease;
        accumulate_importances(&n.left, importances);
        accumulate_importances(&n.right, importances);
    }
}
