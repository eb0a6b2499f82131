//! Train/test splitting.

use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::data::LabeledDataset;
use crate::error::{BotDetectError, Result};

/// Disjoint train and test subsets of one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    /// Training rows
    pub train: LabeledDataset,
    /// Held-out rows
    pub test: LabeledDataset,
}

/// Validates inputs for [`train_test_split`], returning `(n_train, n_test)`.
fn validate_split_inputs(n_samples: usize, test_size: f32) -> Result<(usize, usize)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(BotDetectError::invalid_hyperparameter(
            "test_size",
            test_size,
            "0 < test_size < 1",
        ));
    }

    let n_test = (n_samples as f32 * test_size).round() as usize;
    let n_train = n_samples - n_test;

    if n_test == 0 || n_train == 0 {
        return Err(format!(
            "Split would result in empty train or test set (n_train={n_train}, n_test={n_test})"
        )
        .into());
    }

    Ok((n_train, n_test))
}

/// Shuffles indices with optional random seed.
fn shuffle_indices(n_samples: usize, random_state: Option<u64>) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n_samples).collect();

    if let Some(seed) = random_state {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);
    } else {
        let mut rng = rand::thread_rng();
        indices.shuffle(&mut rng);
    }

    indices
}

/// Splits a dataset into random train and test subsets.
///
/// Rows are shuffled, then the first `n - round(n * test_size)` go to
/// train and the rest to test. The same `random_state` always yields the
/// same split.
///
/// # Errors
///
/// Returns `InvalidHyperparameter` if `test_size` is outside `(0, 1)` and
/// an error if either side would be empty.
///
/// # Example
///
/// ```rust
/// use botdetect::data::LabeledDataset;
/// use botdetect::model_selection::train_test_split;
/// use botdetect::primitives::Matrix;
///
/// let x = Matrix::from_vec(10, 1, (0..10).map(|i| i as f32).collect()).expect("10 x 1");
/// let ds = LabeledDataset::new(x, vec![0, 0, 0, 0, 0, 1, 1, 1, 1, 1]).expect("lengths match");
///
/// let split = train_test_split(&ds, 0.2, Some(42)).expect("valid split");
/// assert_eq!(split.train.len(), 8);
/// assert_eq!(split.test.len(), 2);
/// ```
pub fn train_test_split(
    dataset: &LabeledDataset,
    test_size: f32,
    random_state: Option<u64>,
) -> Result<Split> {
    let n_samples = dataset.len();
    let (n_train, n_test) = validate_split_inputs(n_samples, test_size)?;

    let indices = shuffle_indices(n_samples, random_state);
    let split = Split {
        train: dataset.select(&indices[..n_train]),
        test: dataset.select(&indices[n_train..]),
    };

    tracing::debug!(n_train, n_test, "split dataset");
    Ok(split)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Matrix;

    fn dataset(n: usize) -> LabeledDataset {
        let x = Matrix::from_vec(n, 2, (0..n * 2).map(|i| i as f32).collect())
            .expect("Matrix creation should succeed with valid test data");
        let y = (0..n).map(|i| i % 2).collect();
        LabeledDataset::new(x, y).expect("lengths match")
    }

    #[test]
    fn test_train_test_split_basic() {
        let split = train_test_split(&dataset(10), 0.2, Some(42)).expect("Split should succeed");
        assert_eq!(split.train.len(), 8, "Training set should have 8 samples");
        assert_eq!(split.test.len(), 2, "Test set should have 2 samples");
        assert_eq!(split.train.width(), 2);
        assert_eq!(split.test.width(), 2);
    }

    #[test]
    fn test_train_test_split_reproducibility() {
        let ds = dataset(20);
        let a = train_test_split(&ds, 0.25, Some(7)).expect("First split should succeed");
        let b = train_test_split(&ds, 0.25, Some(7)).expect("Second split should succeed");
        assert_eq!(a, b);
    }

    #[test]
    fn test_train_test_split_different_seeds() {
        let ds = dataset(50);
        let a = train_test_split(&ds, 0.3, Some(1)).expect("split");
        let b = train_test_split(&ds, 0.3, Some(2)).expect("split");
        assert_ne!(a.test.features(), b.test.features());
    }

    #[test]
    fn test_split_is_disjoint_and_covering() {
        let ds = dataset(30);
        let split = train_test_split(&ds, 0.1, Some(0)).expect("split");
        // first column holds 2 * row index, so it identifies the row
        let mut seen: Vec<f32> = split
            .train
            .features()
            .column(0)
            .into_iter()
            .chain(split.test.features().column(0))
            .collect();
        seen.sort_by(f32::total_cmp);
        let expected: Vec<f32> = (0..30).map(|i| (i * 2) as f32).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_labels_follow_rows() {
        let split = train_test_split(&dataset(12), 0.5, Some(3)).expect("split");
        for (row, &label) in split.train.features().rows().zip(split.train.labels()) {
            assert_eq!((row[0] as usize / 2) % 2, label);
        }
    }

    #[test]
    fn test_invalid_test_size() {
        let ds = dataset(10);
        for bad in [0.0, 1.0, -0.5, f32::NAN] {
            assert!(matches!(
                train_test_split(&ds, bad, Some(0)),
                Err(BotDetectError::InvalidHyperparameter { .. })
            ));
        }
    }

    #[test]
    fn test_empty_side_is_rejected() {
        assert!(train_test_split(&dataset(3), 0.1, Some(0)).is_err());
        assert!(train_test_split(&dataset(0), 0.5, Some(0)).is_err());
    }
}
