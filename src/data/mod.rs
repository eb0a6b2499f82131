//! Labeled dataset assembly.
//!
//! Turns raw records into a class-balanced [`LabeledDataset`]: every row is
//! built through a [`FeatureRowBuilder`], rows are partitioned by the `bot`
//! label, and both groups are truncated to the size of the smaller one.

use serde::{Deserialize, Serialize};

use crate::error::{BotDetectError, Result};
use crate::features::{FeatureRowBuilder, RawRecord};
use crate::primitives::Matrix;

/// Label of non-bot (human) accounts.
pub const HUMAN: usize = 0;

/// Label of bot accounts.
pub const BOT: usize = 1;

/// What to do when a single row fails to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowErrorPolicy {
    /// The first bad row aborts assembly.
    #[default]
    Abort,
    /// Bad rows are logged, counted and dropped.
    Skip,
}

/// Feature matrix plus one label per row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledDataset {
    features: Matrix<f32>,
    labels: Vec<usize>,
}

impl LabeledDataset {
    /// Pairs a feature matrix with labels.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if the row and label counts differ.
    pub fn new(features: Matrix<f32>, labels: Vec<usize>) -> Result<Self> {
        if features.n_rows() != labels.len() {
            return Err(BotDetectError::dimension_mismatch(
                "labels",
                features.n_rows(),
                labels.len(),
            ));
        }
        Ok(Self { features, labels })
    }

    /// Dataset with no rows.
    #[must_use]
    pub fn empty(width: usize) -> Self {
        Self {
            features: Matrix::zeros(0, width),
            labels: Vec::new(),
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Feature width.
    #[must_use]
    pub fn width(&self) -> usize {
        self.features.n_cols()
    }

    /// Rows labeled [`BOT`].
    #[must_use]
    pub fn n_bots(&self) -> usize {
        self.labels.iter().filter(|&&l| l == BOT).count()
    }

    /// Rows labeled [`HUMAN`].
    #[must_use]
    pub fn n_humans(&self) -> usize {
        self.labels.iter().filter(|&&l| l == HUMAN).count()
    }

    /// Feature matrix.
    #[must_use]
    pub fn features(&self) -> &Matrix<f32> {
        &self.features
    }

    /// Labels in row order.
    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Rows at `indices`, in the given order.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of bounds.
    #[must_use]
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            features: self.features.select_rows(indices),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }

    /// Splits into the feature matrix and labels.
    #[must_use]
    pub fn into_parts(self) -> (Matrix<f32>, Vec<usize>) {
        (self.features, self.labels)
    }
}

/// Outcome of one assembly run.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyReport {
    /// Balanced dataset, non-bot rows first.
    pub dataset: LabeledDataset,
    /// Bot rows parsed before balancing
    pub bots_seen: usize,
    /// Non-bot rows parsed before balancing
    pub humans_seen: usize,
    /// Rows dropped under [`RowErrorPolicy::Skip`]
    pub skipped: usize,
}

/// Builds balanced labeled datasets from raw records.
///
/// # Examples
///
/// ```
/// use botdetect::data::DatasetAssembler;
/// use botdetect::features::{FeatureField, FeatureRowBuilder, RawRecord};
///
/// let row = |age: &str, bot: &str| -> RawRecord {
///     FeatureField::ALL
///         .iter()
///         .map(|f| (f.column(), "0"))
///         .chain([("age", age), ("bot", bot)])
///         .collect()
/// };
///
/// let report = DatasetAssembler::new(FeatureRowBuilder::new())
///     .assemble(&[row("10", "0"), row("-5", "0"), row("20", "1")])
///     .expect("rows parse");
///
/// assert_eq!(report.dataset.labels(), &[0, 1]);
/// assert_eq!(report.dataset.features().get(0, 0), 10.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DatasetAssembler {
    builder: FeatureRowBuilder,
    row_errors: RowErrorPolicy,
}

impl DatasetAssembler {
    /// Creates an assembler that aborts on the first bad row.
    #[must_use]
    pub fn new(builder: FeatureRowBuilder) -> Self {
        Self {
            builder,
            row_errors: RowErrorPolicy::Abort,
        }
    }

    /// Sets the row error policy.
    #[must_use]
    pub fn with_row_errors(mut self, policy: RowErrorPolicy) -> Self {
        self.row_errors = policy;
        self
    }

    /// Row builder in use.
    #[must_use]
    pub fn builder(&self) -> &FeatureRowBuilder {
        &self.builder
    }

    /// Builds, partitions and balances `records`.
    ///
    /// The result holds `2 * min(bots, humans)` rows: the first `min`
    /// non-bot rows in input order followed by the first `min` bot rows.
    /// If either class is absent the dataset is empty.
    ///
    /// # Errors
    ///
    /// Under [`RowErrorPolicy::Abort`] the first `Parse` or `MissingField`
    /// error is returned.
    pub fn assemble(&self, records: &[RawRecord]) -> Result<AssemblyReport> {
        let width = self.builder.width();
        let mut humans: Vec<Vec<f32>> = Vec::new();
        let mut bots: Vec<Vec<f32>> = Vec::new();
        let mut skipped = 0;

        for (line, record) in records.iter().enumerate() {
            let row = match self.builder.build(record) {
                Ok(row) => row,
                Err(e) if e.is_row_error() && self.row_errors == RowErrorPolicy::Skip => {
                    tracing::warn!(row = line, error = %e, "skipping unparseable row");
                    skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };
            if record.is_bot() {
                bots.push(row.into_inner());
            } else {
                humans.push(row.into_inner());
            }
        }

        let (bots_seen, humans_seen) = (bots.len(), humans.len());
        let n = bots_seen.min(humans_seen);
        if n == 0 {
            tracing::warn!(bots_seen, humans_seen, "one class is empty, dataset is empty");
        }

        let labels = std::iter::repeat(HUMAN)
            .take(n)
            .chain(std::iter::repeat(BOT).take(n))
            .collect();
        let features = Matrix::from_rows(width, humans.iter().take(n).chain(bots.iter().take(n)))?;
        let dataset = LabeledDataset::new(features, labels)?;

        tracing::debug!(
            rows = dataset.len(),
            bots_seen,
            humans_seen,
            skipped,
            "assembled balanced dataset"
        );

        Ok(AssemblyReport {
            dataset,
            bots_seen,
            humans_seen,
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureField;

    fn row(age: &str, bot: &str) -> RawRecord {
        FeatureField::ALL
            .iter()
            .map(|f| (f.column(), "1"))
            .chain([("age", age), ("bot", bot)])
            .collect()
    }

    fn assemble(records: &[RawRecord]) -> AssemblyReport {
        DatasetAssembler::new(FeatureRowBuilder::new())
            .assemble(records)
            .expect("assembly succeeds")
    }

    #[test]
    fn test_balances_and_clamps() {
        let report = assemble(&[row("10", "0"), row("-5", "0"), row("20", "1")]);
        assert_eq!(report.dataset.len(), 2);
        assert_eq!(report.dataset.labels(), &[0, 1]);
        assert_eq!(report.dataset.features().get(0, 0), 10.0);
        assert_eq!(report.dataset.features().get(1, 0), 20.0);
        assert_eq!(report.bots_seen, 1);
        assert_eq!(report.humans_seen, 2);
    }

    #[test]
    fn test_more_bots_than_humans() {
        let report = assemble(&[
            row("1", "1"),
            row("2", "0"),
            row("3", "1"),
            row("4", "1"),
            row("5", "0"),
        ]);
        assert_eq!(report.dataset.len(), 4);
        assert_eq!(report.dataset.labels(), &[0, 0, 1, 1]);
        assert_eq!(report.dataset.features().column(0), vec![2.0, 5.0, 1.0, 3.0]);
    }

    #[test]
    fn test_single_class_gives_empty() {
        let report = assemble(&[row("1", "0"), row("2", "0")]);
        assert!(report.dataset.is_empty());
        assert_eq!(report.dataset.width(), 11);
        assert_eq!(report.humans_seen, 2);
    }

    #[test]
    fn test_no_records() {
        let report = assemble(&[]);
        assert!(report.dataset.is_empty());
        assert_eq!(report.skipped, 0);
    }

    #[test]
    fn test_non_one_label_is_human() {
        let report = assemble(&[row("1", "true"), row("2", "1")]);
        assert_eq!(report.dataset.labels(), &[0, 1]);
        assert_eq!(report.dataset.features().get(0, 0), 1.0);
    }

    #[test]
    fn test_abort_on_bad_row() {
        let err = DatasetAssembler::new(FeatureRowBuilder::new())
            .assemble(&[row("1", "0"), row("old", "1")])
            .expect_err("bad age");
        assert!(matches!(err, BotDetectError::Parse { .. }));
    }

    #[test]
    fn test_skip_bad_row() {
        let report = DatasetAssembler::new(FeatureRowBuilder::new())
            .with_row_errors(RowErrorPolicy::Skip)
            .assemble(&[row("1", "0"), row("old", "1"), row("3", "1")])
            .expect("bad row skipped");
        assert_eq!(report.skipped, 1);
        assert_eq!(report.dataset.labels(), &[0, 1]);
        assert_eq!(report.dataset.features().get(1, 0), 3.0);
    }

    #[test]
    fn test_counts_and_select() {
        let ds = assemble(&[row("1", "0"), row("2", "0"), row("3", "1"), row("4", "1")]).dataset;
        assert_eq!(ds.n_bots(), 2);
        assert_eq!(ds.n_humans(), 2);
        let picked = ds.select(&[3, 0]);
        assert_eq!(picked.labels(), &[1, 0]);
        assert_eq!(picked.features().column(0), vec![4.0, 1.0]);
    }

    #[test]
    fn test_new_rejects_mismatched_labels() {
        assert!(LabeledDataset::new(Matrix::zeros(2, 1), vec![0]).is_err());
    }
}
