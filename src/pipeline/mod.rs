//! End-to-end bot detection pipeline.
//!
//! `records -> assemble -> split -> scale -> train -> evaluate`, plus the
//! [`Detector`] used to classify unseen records with a fitted scaler and
//! model.

mod config;

use serde::{Deserialize, Serialize};

pub use config::{ForestConfig, PipelineConfig, TreeConfig};

use crate::error::{BotDetectError, Result};
use crate::features::{FeatureRowBuilder, RawRecord};
use crate::metrics::Evaluation;
use crate::model::{evaluate, train, ModelKind, TrainedModel};
use crate::model_selection::train_test_split;
use crate::preprocessing::{MinMaxScaler, ScalerState};
use crate::primitives::Matrix;
use crate::traits::{Classifier, Transformer};

/// Evaluation of one trained model kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelReport {
    /// Model kind
    pub kind: ModelKind,
    /// Held-out metrics
    pub evaluation: Evaluation,
}

/// Everything one pipeline run produced.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Bot rows parsed before balancing
    pub bots_seen: usize,
    /// Non-bot rows parsed before balancing
    pub humans_seen: usize,
    /// Rows dropped as unparseable
    pub skipped: usize,
    /// Training rows after the split
    pub n_train: usize,
    /// Held-out rows after the split
    pub n_test: usize,
    /// Scaler fitted on the training rows
    pub scaler: MinMaxScaler,
    /// One report per configured kind, in configuration order
    pub reports: Vec<ModelReport>,
    /// Fitted models, parallel to `reports`
    pub models: Vec<TrainedModel>,
}

impl PipelineReport {
    /// Fitted model of `kind`, if it was trained.
    #[must_use]
    pub fn model(&self, kind: ModelKind) -> Option<&TrainedModel> {
        self.models.iter().find(|m| m.kind() == kind)
    }

    /// Held-out report of `kind`, if it was trained.
    #[must_use]
    pub fn report(&self, kind: ModelKind) -> Option<&ModelReport> {
        self.reports.iter().find(|r| r.kind == kind)
    }
}

/// Drives assembly, splitting, scaling, training and evaluation.
///
/// # Example
///
/// ```
/// use botdetect::features::{FeatureField, RawRecord};
/// use botdetect::model::ModelKind;
/// use botdetect::pipeline::{Pipeline, PipelineConfig};
///
/// let records: Vec<RawRecord> = (0..40)
///     .map(|i| {
///         let bot = i % 2 == 1;
///         let value = if bot { "9" } else { "1" };
///         FeatureField::ALL
///             .iter()
///             .map(|f| (f.column(), value))
///             .chain([("bot", if bot { "1" } else { "0" })])
///             .collect()
///     })
///     .collect();
///
/// let config = PipelineConfig::new()
///     .with_test_size(0.25)
///     .with_classifiers(vec![ModelKind::Tree]);
/// let report = Pipeline::new(config).run(&records).expect("pipeline runs");
/// assert_eq!(report.n_train + report.n_test, 40);
/// assert_eq!(report.reports[0].evaluation.accuracy, 1.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Creates a pipeline for `config`.
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Assembles the balanced dataset, or fails if it is empty.
    fn assemble(&self, records: &[RawRecord]) -> Result<crate::data::AssemblyReport> {
        self.config.validate()?;
        let assembly = self.config.assembler().assemble(records)?;
        if assembly.dataset.is_empty() {
            return Err(BotDetectError::InsufficientData {
                bots: assembly.bots_seen,
                humans: assembly.humans_seen,
            });
        }
        tracing::info!(
            rows = assembly.dataset.len(),
            width = assembly.dataset.width(),
            skipped = assembly.skipped,
            "dataset assembled"
        );
        Ok(assembly)
    }

    /// Runs the full evaluation pipeline for every configured kind.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` for a bad config, row errors under
    /// the abort policy, `InsufficientData` if either class is absent, and
    /// any split, training or evaluation error.
    pub fn run(&self, records: &[RawRecord]) -> Result<PipelineReport> {
        let assembly = self.assemble(records)?;
        let split = train_test_split(
            &assembly.dataset,
            self.config.test_size,
            self.config.random_state,
        )?;

        let mut scaler = MinMaxScaler::new();
        let x_train = scaler.fit_transform(split.train.features())?;
        let x_test = scaler.transform(split.test.features())?;

        let mut reports = Vec::with_capacity(self.config.classifiers.len());
        let mut models = Vec::with_capacity(self.config.classifiers.len());
        for &kind in &self.config.classifiers {
            let model = train(&x_train, split.train.labels(), kind, &self.config)?;
            let evaluation = evaluate(&model, &x_test, split.test.labels())?;
            tracing::info!(
                %kind,
                accuracy = evaluation.accuracy,
                auc = ?evaluation.auc,
                "model evaluated"
            );
            reports.push(ModelReport { kind, evaluation });
            models.push(model);
        }

        Ok(PipelineReport {
            bots_seen: assembly.bots_seen,
            humans_seen: assembly.humans_seen,
            skipped: assembly.skipped,
            n_train: split.train.len(),
            n_test: split.test.len(),
            scaler,
            reports,
            models,
        })
    }

    /// Trains one model on the whole balanced dataset, without a held-out
    /// split, and wraps it for inference.
    ///
    /// # Errors
    ///
    /// Same as [`run`](Self::run), minus the split.
    pub fn train_detector(&self, records: &[RawRecord], kind: ModelKind) -> Result<Detector> {
        let assembly = self.assemble(records)?;
        let mut scaler = MinMaxScaler::new();
        let x = scaler.fit_transform(assembly.dataset.features())?;
        let model = train(&x, assembly.dataset.labels(), kind, &self.config)?;
        Detector::new(self.config.feature_builder(), scaler, model)
    }
}

/// Classifies unseen records with a fitted scaler and model.
///
/// The scaler is only applied, never refitted.
#[derive(Debug, Clone)]
pub struct Detector {
    builder: FeatureRowBuilder,
    scaler: MinMaxScaler,
    model: TrainedModel,
}

impl Detector {
    /// Bundles a row builder, a fitted scaler and a fitted model.
    ///
    /// # Errors
    ///
    /// Returns `ModelNotReady` if the scaler or model is unfitted and
    /// `DimensionMismatch` if the three disagree on the feature width.
    pub fn new(builder: FeatureRowBuilder, scaler: MinMaxScaler, model: TrainedModel) -> Result<Self> {
        let scaler_width = scaler
            .state()
            .map(ScalerState::width)
            .ok_or(BotDetectError::ModelNotReady)?;
        let model_width = model.n_features().ok_or(BotDetectError::ModelNotReady)?;
        if scaler_width != builder.width() {
            return Err(BotDetectError::dimension_mismatch(
                "scaler width",
                builder.width(),
                scaler_width,
            ));
        }
        if model_width != builder.width() {
            return Err(BotDetectError::dimension_mismatch(
                "model width",
                builder.width(),
                model_width,
            ));
        }
        Ok(Self {
            builder,
            scaler,
            model,
        })
    }

    /// Row builder in use.
    #[must_use]
    pub fn builder(&self) -> &FeatureRowBuilder {
        &self.builder
    }

    /// Fitted scaler.
    #[must_use]
    pub fn scaler(&self) -> &MinMaxScaler {
        &self.scaler
    }

    /// Fitted model.
    #[must_use]
    pub fn model(&self) -> &TrainedModel {
        &self.model
    }

    fn scaled(&self, records: &[RawRecord]) -> Result<Matrix<f32>> {
        let rows = records
            .iter()
            .map(|r| self.builder.build(r))
            .collect::<Result<Vec<_>>>()?;
        let x = Matrix::from_rows(self.builder.width(), &rows)?;
        self.scaler.transform(&x)
    }

    /// Predicted label (1 = bot) per record.
    ///
    /// # Errors
    ///
    /// Returns the first row error, or `ModelNotReady` if the model
    /// refuses the input.
    pub fn predict(&self, records: &[RawRecord]) -> Result<Vec<usize>> {
        let x = self.scaled(records)?;
        self.model.predict(&x).ok_or(BotDetectError::ModelNotReady)
    }

    /// Class-1 score per record.
    ///
    /// # Errors
    ///
    /// Same as [`predict`](Self::predict).
    pub fn predict_scores(&self, records: &[RawRecord]) -> Result<Vec<f32>> {
        let x = self.scaled(records)?;
        self.model
            .predict_scores(&x)
            .ok_or(BotDetectError::ModelNotReady)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RowErrorPolicy;
    use crate::features::FeatureField;

    /// First five fields carry `low`, the remaining six carry `high`.
    fn record(low: f32, high: f32, bot: bool) -> RawRecord {
        FeatureField::ALL
            .iter()
            .enumerate()
            .map(|(i, f)| (f.column(), if i < 5 { low } else { high }.to_string()))
            .chain([("bot", if bot { "1" } else { "0" }.to_string())])
            .collect()
    }

    fn records(n: usize) -> Vec<RawRecord> {
        (0..n)
            .map(|i| {
                let jitter = (i % 3) as f32;
                if i % 2 == 0 {
                    record(jitter, 8.0 + jitter, true)
                } else {
                    record(8.0 + jitter, jitter, false)
                }
            })
            .collect()
    }

    fn fast_config() -> PipelineConfig {
        PipelineConfig::new().with_n_trees(10).with_test_size(0.25)
    }

    #[test]
    fn test_run_every_kind() {
        let report = Pipeline::new(fast_config()).run(&records(40)).expect("runs");
        assert_eq!(report.reports.len(), 3);
        assert_eq!(report.models.len(), 3);
        assert_eq!(report.n_train, 30);
        assert_eq!(report.n_test, 10);
        for r in &report.reports {
            assert!((r.evaluation.accuracy - 1.0).abs() < f32::EPSILON, "{}", r.kind);
        }
        assert!(report.model(ModelKind::Forest).is_some());
        assert!(report.scaler.is_fitted());
    }

    #[test]
    fn test_run_single_class_is_insufficient() {
        let only_humans: Vec<RawRecord> = (0..5).map(|_| record(1.0, 1.0, false)).collect();
        let err = Pipeline::new(fast_config())
            .run(&only_humans)
            .expect_err("no bots");
        assert!(matches!(
            err,
            BotDetectError::InsufficientData { bots: 0, humans: 5 }
        ));
    }

    #[test]
    fn test_run_rejects_invalid_config() {
        let err = Pipeline::new(fast_config().with_n_trees(0))
            .run(&records(10))
            .expect_err("zero trees");
        assert!(matches!(err, BotDetectError::InvalidHyperparameter { .. }));
    }

    #[test]
    fn test_run_skips_bad_rows() {
        let mut rows = records(20);
        rows.push(record(1.0, 9.0, true).with("age", "oops"));
        let config = fast_config().with_row_errors(RowErrorPolicy::Skip);
        let report = Pipeline::new(config).run(&rows).expect("runs");
        assert_eq!(report.skipped, 1);

        let err = Pipeline::new(fast_config()).run(&rows).expect_err("aborts");
        assert!(err.is_row_error());
    }

    #[test]
    fn test_detector_predicts_unseen_records() {
        let pipeline = Pipeline::new(fast_config());
        let detector = pipeline
            .train_detector(&records(30), ModelKind::Forest)
            .expect("trains");
        let unseen = [record(9.5, 0.5, false), record(0.5, 9.5, true)];
        assert_eq!(detector.predict(&unseen).expect("predicts"), vec![0, 1]);
        let scores = detector.predict_scores(&unseen).expect("scores");
        assert!(scores[0] < scores[1]);
    }

    #[test]
    fn test_detector_rejects_width_mismatch() {
        let detector = Pipeline::new(fast_config())
            .train_detector(&records(20), ModelKind::Tree)
            .expect("trains");
        let err = Detector::new(
            FeatureRowBuilder::new().with_token_flags(true),
            detector.scaler().clone(),
            detector.model().clone(),
        )
        .expect_err("13 vs 11");
        assert!(matches!(err, BotDetectError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_detector_rejects_unfitted_parts() {
        let model = TrainedModel::new(ModelKind::Bayesian, &fast_config());
        let err = Detector::new(FeatureRowBuilder::new(), MinMaxScaler::new(), model)
            .expect_err("unfitted");
        assert!(matches!(err, BotDetectError::ModelNotReady));
    }
}
