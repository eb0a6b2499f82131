//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use botdetect::prelude::*;
//! ```

pub use crate::classification::MultinomialNB;
pub use crate::data::{DatasetAssembler, LabeledDataset, RowErrorPolicy};
pub use crate::error::{BotDetectError, Result};
pub use crate::features::{FeatureField, FeatureRowBuilder, FeatureVector, RawRecord, SuspiciousVocabulary};
pub use crate::metrics::{accuracy, roc_auc_score, roc_curve, ConfusionMatrix, Evaluation};
pub use crate::model::{evaluate, train, ModelKind, TrainedModel};
pub use crate::model_selection::train_test_split;
pub use crate::pipeline::{Detector, Pipeline, PipelineConfig};
pub use crate::preprocessing::{MinMaxScaler, ScalerState};
pub use crate::primitives::Matrix;
pub use crate::serialization::{export, import};
pub use crate::traits::{Classifier, Transformer};
pub use crate::tree::{DecisionTreeClassifier, RandomForestClassifier, SplitCriterion};
