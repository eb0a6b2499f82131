//! Pipeline configuration.
//!
//! Every field has a default, so a JSON config file only needs the keys it
//! changes:
//!
//! ```json
//! { "token_flags": true, "forest": { "n_trees": 50 } }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::{DatasetAssembler, RowErrorPolicy};
use crate::error::{BotDetectError, Result};
use crate::features::{FeatureRowBuilder, SuspiciousVocabulary};
use crate::model::ModelKind;
use crate::tree::SplitCriterion;

/// Hyperparameters of the forest variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees
    pub n_trees: usize,
    /// Worker threads used while training
    pub n_jobs: usize,
    /// Depth limit of each tree
    pub max_depth: Option<usize>,
    /// Split criterion of each tree
    pub criterion: SplitCriterion,
    /// Seed of the bootstrap and feature sampling
    pub random_state: Option<u64>,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            n_jobs: 2,
            max_depth: None,
            criterion: SplitCriterion::Entropy,
            random_state: Some(42),
        }
    }
}

/// Hyperparameters of the single-tree variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Depth limit
    pub max_depth: Option<usize>,
    /// Split criterion
    pub criterion: SplitCriterion,
    /// Seed, only relevant with feature subsampling
    pub random_state: Option<u64>,
}

/// End-to-end configuration: features, assembly, split and models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Tokens checked by the two token-flag features
    pub vocabulary: SuspiciousVocabulary,
    /// Append the screen-name and description token flags
    pub token_flags: bool,
    /// Abort on or skip unparseable rows
    pub row_errors: RowErrorPolicy,
    /// Fraction of rows held out for evaluation
    pub test_size: f32,
    /// Seed of the train/test shuffle
    pub random_state: Option<u64>,
    /// Model kinds trained by [`Pipeline::run`](super::Pipeline::run)
    pub classifiers: Vec<ModelKind>,
    /// Forest hyperparameters
    pub forest: ForestConfig,
    /// Single-tree hyperparameters
    pub tree: TreeConfig,
    /// Naive Bayes smoothing
    pub bayes_alpha: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineConfig {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            vocabulary: SuspiciousVocabulary::default(),
            token_flags: false,
            row_errors: RowErrorPolicy::Abort,
            test_size: 0.1,
            random_state: Some(0),
            classifiers: ModelKind::ALL.to_vec(),
            forest: ForestConfig::default(),
            tree: TreeConfig::default(),
            bayes_alpha: 0.0009,
        }
    }

    /// Loads a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read and `Format` if it is not a
    /// valid config.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    /// Parses a JSON config.
    ///
    /// # Errors
    ///
    /// Returns `Format` if the text is not a valid config.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| BotDetectError::Format {
            message: format!("config: {e}"),
        })
    }

    /// Enables or disables the token-flag features.
    #[must_use]
    pub fn with_token_flags(mut self, enabled: bool) -> Self {
        self.token_flags = enabled;
        self
    }

    /// Replaces the token vocabulary.
    #[must_use]
    pub fn with_vocabulary(mut self, vocabulary: SuspiciousVocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    /// Sets the row error policy.
    #[must_use]
    pub fn with_row_errors(mut self, policy: RowErrorPolicy) -> Self {
        self.row_errors = policy;
        self
    }

    /// Sets the held-out fraction.
    #[must_use]
    pub fn with_test_size(mut self, test_size: f32) -> Self {
        self.test_size = test_size;
        self
    }

    /// Sets the split seed (`None` for an unseeded shuffle).
    #[must_use]
    pub fn with_random_state(mut self, random_state: Option<u64>) -> Self {
        self.random_state = random_state;
        self
    }

    /// Sets the model kinds to train.
    #[must_use]
    pub fn with_classifiers(mut self, kinds: Vec<ModelKind>) -> Self {
        self.classifiers = kinds;
        self
    }

    /// Sets the forest size.
    #[must_use]
    pub fn with_n_trees(mut self, n_trees: usize) -> Self {
        self.forest.n_trees = n_trees;
        self
    }

    /// Sets the forest worker count.
    #[must_use]
    pub fn with_n_jobs(mut self, n_jobs: usize) -> Self {
        self.forest.n_jobs = n_jobs;
        self
    }

    /// Replaces the forest hyperparameters.
    #[must_use]
    pub fn with_forest(mut self, forest: ForestConfig) -> Self {
        self.forest = forest;
        self
    }

    /// Replaces the single-tree hyperparameters.
    #[must_use]
    pub fn with_tree(mut self, tree: TreeConfig) -> Self {
        self.tree = tree;
        self
    }

    /// Sets the Naive Bayes smoothing.
    #[must_use]
    pub fn with_bayes_alpha(mut self, alpha: f32) -> Self {
        self.bayes_alpha = alpha;
        self
    }

    /// Row builder for this configuration.
    #[must_use]
    pub fn feature_builder(&self) -> FeatureRowBuilder {
        FeatureRowBuilder::new()
            .with_vocabulary(self.vocabulary.clone())
            .with_token_flags(self.token_flags)
    }

    /// Dataset assembler for this configuration.
    #[must_use]
    pub fn assembler(&self) -> DatasetAssembler {
        DatasetAssembler::new(self.feature_builder()).with_row_errors(self.row_errors)
    }

    /// Checks hyperparameter ranges.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` naming the first bad value.
    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(BotDetectError::invalid_hyperparameter(
                "test_size",
                self.test_size,
                "0 < test_size < 1",
            ));
        }
        if self.forest.n_trees == 0 {
            return Err(BotDetectError::invalid_hyperparameter(
                "forest.n_trees",
                self.forest.n_trees,
                ">= 1",
            ));
        }
        if self.forest.n_jobs == 0 {
            return Err(BotDetectError::invalid_hyperparameter(
                "forest.n_jobs",
                self.forest.n_jobs,
                ">= 1",
            ));
        }
        if !(self.bayes_alpha >= 0.0) {
            return Err(BotDetectError::invalid_hyperparameter(
                "bayes_alpha",
                self.bayes_alpha,
                ">= 0",
            ));
        }
        if self.classifiers.is_empty() {
            return Err(BotDetectError::invalid_hyperparameter(
                "classifiers",
                "[]",
                "at least one model kind",
            ));
        }
        Ok(())
    }
}
