//! Botdetect: behavioral bot-account detection in pure Rust.
//!
//! Botdetect turns raw account records into fixed-width feature rows,
//! balances the two label classes, scales features into `[0, 1]`, and
//! trains one of three interchangeable classifiers (multinomial naive
//! Bayes, a decision tree, or a random forest). Trained models and scaler
//! states persist to disk with `bincode`.
//!
//! # Quick Start
//!
//! ```
//! use botdetect::prelude::*;
//!
//! // Two clearly separated accounts per class.
//! let x = Matrix::from_vec(4, 2, vec![
//!     0.0, 1.0,
//!     0.1, 0.9,
//!     1.0, 0.0,
//!     0.9, 0.1,
//! ]).unwrap();
//! let y = vec![0, 0, 1, 1];
//!
//! let mut forest = RandomForestClassifier::new(10).with_random_state(42);
//! forest.fit(&x, &y).unwrap();
//!
//! assert_eq!(forest.predict(&x), Some(vec![0, 0, 1, 1]));
//! ```
//!
//! # Modules
//!
//! - [`features`]: Raw records, suspicious vocabulary, feature row builder
//! - [`data`]: Labeled datasets and class-balanced assembly
//! - [`preprocessing`]: Min-max scaler
//! - [`classification`]: Multinomial naive Bayes
//! - [`tree`]: Decision tree and random forest classifiers
//! - [`model`]: Model kinds, training and evaluation
//! - [`metrics`]: Accuracy, confusion matrix, ROC curve and AUC
//! - [`model_selection`]: Train/test splitting
//! - [`serialization`]: Model and scaler persistence
//! - [`pipeline`]: End-to-end training pipeline and the fitted detector

pub mod classification;
pub mod data;
pub mod error;
pub mod features;
pub mod metrics;
pub mod model;
pub mod model_selection;
pub mod pipeline;
pub mod prelude;
pub mod preprocessing;
pub mod primitives;
pub mod serialization;
pub mod traits;
pub mod tree;

pub use error::{BotDetectError, Result};
pub use primitives::Matrix;
pub use traits::{Classifier, Transformer};
