//! Feature row construction.
//!
//! Turns one raw account record (string-valued columns) into a numeric
//! [`FeatureVector`] with a fixed column order. Numeric fields are parsed
//! and clamped to be non-negative; two optional flags record whether the
//! screen name or description contains a bot-indicative token.
//!
//! # Example
//!
//! ```
//! use botdetect::features::{FeatureRowBuilder, RawRecord};
//!
//! let record: RawRecord = [
//!     ("age", "10"), ("in_out_ratio", "-0.5"), ("favorites_ratio", "0"),
//!     ("status_ratio", "1"), ("account_rep", "0.2"), ("avg_tpd", "3"),
//!     ("hashtags_ratio", "0"), ("user_mentions_ratio", "0"), ("url_ratio", "0"),
//!     ("cce", "0.1"), ("spam_ratio", "0"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let row = FeatureRowBuilder::new().build(&record).expect("all fields parse");
//! assert_eq!(row.len(), 11);
//! assert_eq!(row.as_slice()[1], 0.0); // negatives clamp to zero
//! ```

mod layout;
mod vocabulary;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{BotDetectError, Result};

pub use layout::{
    feature_names, layout_width, FeatureField, DESCRIPTION_COLUMN, ID_COLUMN, LABEL_COLUMN,
    NUMERIC_WIDTH, SCREEN_NAME_COLUMN, TOKEN_FLAG_NAMES,
};
pub use vocabulary::SuspiciousVocabulary;

/// One input row: column name to raw string value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: HashMap<String, String>,
}

impl RawRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a column value, replacing any previous one.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(column, value);
        self
    }

    /// Raw value of a column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Raw value of a column, or `MissingField`.
    ///
    /// # Errors
    ///
    /// Returns [`BotDetectError::MissingField`] if the column is absent.
    pub fn require(&self, column: &str) -> Result<&str> {
        self.get(column).ok_or_else(|| BotDetectError::MissingField {
            field: column.to_string(),
        })
    }

    /// True if the row is labeled as a bot (`bot` column equal to `"1"`).
    ///
    /// Anything else, including a missing label, counts as non-bot.
    #[must_use]
    pub fn is_bot(&self) -> bool {
        self.get(LABEL_COLUMN).map(str::trim) == Some("1")
    }

    /// Number of columns present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the record has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RawRecord
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Numeric feature vector in layout order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    /// Wraps already-ordered values.
    #[must_use]
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    /// Values in layout order.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the vector has no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value of a numeric field.
    #[must_use]
    pub fn get(&self, field: FeatureField) -> Option<f32> {
        let idx = FeatureField::ALL.iter().position(|f| *f == field)?;
        self.0.get(idx).copied()
    }

    /// Consumes the vector, returning the values.
    #[must_use]
    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

impl AsRef<[f32]> for FeatureVector {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

/// Clamps a value to be non-negative.
///
/// Idempotent: `clamp_non_negative(clamp_non_negative(v)) == clamp_non_negative(v)`.
#[must_use]
pub fn clamp_non_negative(value: f32) -> f32 {
    if value < 0.0 {
        0.0
    } else {
        value
    }
}

/// Parses one numeric column.
///
/// Surrounding whitespace is ignored. The text is read as `f64` and then
/// narrowed to the nearest `f32`; `NaN`, infinities and values beyond the
/// `f32` range are rejected, since they would poison the scaler ranges.
fn parse_numeric(column: &str, raw: &str) -> Result<f32> {
    let parse_error = || BotDetectError::Parse {
        field: column.to_string(),
        value: raw.to_string(),
    };
    let wide: f64 = raw.trim().parse().map_err(|_| parse_error())?;
    if !wide.is_finite() || wide.abs() > f64::from(f32::MAX) {
        return Err(parse_error());
    }
    Ok(wide as f32)
}

/// Builds feature vectors from raw records.
///
/// The builder owns the layout decision: with `token_flags` disabled every
/// vector has [`NUMERIC_WIDTH`] entries, with it enabled two flag columns
/// are appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRowBuilder {
    vocabulary: SuspiciousVocabulary,
    token_flags: bool,
}

impl FeatureRowBuilder {
    /// Numeric fields only, default vocabulary.
    #[must_use]
    pub fn new() -> Self {
        Self {
            vocabulary: SuspiciousVocabulary::default(),
            token_flags: false,
        }
    }

    /// Enables or disables the two token-flag columns.
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

    /// True if token flags are appended.
    #[must_use]
    pub fn token_flags(&self) -> bool {
        self.token_flags
    }

    /// Vocabulary used for the token flags.
    #[must_use]
    pub fn vocabulary(&self) -> &SuspiciousVocabulary {
        &self.vocabulary
    }

    /// Width of every vector this builder produces.
    #[must_use]
    pub fn width(&self) -> usize {
        layout_width(self.token_flags)
    }

    /// Feature names in vector order.
    #[must_use]
    pub fn feature_names(&self) -> Vec<&'static str> {
        feature_names(self.token_flags)
    }

    /// Builds the feature vector for one record.
    ///
    /// # Errors
    ///
    /// Returns [`BotDetectError::MissingField`] if a numeric column is
    /// absent and [`BotDetectError::Parse`] if one is not a number. Missing
    /// text columns are treated as empty text.
    pub fn build(&self, record: &RawRecord) -> Result<FeatureVector> {
        let mut values = Vec::with_capacity(self.width());
        for field in FeatureField::ALL {
            let column = field.column();
            let raw = record.require(column)?;
            values.push(clamp_non_negative(parse_numeric(column, raw)?));
        }
        if self.token_flags {
            let screen_name = record.get(SCREEN_NAME_COLUMN).unwrap_or_default();
            let description = record.get(DESCRIPTION_COLUMN).unwrap_or_default();
            values.push(self.vocabulary.flag(screen_name));
            values.push(self.vocabulary.flag(description));
        }
        Ok(FeatureVector(values))
    }
}

impl Default for FeatureRowBuilder {
    fn default() -> Self {
        Self::new()
    }
}
