//! Feature layout: the fixed order of columns in every feature vector.
//!
//! Changing the order, adding a field, or toggling the token flags changes
//! the vector shape. Models and scalers fitted on one layout must not be
//! applied to another.

use serde::{Deserialize, Serialize};

/// Numeric behavioral fields, in feature-vector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureField {
    /// Account age
    Age,
    /// Followers / following ratio
    InOutRatio,
    /// Favorites per unit of account age
    FavoritesRatio,
    /// Statuses per unit of account age
    StatusRatio,
    /// Account reputation
    AccountRep,
    /// Average tweets per day
    AvgTweetsPerDay,
    /// Fraction of tweets carrying hashtags
    HashtagsRatio,
    /// Fraction of tweets carrying user mentions
    UserMentionsRatio,
    /// Fraction of tweets carrying URLs
    UrlRatio,
    /// Content complexity estimate
    ContentComplexity,
    /// Spam ratio
    SpamRatio,
}

impl FeatureField {
    /// All numeric fields in vector order.
    pub const ALL: [FeatureField; 11] = [
        FeatureField::Age,
        FeatureField::InOutRatio,
        FeatureField::FavoritesRatio,
        FeatureField::StatusRatio,
        FeatureField::AccountRep,
        FeatureField::AvgTweetsPerDay,
        FeatureField::HashtagsRatio,
        FeatureField::UserMentionsRatio,
        FeatureField::UrlRatio,
        FeatureField::ContentComplexity,
        FeatureField::SpamRatio,
    ];

    /// Column name in the input records.
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            FeatureField::Age => "age",
            FeatureField::InOutRatio => "in_out_ratio",
            FeatureField::FavoritesRatio => "favorites_ratio",
            FeatureField::StatusRatio => "status_ratio",
            FeatureField::AccountRep => "account_rep",
            FeatureField::AvgTweetsPerDay => "avg_tpd",
            FeatureField::HashtagsRatio => "hashtags_ratio",
            FeatureField::UserMentionsRatio => "user_mentions_ratio",
            FeatureField::UrlRatio => "url_ratio",
            FeatureField::ContentComplexity => "cce",
            FeatureField::SpamRatio => "spam_ratio",
        }
    }
}

/// Column holding the account handle.
pub const SCREEN_NAME_COLUMN: &str = "screen_name";

/// Column holding the free-text profile description.
pub const DESCRIPTION_COLUMN: &str = "description";

/// Column holding the `"0"`/`"1"` label.
pub const LABEL_COLUMN: &str = "bot";

/// Column holding the account identifier.
pub const ID_COLUMN: &str = "id";

/// Names of the two token-flag features appended after the numeric fields.
pub const TOKEN_FLAG_NAMES: [&str; 2] = ["screen_name_has_bot_token", "description_has_bot_token"];

/// Number of numeric fields.
pub const NUMERIC_WIDTH: usize = FeatureField::ALL.len();

/// Vector width for a layout with or without the token flags.
#[must_use]
pub const fn layout_width(token_flags: bool) -> usize {
    if token_flags {
        NUMERIC_WIDTH + TOKEN_FLAG_NAMES.len()
    } else {
        NUMERIC_WIDTH
    }
}

/// Feature names in vector order.
#[must_use]
pub fn feature_names(token_flags: bool) -> Vec<&'static str> {
    let mut names: Vec<&'static str> = FeatureField::ALL.iter().map(|f| f.column()).collect();
    if token_flags {
        names.extend_from_slice(&TOKEN_FLAG_NAMES);
    }
    names
}
