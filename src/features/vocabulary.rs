//! Bot-indicative token vocabulary.

use serde::{Deserialize, Serialize};

const DEFAULT_TOKENS: &[&str] = &[
    "Bot", "bot", "b0t", "B0T", "B0t", "random", "http", "co", "every", "twitter", "pubmed",
    "news", "created", "like", "feed", "tweeting", "task", "world", "x", "affiliated", "latest",
    "twitterbot", "project", "botally", "generated", "image", "reply", "tinysubversions",
    "biorxiv", "digital", "rt", "ckolderup", "arxiv", "rss", "thricedotted", "collection", "want",
    "backspace", "maintained", "things", "curated", "see", "us", "people", "every", "love", "please",
];

/// Ordered set of tokens whose presence suggests an automated account.
///
/// Matching is a case-sensitive substring test, so `"bot"` matches
/// `"newsbot42"` but not `"NEWSBOT"`; the default list carries the common
/// capitalisations explicitly.
///
/// # Examples
///
/// ```
/// use botdetect::features::SuspiciousVocabulary;
///
/// let vocab = SuspiciousVocabulary::new(["bot", "rss"]);
/// assert!(vocab.matches("daily_rss_feed"));
/// assert!(!vocab.matches("Jane Doe"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SuspiciousVocabulary {
    tokens: Vec<String>,
}

impl SuspiciousVocabulary {
    /// Builds a vocabulary, keeping first occurrences and dropping empty
    /// tokens (an empty token would match every string).
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut kept: Vec<String> = Vec::new();
        for token in tokens {
            let token = token.into();
            if !token.is_empty() && !kept.contains(&token) {
                kept.push(token);
            }
        }
        Self { tokens: kept }
    }

    /// True if any token occurs in `text`.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        self.tokens.iter().any(|t| text.contains(t.as_str()))
    }

    /// `1.0` if any token occurs in `text`, else `0.0`.
    #[must_use]
    pub fn flag(&self, text: &str) -> f32 {
        if self.matches(text) {
            1.0
        } else {
            0.0
        }
    }

    /// Tokens in insertion order.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Number of distinct tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True if no token is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Default for SuspiciousVocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_TOKENS.iter().copied())
    }
}

impl From<Vec<String>> for SuspiciousVocabulary {
    fn from(tokens: Vec<String>) -> Self {
        Self::new(tokens)
    }
}

impl From<SuspiciousVocabulary> for Vec<String> {
    fn from(vocabulary: SuspiciousVocabulary) -> Self {
        vocabulary.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_deduplicated() {
        let vocab = SuspiciousVocabulary::default();
        assert_eq!(DEFAULT_TOKENS.len(), 47);
        assert_eq!(vocab.len(), 46);
        assert_eq!(vocab.tokens()[0], "Bot");
    }

    #[test]
    fn test_case_sensitive_substring() {
        let vocab = SuspiciousVocabulary::new(["bot"]);
        assert!(vocab.matches("weatherbot"));
        assert!(!vocab.matches("WEATHERBOT"));
    }

    #[test]
    fn test_empty_tokens_are_dropped() {
        let vocab = SuspiciousVocabulary::new(["", "rss"]);
        assert_eq!(vocab.len(), 1);
        assert!(!vocab.matches("plain"));
    }

    #[test]
    fn test_flag_values() {
        let vocab = SuspiciousVocabulary::new(["b0t"]);
        assert!((vocab.flag("i am a b0t") - 1.0).abs() < f32::EPSILON);
        assert!(vocab.flag("human").abs() < f32::EPSILON);
    }

    #[test]
    fn test_empty_vocabulary_never_matches() {
        let vocab = SuspiciousVocabulary::new(Vec::<String>::new());
        assert!(vocab.is_empty());
        assert!(!vocab.matches("bot"));
    }

    #[test]
    fn test_serde_is_a_plain_list() {
        let vocab = SuspiciousVocabulary::new(["bot", "rss"]);
        let json = serde_json::to_string(&vocab).expect("serialize");
        assert_eq!(json, r#"["bot","rss"]"#);
        let back: SuspiciousVocabulary = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, vocab);
    }

    #[test]
    fn test_deserialize_drops_empty_and_duplicate_tokens() {
        let vocab: SuspiciousVocabulary =
            serde_json::from_str(r#"["", "bot", "bot", "rss"]"#).expect("deserialize");
        assert_eq!(vocab.tokens(), &["bot".to_string(), "rss".to_string()]);
        assert!(!vocab.matches("jane"));
    }
}
