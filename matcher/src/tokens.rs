//! Keyword extraction for free-text profile attributes.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z0-9]+").expect("static regex"));

/// Words that carry no matching signal. Campus and student words appear on
/// nearly every profile so they are pruned too.
pub const STOPWORDS: &[&str] = &[
    "and", "or", "the", "a", "an", "to", "of", "in", "for", "with", "on", "at", "from", "is",
    "are", "be", "this", "that", "i", "me", "my", "we", "us", "you", "your", "it", "as", "by",
    "into", "etc", "mcmaster", "mac", "student", "students",
];

static STOPWORD_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| STOPWORDS.iter().copied().collect());

/// Lowercase alphanumeric keywords of length >= 2, stopwords removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSet(HashSet<String>);

impl TokenSet {
    pub fn from_text(text: &str) -> Self {
        let lower = text.to_lowercase();
        Self(
            WORD_RE
                .find_iter(&lower)
                .map(|m| m.as_str())
                .filter(|token| token.len() >= 2 && !STOPWORD_SET.contains(token))
                .map(ToString::to_string)
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    /// Size of the intersection with `other`.
    pub fn overlap(&self, other: &TokenSet) -> usize {
        let (small, large) = if self.0.len() <= other.0.len() {
            (&self.0, &other.0)
        } else {
            (&other.0, &self.0)
        };
        small.iter().filter(|token| large.contains(*token)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_lowercase_alphanumeric() {
        let tokens = TokenSet::from_text("Chess Club, Robotics-Team & K-Pop!");
        assert!(tokens.contains("chess"));
        assert!(tokens.contains("club"));
        assert!(tokens.contains("robotics"));
        assert!(tokens.contains("team"));
        assert!(tokens.contains("pop"));
        // single-character run is dropped
        assert!(!tokens.contains("k"));
        assert_eq!(tokens.len(), 5);
    }

    #[test]
    fn test_stopwords_and_campus_words_removed() {
        let tokens = TokenSet::from_text("I am a McMaster student in the Mac Chess club");
        assert!(!tokens.contains("mcmaster"));
        assert!(!tokens.contains("mac"));
        assert!(!tokens.contains("student"));
        assert!(!tokens.contains("the"));
        assert!(tokens.contains("am"));
        assert!(tokens.contains("chess"));
        assert!(tokens.contains("club"));
    }

    #[test]
    fn test_non_ascii_splits_words() {
        let tokens = TokenSet::from_text("café crème");
        assert!(tokens.contains("caf"));
        assert!(tokens.contains("cr"));
        // "me" is a stopword
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_overlap_counts_shared_tokens() {
        let a = TokenSet::from_text("hiking, photography, board games");
        let b = TokenSet::from_text("Photography and games night");
        assert_eq!(a.overlap(&b), 2);
        assert_eq!(b.overlap(&a), 2);
        assert_eq!(a.overlap(&TokenSet::default()), 0);
        assert!(TokenSet::from_text("  ").is_empty());
    }
}
