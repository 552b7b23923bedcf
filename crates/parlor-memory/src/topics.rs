//! Mid-Term Memory: coarse topic keywords.
//!
//! Tokenisation is deliberately naive: a token is a maximal run of
//! non-whitespace characters, lower-cased, and only tokens longer than four
//! characters are kept.  Punctuation is not stripped, so `"Developer."` is
//! tracked as `"developer."`.

use std::collections::HashSet;

/// Tokens must be strictly longer than this many characters to be tracked.
pub const MIN_KEYWORD_CHARS: usize = 4;

/// Number of keywords returned by [`TopicTracker::snapshot`].
pub const SNAPSHOT_LEN: usize = 10;

/// Insertion-ordered set of lower-case keywords extracted from user text.
#[derive(Debug, Clone, Default)]
pub struct TopicTracker {
    keywords: Vec<String>,
    seen: HashSet<String>,
}

impl TopicTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract keywords from `text`, appending any not already tracked.
    ///
    /// Returns how many new keywords were added.
    pub fn consider(&mut self, text: &str) -> usize {
        let mut added = 0;
        for token in text.split_whitespace() {
            if token.chars().count() <= MIN_KEYWORD_CHARS {
                continue;
            }
            let keyword = token.to_lowercase();
            if self.seen.insert(keyword.clone()) {
                self.keywords.push(keyword);
                added += 1;
            }
        }
        added
    }

    /// The most recently added keywords (up to ten), oldest first.
    pub fn snapshot(&self) -> &[String] {
        let start = self.keywords.len().saturating_sub(SNAPSHOT_LEN);
        &self.keywords[start..]
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_long_tokens_with_punctuation() {
        let mut t = TopicTracker::new();
        t.consider("I am a Developer.");
        assert_eq!(t.snapshot(), ["developer."]);
    }

    #[test]
    fn four_character_tokens_are_dropped() {
        let mut t = TopicTracker::new();
        t.consider("love rust crates");
        assert_eq!(t.snapshot(), ["crates"]);
    }

    #[test]
    fn duplicates_are_ignored_case_insensitively() {
        let mut t = TopicTracker::new();
        assert_eq!(t.consider("Project"), 1);
        assert_eq!(t.consider("PROJECT project"), 0);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn snapshot_returns_last_ten_in_insertion_order() {
        let mut t = TopicTracker::new();
        for i in 0..15 {
            t.consider(&format!("keyword{i:02}"));
        }
        let snap = t.snapshot();
        assert_eq!(snap.len(), 10);
        assert_eq!(snap[0], "keyword05");
        assert_eq!(snap[9], "keyword14");
    }

    #[test]
    fn empty_text_adds_nothing() {
        let mut t = TopicTracker::new();
        assert_eq!(t.consider(""), 0);
        assert!(t.snapshot().is_empty());
    }
}
