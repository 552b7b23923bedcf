//! Long-Term Memory: self-descriptive statements.
//!
//! A user utterance is kept verbatim (trimmed) when its lower-cased form
//! contains `"i am"` or `"my name is"`.  No deduplication is performed.

/// Phrases that mark an utterance as a durable fact.
pub const FACT_MARKERS: [&str; 2] = ["i am", "my name is"];

/// Number of facts rendered by [`FactStore::summary`].
pub const SUMMARY_LEN: usize = 10;

/// Rendered by [`FactStore::summary`] when nothing has been retained.
pub const EMPTY_SUMMARY: &str = "No long-term facts yet.";

/// Append-only list of detected facts, in detection order.
#[derive(Debug, Clone, Default)]
pub struct FactStore {
    facts: Vec<String>,
}

impl FactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retain `text` if it looks like a statement about the speaker.
    ///
    /// Returns `true` when a fact was appended.
    pub fn consider(&mut self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        if FACT_MARKERS.iter().any(|m| lowered.contains(m)) {
            self.facts.push(text.trim().to_string());
            true
        } else {
            false
        }
    }

    /// Header line followed by the ten newest facts, newest last.
    pub fn summary(&self) -> String {
        if self.facts.is_empty() {
            return EMPTY_SUMMARY.to_string();
        }
        let start = self.facts.len().saturating_sub(SUMMARY_LEN);
        let mut out = String::from("Long-term facts:");
        for fact in &self.facts[start..] {
            out.push_str("\n- ");
            out.push_str(fact);
        }
        out
    }

    pub fn facts(&self) -> &[String] {
        &self.facts
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_summary_is_fixed_literal() {
        assert_eq!(FactStore::new().summary(), "No long-term facts yet.");
    }

    #[test]
    fn i_am_statement_is_retained() {
        let mut f = FactStore::new();
        assert!(f.consider("I am Alex"));
        assert_eq!(f.summary(), "Long-term facts:\n- I am Alex");
    }

    #[test]
    fn original_casing_kept_and_whitespace_trimmed() {
        let mut f = FactStore::new();
        f.consider("   My Name Is Alex.  ");
        assert_eq!(f.facts(), ["My Name Is Alex."]);
    }

    #[test]
    fn unrelated_text_is_ignored() {
        let mut f = FactStore::new();
        assert!(!f.consider("The weather is nice"));
        assert!(f.is_empty());
    }

    #[test]
    fn marker_matches_inside_words() {
        // "Miami ambience" contains "i am" once lower-cased.
        let mut f = FactStore::new();
        assert!(f.consider("Miami ambience"));
    }

    #[test]
    fn repeated_facts_are_stored_each_time() {
        let mut f = FactStore::new();
        f.consider("I am here");
        f.consider("I am here");
        assert_eq!(f.len(), 2);
    }

    #[test]
    fn summary_shows_ten_newest_newest_last() {
        let mut f = FactStore::new();
        for i in 0..12 {
            f.consider(&format!("I am fact {i}"));
        }
        let summary = f.summary();
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[0], "Long-term facts:");
        assert_eq!(lines[1], "- I am fact 2");
        assert_eq!(lines[10], "- I am fact 11");
    }
}
