//! [`MemoryEngine`] – orchestrates ingestion across the three memory layers.
//!
//! Every utterance lands in short-term memory.  Only user utterances are
//! offered to the topic tracker and the fact store; assistant and system
//! turns never become topics or facts.

use parlor_types::Role;
use tracing::debug;

use crate::facts::FactStore;
use crate::short_term::{ShortTermConfig, ShortTermStore};
use crate::topics::TopicTracker;

/// Number of short-term items rendered by [`MemoryEngine::context_window`].
pub const CONTEXT_WINDOW_TURNS: usize = 8;

/// Layered conversation memory for a single session.
///
/// One engine per session; it is never shared across sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryEngine {
    short_term: ShortTermStore,
    topics: TopicTracker,
    facts: FactStore,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine whose short-term layer uses `config`.
    pub fn with_short_term(config: ShortTermConfig) -> Self {
        Self {
            short_term: ShortTermStore::new(config),
            ..Self::default()
        }
    }

    /// Record one utterance.
    pub fn ingest(&mut self, role: Role, text: &str) {
        self.short_term.add(role, text);
        let (new_topics, new_fact) = if role == Role::User {
            (self.topics.consider(text), self.facts.consider(text))
        } else {
            (0, false)
        };
        debug!(
            role = role.as_str(),
            chars = text.chars().count(),
            short_term = self.short_term.len(),
            new_topics,
            new_fact,
            "ingested utterance"
        );
    }

    /// The eight most recent turns as `"ROLE: text"` lines, oldest first.
    pub fn context_window(&self) -> String {
        self.short_term
            .recent(CONTEXT_WINDOW_TURNS)
            .iter()
            .map(|(role, text)| format!("{}: {}", role.as_upper(), text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn short_term(&self) -> &ShortTermStore {
        &self.short_term
    }

    pub fn topics(&self) -> &TopicTracker {
        &self.topics
    }

    pub fn facts(&self) -> &FactStore {
        &self.facts
    }
}
