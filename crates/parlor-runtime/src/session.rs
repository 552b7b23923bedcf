//! [`ChatSession`] – one conversation, one memory engine.
//!
//! The session is the thin driver around [`MemoryEngine`]: it updates the
//! affection meter, ingests the user's turn, asks the primary generator for a
//! reply (falling back to the mock generator on any failure) and ingests the
//! chosen reply exactly once.

use parlor_memory::engine::CONTEXT_WINDOW_TURNS;
use parlor_memory::{MemoryEngine, ShortTermConfig};
use parlor_types::{ChatMessage, Role};
use tracing::{Instrument, info_span, warn};
use uuid::Uuid;

use crate::persona::{AffectionSystem, Persona};
use crate::reply::{MockReplyGenerator, ReplyGenerator, ReplyRequest};

/// Which generator produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Primary,
    Fallback,
}

/// Outcome of one user turn.
#[derive(Debug, Clone)]
pub struct Turn {
    pub reply: String,
    pub source: ReplySource,
    pub affection: u8,
}

/// A single conversation session.
pub struct ChatSession {
    id: Uuid,
    engine: MemoryEngine,
    persona: Persona,
    affection: AffectionSystem,
    primary: Box<dyn ReplyGenerator>,
    fallback: MockReplyGenerator,
}

impl ChatSession {
    pub fn new(persona: Persona, primary: Box<dyn ReplyGenerator>) -> Self {
        Self::with_short_term(persona, primary, ShortTermConfig::default())
    }

    pub fn with_short_term(
        persona: Persona,
        primary: Box<dyn ReplyGenerator>,
        short_term: ShortTermConfig,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            engine: MemoryEngine::with_short_term(short_term),
            affection: AffectionSystem::for_persona(&persona),
            fallback: MockReplyGenerator::for_persona(&persona),
            persona,
            primary,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn engine(&self) -> &MemoryEngine {
        &self.engine
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn affection(&self) -> &AffectionSystem {
        &self.affection
    }

    pub fn generator_name(&self) -> &str {
        self.primary.name()
    }

    /// Topic snapshot and fact summary, rendered for the generator.
    pub fn engine_context(&self) -> String {
        let topics = self.engine.topics().snapshot();
        let topics = if topics.is_empty() {
            "Recent topics: (none)".to_string()
        } else {
            format!("Recent topics: {}", topics.join(", "))
        };
        format!("{}\n{}", topics, self.engine.facts().summary())
    }

    fn build_request(&self) -> ReplyRequest {
        let recent_turns = self
            .engine
            .short_term()
            .recent(CONTEXT_WINDOW_TURNS)
            .into_iter()
            .map(|(role, text)| ChatMessage::new(role, text))
            .collect();
        ReplyRequest {
            system_prompt: self.persona.system_prompt(),
            recent_turns,
            engine_context: self.engine_context(),
            affection_level: self.affection.level(),
        }
    }

    /// Process one user utterance and return the assistant's reply.
    ///
    /// Never fails: a primary generator error is logged and the mock
    /// fallback answers instead.
    pub async fn respond(&mut self, user_text: &str) -> Turn {
        let span = info_span!("turn", session = %self.id, generator = self.primary.name());
        async {
            let affection = self.affection.update(user_text);
            self.engine.ingest(Role::User, user_text);

            let request = self.build_request();
            let (reply, source) = match self.primary.generate_reply(&request).await {
                Ok(reply) => (reply, ReplySource::Primary),
                Err(e) => {
                    warn!(error = %e, "primary generator failed; using mock fallback");
                    (self.fallback.compose(&request), ReplySource::Fallback)
                }
            };

            self.engine.ingest(Role::Assistant, &reply);
            Turn {
                reply,
                source,
                affection,
            }
        }
        .instrument(span)
        .await
    }
}
