//! Reply generation capability.
//!
//! [`ReplyGenerator`] is the seam between a chat session and whatever
//! produces the assistant's text.  Two implementations ship:
//!
//! - [`MockReplyGenerator`] – offline, deterministic, never fails.
//! - [`RemoteReplyGenerator`] – forwards to an OpenAI-compatible model server
//!   through [`LlmDriver`].
//!
//! The active variant is chosen once, at construction, from a
//! [`ReplyBackend`] flag via [`build_generator`].

use async_trait::async_trait;
use parlor_types::{ChatMessage, ParlorError, Role};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::llm_driver::LlmDriver;
use crate::persona::Persona;

// ─────────────────────────────────────────────────────────────────────────────
// Request
// ─────────────────────────────────────────────────────────────────────────────

/// Everything a generator may use to produce one reply.
#[derive(Debug, Clone)]
pub struct ReplyRequest {
    pub system_prompt: String,
    /// Recent conversation turns, oldest first.  Ends with the user's turn.
    pub recent_turns: Vec<ChatMessage>,
    /// Longer-horizon memory (topics, facts) rendered as text.
    pub engine_context: String,
    pub affection_level: u8,
}

impl ReplyRequest {
    /// Content of the most recent user turn, or `""` when there is none.
    pub fn last_user_turn(&self) -> &str {
        self.recent_turns
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Trait
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    async fn generate_reply(&self, request: &ReplyRequest) -> Result<String, ParlorError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend selection
// ─────────────────────────────────────────────────────────────────────────────

/// Which generator a session should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyBackend {
    #[default]
    Mock,
    Remote,
}

impl fmt::Display for ReplyBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplyBackend::Mock => write!(f, "mock"),
            ReplyBackend::Remote => write!(f, "remote"),
        }
    }
}

/// Connection settings for [`ReplyBackend::Remote`].
#[derive(Debug, Clone, Default)]
pub struct RemoteSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
}

/// Construct the generator selected by `backend`.
///
/// # Errors
///
/// Returns [`ParlorError::ReplyFailed`] when the remote backend is selected
/// but no base URL or model is configured.
pub fn build_generator(
    backend: ReplyBackend,
    persona: &Persona,
    remote: &RemoteSettings,
) -> Result<Box<dyn ReplyGenerator>, ParlorError> {
    match backend {
        ReplyBackend::Mock => Ok(Box::new(MockReplyGenerator::for_persona(persona))),
        ReplyBackend::Remote => {
            if remote.base_url.trim().is_empty() || remote.model.trim().is_empty() {
                return Err(ParlorError::ReplyFailed(
                    "remote backend requires a base URL and a model".into(),
                ));
            }
            let driver = LlmDriver::new(remote.base_url.clone(), remote.model.clone())
                .with_api_key(remote.api_key.clone());
            Ok(Box::new(RemoteReplyGenerator::new(driver)))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MockReplyGenerator
// ─────────────────────────────────────────────────────────────────────────────

/// Offline generator that echoes the user's last turn in character.
#[derive(Debug, Clone)]
pub struct MockReplyGenerator {
    persona_name: String,
    style: String,
}

impl MockReplyGenerator {
    pub fn new(persona_name: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            persona_name: persona_name.into(),
            style: style.into(),
        }
    }

    pub fn for_persona(persona: &Persona) -> Self {
        Self::new(persona.name.clone(), persona.style.clone())
    }

    /// Synchronous core of [`ReplyGenerator::generate_reply`]; cannot fail.
    pub fn compose(&self, request: &ReplyRequest) -> String {
        let opener = if request.affection_level >= 4 { "Hehe~" } else { "Hmm," };
        let sparkle = if request.affection_level >= 3 { " 💫" } else { "" };
        format!(
            "{opener} I'm {}, your {} companion. You said: '{}'. Ask me more?{sparkle}",
            self.persona_name,
            self.style,
            request.last_user_turn()
        )
    }
}

#[async_trait]
impl ReplyGenerator for MockReplyGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate_reply(&self, request: &ReplyRequest) -> Result<String, ParlorError> {
        Ok(self.compose(request))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// RemoteReplyGenerator
// ─────────────────────────────────────────────────────────────────────────────

/// Generator backed by an OpenAI-compatible model server.
#[derive(Debug)]
pub struct RemoteReplyGenerator {
    driver: LlmDriver,
}

impl RemoteReplyGenerator {
    pub fn new(driver: LlmDriver) -> Self {
        Self { driver }
    }

    /// System message followed by the recent turns.
    ///
    /// Non-empty engine context is appended to the system prompt under a
    /// `## Conversation memory` heading.
    pub fn build_messages(request: &ReplyRequest) -> Vec<ChatMessage> {
        let system = if request.engine_context.trim().is_empty() {
            request.system_prompt.clone()
        } else {
            format!(
                "{}\n\n## Conversation memory\n{}",
                request.system_prompt, request.engine_context
            )
        };
        std::iter::once(ChatMessage::system(system))
            .chain(request.recent_turns.iter().cloned())
            .collect()
    }
}

#[async_trait]
impl ReplyGenerator for RemoteReplyGenerator {
    fn name(&self) -> &str {
        "remote"
    }

    async fn generate_reply(&self, request: &ReplyRequest) -> Result<String, ParlorError> {
        let messages = Self::build_messages(request);
        self.driver
            .complete(&messages)
            .await
            .map_err(|e| ParlorError::ReplyFailed(e.to_string()))
    }
}
