//! `parlor-memory` – layered conversation memory.
//!
//! Three in-process layers with distinct retention policies, composed by a
//! single [`MemoryEngine`] per conversation session.  Nothing here persists
//! across runs and nothing here can fail.
//!
//! # Modules
//!
//! - [`short_term`] – [`ShortTermStore`][short_term::ShortTermStore]: a
//!   bounded queue of recent utterances with capacity- and age-based eviction.
//! - [`topics`] – [`TopicTracker`][topics::TopicTracker]: mid-term memory of
//!   coarse keywords extracted from user utterances.
//! - [`facts`] – [`FactStore`][facts::FactStore]: long-term memory of
//!   self-descriptive statements ("I am …", "my name is …").
//! - [`engine`] – [`MemoryEngine`][engine::MemoryEngine]: routes each
//!   utterance to the right layers and renders the bounded context window
//!   handed to reply generation.

pub mod engine;
pub mod facts;
pub mod short_term;
pub mod topics;

pub use engine::MemoryEngine;
pub use facts::FactStore;
pub use short_term::{MemoryItem, ShortTermConfig, ShortTermStore};
pub use topics::TopicTracker;
