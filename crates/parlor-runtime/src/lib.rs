//! `parlor-runtime` – everything around the memory engine.
//!
//! # Modules
//!
//! - [`session`] – [`ChatSession`][session::ChatSession]: owns one
//!   [`MemoryEngine`][parlor_memory::MemoryEngine] per conversation and runs
//!   each user turn through affection, ingestion, reply generation and
//!   fallback.
//! - [`reply`] – the [`ReplyGenerator`][reply::ReplyGenerator] seam with its
//!   mock and remote implementations, selected by
//!   [`ReplyBackend`][reply::ReplyBackend].
//! - [`llm_driver`] – [`LlmDriver`][llm_driver::LlmDriver]: an async
//!   OpenAI-compatible chat-completions client.
//! - [`persona`] – [`Persona`][persona::Persona] character sheets and the
//!   [`AffectionSystem`][persona::AffectionSystem] mood meter.
//! - [`retrieval`] – [`Corpus`][retrieval::Corpus]: Jaccard keyword-overlap
//!   ranking over a folder of text documents.  Independent of the memory
//!   engine.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: global
//!   `tracing` subscriber with optional OTLP export.

pub mod llm_driver;
pub mod persona;
pub mod reply;
pub mod retrieval;
pub mod session;
pub mod telemetry;

pub use llm_driver::{LlmDriver, LlmError};
pub use persona::{AffectionSystem, Persona};
pub use reply::{
    MockReplyGenerator, RemoteReplyGenerator, RemoteSettings, ReplyBackend, ReplyGenerator,
    ReplyRequest, build_generator,
};
pub use retrieval::{Corpus, Document, Hit};
pub use session::{ChatSession, ReplySource, Turn};
pub use telemetry::{TracerProviderGuard, init_tracing};
