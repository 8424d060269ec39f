//! Remote provider abstractions for the answer pipeline.
//!
//! Both remote collaborators sit behind traits so the orchestrator can be
//! exercised against mocks, and every fault carries a typed variant the
//! error classifier matches on instead of inspecting message strings.

pub mod mock;
pub mod openai;
pub mod pinecone;

use crate::models::chat::{Citation, Role};
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Fault raised by the retrieval backend.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Retrieval provider not configured: {0}")]
    NotConfigured(String),

    #[error("Retrieval API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited by retrieval provider")]
    RateLimited,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid retrieval response: {0}")]
    InvalidResponse(String),
}

/// Fault raised by the generation backend.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Generation provider not configured: {0}")]
    NotConfigured(String),

    #[error("Generation API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited by generation provider")]
    RateLimited,

    #[error("Refused by the provider's content filter")]
    ContentFiltered,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid generation response: {0}")]
    InvalidResponse(String),
}

/// Ranked context returned by one retrieval call.
///
/// `context_text` is the verbatim concatenation of passage text in the
/// order the backend returned it; ranking stays the backend's concern.
/// Zero passages is a valid outcome: empty text, empty citations.
#[derive(Debug, Clone, Default)]
pub struct RetrievedContext {
    pub context_text: String,
    pub citations: Vec<Citation>,
    pub tokens_used: i64,
    pub cost: f64,
}

/// A role/content pair as transmitted to the generation backend.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundMessage {
    pub role: Role,
    pub content: String,
}

/// Raw output of one generation call. Token counts are the provider's
/// reported usage, never recomputed locally.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub answer: String,
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub total_tokens: i64,
}

/// The context-retrieval collaborator.
#[async_trait]
pub trait RetrievalProvider: Send + Sync {
    /// Cheap credential check, run per request before any remote call.
    fn ensure_configured(&self) -> Result<(), RetrievalError>;

    /// Issue a single retrieval query. No retries at this layer; a fault
    /// terminates the request.
    async fn retrieve(&self, query: &str) -> Result<RetrievedContext, RetrievalError>;
}

/// The chat-completion collaborator.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Cheap credential check, run per request before any remote call.
    fn ensure_configured(&self) -> Result<(), GenerationError>;

    /// Issue a single chat-completion call. `messages` is
    /// `[system, ...history, current question]`. No retries at this layer.
    async fn generate(
        &self,
        messages: &[OutboundMessage],
    ) -> Result<GenerationOutput, GenerationError>;
}
