//! Wire types for the chat endpoint and the conversation history.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn of the conversation, oldest first. The UI attaches extra
/// fields to assistant turns (citations, usage, log ids); deserialization
/// drops them so only role/content pairs ever reach the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

/// Inbound body for `POST /api/chat`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
    #[serde(default)]
    pub conversation_history: Vec<ChatTurn>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

fn default_language() -> String {
    "nl".to_string()
}

/// One retrieved passage's provenance. Several citations may point at the
/// same document; the pipeline preserves every (document, page) pair the
/// backend returned and leaves dedup/merging to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub references: Vec<CitationReference>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationReference {
    pub source_document: String,
    pub pages: Vec<u32>,
}

/// Success payload for `POST /api/chat`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub message: String,
    pub citations: Vec<Citation>,
    /// Opaque audit log id, used by the UI to correlate feedback.
    /// `null` when the audit write failed (the answer is still returned).
    pub log_id: Option<String>,
    pub usage: TokenUsage,
    pub cost_breakdown: CostBreakdown,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenUsage {
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub total_tokens: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CostBreakdown {
    pub retrieval: RetrievalCostBreakdown,
    pub generation: GenerationCostBreakdown,
    pub total_cost: f64,
    pub response_time_seconds: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RetrievalCostBreakdown {
    pub tokens: i64,
    pub cost: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationCostBreakdown {
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub total_tokens: i64,
    pub cost: f64,
}
