//! The request orchestration pipeline.
//!
//! Sequences retrieval -> prompt composition -> generation -> cost
//! accounting for one question, measures latency, writes the audit record
//! and assembles the response payload. Exactly one of a success payload or
//! a classified fault leaves this module per request; generation is never
//! invoked when retrieval fails.

use crate::models::chat::{
    ChatRequest, ChatResponse, ChatTurn, CostBreakdown, GenerationCostBreakdown,
    RetrievalCostBreakdown, Role, TokenUsage,
};
use crate::models::record::RequestRecord;
use crate::services::providers::{GenerationError, OutboundMessage, RetrievalError};
use crate::services::{metrics, pricing, prompt};
use crate::startup::AppState;
use chrono::Utc;
use std::time::Instant;
use thiserror::Error;
use validator::Validate;

/// Session marker recorded when the client supplied no session id.
pub const FALLBACK_SESSION_ID: &str = "NO_SESSION_ID";

/// Fault of one pipeline run, tagged by origin for the classifier.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Answer one question. The returned payload is fully assembled, including
/// the audit log id when the write succeeded.
#[tracing::instrument(skip(state, request), fields(session_id, language))]
pub async fn answer(
    state: &AppState,
    request: &ChatRequest,
) -> Result<ChatResponse, PipelineError> {
    let started = Instant::now();
    let received_at = Utc::now();
    let request_id = uuid::Uuid::new_v4().to_string();

    let session_id = request
        .session_id
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| FALLBACK_SESSION_ID.to_string());
    let language = request.language.as_str();

    tracing::Span::current().record("session_id", session_id.as_str());
    tracing::Span::current().record("language", language);

    if let Err(e) = request.validate() {
        return Err(PipelineError::Validation(e.to_string()));
    }
    if request.message.trim().is_empty() {
        return Err(PipelineError::Validation("Message is required".to_string()));
    }

    // Credential checks run per request, before any remote call.
    state.retrieval.ensure_configured()?;
    state.generation.ensure_configured()?;

    let retrieval_started = Instant::now();
    let retrieved = state.retrieval.retrieve(&request.message).await?;
    metrics::record_provider_latency("retrieval", retrieval_started.elapsed().as_secs_f64());

    tracing::info!(
        request_id = %request_id,
        citations = retrieved.citations.len(),
        context_tokens = retrieved.tokens_used,
        "Context retrieved"
    );

    let system_prompt = prompt::compose_system_prompt(&retrieved.context_text, language);
    let messages = build_messages(&system_prompt, &request.conversation_history, &request.message);

    let generation_started = Instant::now();
    let generated = state.generation.generate(&messages).await?;
    metrics::record_provider_latency("generation", generation_started.elapsed().as_secs_f64());
    metrics::record_tokens(generated.input_tokens, generated.output_tokens);

    let generation_cost = pricing::generation_cost(
        generated.input_tokens,
        generated.output_tokens,
        &state.config.pricing,
    );
    // Full precision here; rounding happens only on reported values.
    let combined_cost = retrieved.cost + generation_cost.total_cost;

    let response_time_ms = started.elapsed().as_millis() as i64;
    let response_time_seconds = round_seconds(response_time_ms);

    tracing::info!(
        request_id = %request_id,
        input_tokens = generated.input_tokens,
        output_tokens = generated.output_tokens,
        total_cost = pricing::round_currency(combined_cost),
        response_time_ms,
        "Answer generated"
    );

    let record = RequestRecord {
        request_id: request_id.clone(),
        session_id: session_id.clone(),
        timestamp: received_at,
        question: request.message.clone(),
        answer: generated.answer.clone(),
        language: language.to_string(),
        response_time_ms,
        response_time_seconds,
        retrieval_tokens: retrieved.tokens_used,
        retrieval_cost: pricing::round_currency(retrieved.cost),
        generation_input_tokens: generated.input_tokens,
        generation_output_tokens: generated.output_tokens,
        generation_total_tokens: generated.total_tokens,
        generation_cost: pricing::round_currency(generation_cost.total_cost),
        total_cost: pricing::round_currency(combined_cost),
        citations_count: retrieved.citations.len() as i64,
        conversation_history_length: request.conversation_history.len() as i64,
        citations: retrieved.citations.clone(),
    };

    // Record first, then respond. A failed write must not fail the request,
    // but it must stay observable.
    let log_id = match state.audit.record_request(&record).await {
        Ok(id) => Some(id),
        Err(e) => {
            metrics::record_audit_failure();
            tracing::error!(
                request_id = %request_id,
                error = %e,
                "Failed to write audit record"
            );
            None
        }
    };

    Ok(ChatResponse {
        message: generated.answer,
        citations: retrieved.citations,
        log_id,
        usage: TokenUsage {
            prompt_tokens: generated.input_tokens,
            completion_tokens: generated.output_tokens,
            total_tokens: generated.total_tokens,
        },
        cost_breakdown: CostBreakdown {
            retrieval: RetrievalCostBreakdown {
                tokens: retrieved.tokens_used,
                cost: pricing::round_currency(retrieved.cost),
            },
            generation: GenerationCostBreakdown {
                input_tokens: generated.input_tokens,
                output_tokens: generated.output_tokens,
                total_tokens: generated.total_tokens,
                cost: pricing::round_currency(generation_cost.total_cost),
            },
            total_cost: pricing::round_currency(combined_cost),
            response_time_seconds,
        },
    })
}

/// `[system, ...history, current]`; history entries are stripped to their
/// role/content pairs.
fn build_messages(
    system_prompt: &str,
    history: &[ChatTurn],
    current: &str,
) -> Vec<OutboundMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(OutboundMessage {
        role: Role::System,
        content: system_prompt.to_string(),
    });
    for turn in history {
        messages.push(OutboundMessage {
            role: turn.role,
            content: turn.content.clone(),
        });
    }
    messages.push(OutboundMessage {
        role: Role::User,
        content: current.to_string(),
    });
    messages
}

fn round_seconds(response_time_ms: i64) -> f64 {
    (response_time_ms as f64 / 1000.0 * 100.0).round() / 100.0
}
