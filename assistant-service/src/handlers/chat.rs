//! The chat endpoint: one question in, one grounded answer or one
//! classified error out.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::time::Instant;

use crate::models::chat::ChatRequest;
use crate::models::record::ContentFilterEvent;
use crate::services::classifier::{self, ErrorCategory, FaultSource};
use crate::services::{metrics, pipeline};
use crate::startup::AppState;

#[tracing::instrument(skip(state, request))]
pub async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Response {
    let started = Instant::now();

    match pipeline::answer(&state, &request).await {
        Ok(response) => {
            metrics::record_chat_request("success", started.elapsed().as_secs_f64());
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(error) => {
            let outcome = classifier::classify(&error, &request.language);
            metrics::record_chat_request(outcome.category.as_str(), started.elapsed().as_secs_f64());
            if outcome.source != FaultSource::Unknown {
                metrics::record_provider_error(outcome.source.as_str(), outcome.kind);
            }

            if outcome.category == ErrorCategory::ContentFilter {
                // Distinct audit path: question + truncated history, no
                // answer. The standard request record is never written.
                let event = ContentFilterEvent::new(
                    request
                        .session_id
                        .clone()
                        .filter(|s| !s.is_empty())
                        .unwrap_or_else(|| pipeline::FALLBACK_SESSION_ID.to_string()),
                    request.message.clone(),
                    &request.conversation_history,
                    request.language.clone(),
                );
                if let Err(e) = state.audit.record_content_filter(&event).await {
                    metrics::record_audit_failure();
                    tracing::error!(error = %e, "Failed to write content-filter audit entry");
                }

                tracing::warn!(
                    detail = %outcome.detail,
                    "Generation refused by provider content filter"
                );

                return (
                    outcome.category.status_code(),
                    Json(json!({
                        "error": outcome.category.as_str(),
                        "message": outcome.user_message,
                        "userFriendly": true,
                    })),
                )
                    .into_response();
            }

            tracing::error!(
                category = outcome.category.as_str(),
                source = outcome.source.as_str(),
                detail = %outcome.detail,
                "Chat request failed"
            );

            (
                outcome.category.status_code(),
                Json(json!({
                    "error": outcome.category.as_str(),
                    "message": outcome.user_message,
                    "details": outcome.detail,
                    "type": outcome.kind,
                    "source": outcome.source.as_str(),
                })),
            )
                .into_response()
        }
    }
}
