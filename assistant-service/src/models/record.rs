//! Audit artifacts handed to the logging collaborator.

use super::chat::{ChatTurn, Citation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The full audit record for one successfully answered request.
///
/// Created once per request and never mutated after it is handed to the
/// audit log. Monetary fields carry the 6-decimal reported values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestRecord {
    /// Request ID for log correlation.
    pub request_id: String,

    /// Session ID as supplied by the client, or the fallback marker.
    pub session_id: String,

    /// When the request was received.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    pub question: String,
    pub answer: String,
    pub language: String,

    pub response_time_ms: i64,
    pub response_time_seconds: f64,

    pub retrieval_tokens: i64,
    pub retrieval_cost: f64,
    pub generation_input_tokens: i64,
    pub generation_output_tokens: i64,
    pub generation_total_tokens: i64,
    pub generation_cost: f64,
    pub total_cost: f64,

    /// Number of citations as returned by retrieval, before any
    /// presentation-side dedup.
    pub citations_count: i64,
    pub conversation_history_length: i64,
    pub citations: Vec<Citation>,
}

/// Audit entry for a generation refused by the provider's content filter.
///
/// Stores the question and a truncated history tail, never an answer; it
/// replaces the standard request record for these requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentFilterEvent {
    pub session_id: String,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    pub question: String,
    pub history_tail: Vec<ChatTurn>,
    pub language: String,
}

impl ContentFilterEvent {
    /// How many trailing history turns are kept in the event.
    pub const HISTORY_TAIL_TURNS: usize = 6;

    pub fn new(
        session_id: String,
        question: String,
        history: &[ChatTurn],
        language: String,
    ) -> Self {
        let tail_start = history.len().saturating_sub(Self::HISTORY_TAIL_TURNS);
        Self {
            session_id,
            timestamp: Utc::now(),
            question,
            history_tail: history[tail_start..].to_vec(),
            language,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::Role;

    fn turn(content: &str) -> ChatTurn {
        ChatTurn {
            role: Role::User,
            content: content.to_string(),
        }
    }

    #[test]
    fn content_filter_event_keeps_short_history_whole() {
        let history = vec![turn("a"), turn("b")];
        let event = ContentFilterEvent::new(
            "s".into(),
            "q".into(),
            &history,
            "nl".into(),
        );
        assert_eq!(event.history_tail.len(), 2);
    }

    #[test]
    fn content_filter_event_truncates_to_tail() {
        let history: Vec<ChatTurn> = (0..10).map(|i| turn(&i.to_string())).collect();
        let event = ContentFilterEvent::new(
            "s".into(),
            "q".into(),
            &history,
            "nl".into(),
        );
        assert_eq!(
            event.history_tail.len(),
            ContentFilterEvent::HISTORY_TAIL_TURNS
        );
        assert_eq!(event.history_tail[0].content, "4");
        assert_eq!(event.history_tail.last().unwrap().content, "9");
    }
}
