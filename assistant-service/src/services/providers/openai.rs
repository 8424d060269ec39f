//! OpenAI chat-completions provider.
//!
//! Implements answer generation against an OpenAI-style
//! `/chat/completions` endpoint. Token usage is read from the response;
//! content-filter refusals are surfaced as a dedicated fault variant.

use super::{GenerationError, GenerationOutput, GenerationProvider, OutboundMessage};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI provider configuration.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

/// OpenAI generation provider.
pub struct OpenAiGenerationProvider {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiGenerationProvider {
    pub fn new(config: OpenAiConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl GenerationProvider for OpenAiGenerationProvider {
    fn ensure_configured(&self) -> Result<(), GenerationError> {
        if self.config.api_key.is_empty() {
            return Err(GenerationError::NotConfigured(
                "OpenAI API key is not set".to_string(),
            ));
        }
        Ok(())
    }

    async fn generate(
        &self,
        messages: &[OutboundMessage],
    ) -> Result<GenerationOutput, GenerationError> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
        };

        tracing::debug!(
            model = %self.config.model,
            message_count = messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Network(format!("request timed out: {}", e))
                } else {
                    GenerationError::Network(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(GenerationError::RateLimited);
            }

            if is_content_filter_refusal(&body) {
                return Err(GenerationError::ContentFiltered);
            }

            return Err(GenerationError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            GenerationError::InvalidResponse(format!("failed to parse response: {}", e))
        })?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GenerationError::InvalidResponse("no choices returned".to_string()))?;

        if choice.finish_reason.as_deref() == Some("content_filter") {
            return Err(GenerationError::ContentFiltered);
        }

        let usage = completion.usage.unwrap_or_default();

        tracing::debug!(
            input_tokens = usage.prompt_tokens,
            output_tokens = usage.completion_tokens,
            "Chat completion received"
        );

        Ok(GenerationOutput {
            answer: choice.message.content.unwrap_or_default(),
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        })
    }
}

/// Detect a safety refusal from the provider's error payload.
///
/// Prefers the typed `code`/`type` fields; message text is consulted only
/// when neither carries a signal (some gateway deployments report the
/// refusal in prose).
fn is_content_filter_refusal(body: &str) -> bool {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<ErrorDetail>,
    }

    #[derive(Deserialize)]
    struct ErrorDetail {
        code: Option<String>,
        #[serde(rename = "type")]
        kind: Option<String>,
        message: Option<String>,
    }

    let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) else {
        return false;
    };
    let Some(detail) = parsed.error else {
        return false;
    };

    let tagged = |value: &Option<String>| {
        matches!(
            value.as_deref(),
            Some("content_filter") | Some("content_policy_violation")
        )
    };
    if tagged(&detail.code) || tagged(&detail.kind) {
        return true;
    }

    detail
        .message
        .map(|m| {
            let m = m.to_ascii_lowercase();
            m.contains("content management policy") || m.contains("content filter")
        })
        .unwrap_or(false)
}

// ============================================================================
// OpenAI API Request/Response Types
// ============================================================================

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [OutboundMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<CompletionUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize, Default)]
struct CompletionUsage {
    #[serde(default)]
    prompt_tokens: i64,
    #[serde(default)]
    completion_tokens: i64,
    #[serde(default)]
    total_tokens: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_content_filter_code() {
        let body = r#"{"error":{"message":"blocked","type":"invalid_request_error","code":"content_filter"}}"#;
        assert!(is_content_filter_refusal(body));
    }

    #[test]
    fn detects_content_policy_violation_type() {
        let body = r#"{"error":{"message":"blocked","type":"content_policy_violation"}}"#;
        assert!(is_content_filter_refusal(body));
    }

    #[test]
    fn falls_back_to_message_text() {
        let body = r#"{"error":{"message":"The response was filtered due to the prompt triggering content management policy."}}"#;
        assert!(is_content_filter_refusal(body));
    }

    #[test]
    fn plain_api_error_is_not_a_refusal() {
        let body = r#"{"error":{"message":"The model is overloaded","type":"server_error"}}"#;
        assert!(!is_content_filter_refusal(body));
        assert!(!is_content_filter_refusal("not json at all"));
    }

    #[test]
    fn unconfigured_provider_fails_before_any_call() {
        let provider = OpenAiGenerationProvider::new(OpenAiConfig {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            temperature: 0.7,
            timeout_secs: 5,
        });
        assert!(matches!(
            provider.ensure_configured(),
            Err(GenerationError::NotConfigured(_))
        ));
    }
}
