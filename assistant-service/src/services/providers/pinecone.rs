//! Pinecone assistant retrieval provider.
//!
//! Issues a single context query against the assistant's knowledge index
//! and maps the returned snippets to the pipeline's context/citation
//! shape. Retrieval cost is derived from the reported token usage.

use super::{RetrievalError, RetrievalProvider, RetrievedContext};
use crate::models::chat::{Citation, CitationReference};
use crate::services::pricing;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pinecone provider configuration.
#[derive(Debug, Clone)]
pub struct PineconeConfig {
    pub api_key: String,
    pub base_url: String,
    pub assistant_name: String,
    pub price_per_million_tokens: f64,
    pub timeout_secs: u64,
}

/// Pinecone retrieval provider.
pub struct PineconeRetrievalProvider {
    config: PineconeConfig,
    client: Client,
}

impl PineconeRetrievalProvider {
    pub fn new(config: PineconeConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn context_url(&self) -> String {
        format!(
            "{}/assistant/chat/{}/context",
            self.config.base_url.trim_end_matches('/'),
            self.config.assistant_name
        )
    }
}

#[async_trait]
impl RetrievalProvider for PineconeRetrievalProvider {
    fn ensure_configured(&self) -> Result<(), RetrievalError> {
        if self.config.api_key.is_empty() {
            return Err(RetrievalError::NotConfigured(
                "Pinecone API key is not set".to_string(),
            ));
        }
        if self.config.assistant_name.is_empty() {
            return Err(RetrievalError::NotConfigured(
                "Pinecone assistant name is not set".to_string(),
            ));
        }
        Ok(())
    }

    async fn retrieve(&self, query: &str) -> Result<RetrievedContext, RetrievalError> {
        let request = ContextRequest { query };

        tracing::debug!(
            assistant = %self.config.assistant_name,
            query_len = query.len(),
            "Sending context query"
        );

        let response = self
            .client
            .post(self.context_url())
            .header("Api-Key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RetrievalError::Network(format!("request timed out: {}", e))
                } else {
                    RetrievalError::Network(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(RetrievalError::RateLimited);
            }

            return Err(RetrievalError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let context: ContextResponse = response.json().await.map_err(|e| {
            RetrievalError::InvalidResponse(format!("failed to parse response: {}", e))
        })?;

        // Concatenate verbatim in backend order; an empty snippet list is a
        // valid answer-from-nothing outcome, not an error.
        let mut passages = Vec::with_capacity(context.snippets.len());
        let mut citations = Vec::with_capacity(context.snippets.len());
        for snippet in context.snippets {
            passages.push(snippet.content);
            if let Some(reference) = snippet.reference {
                let source_document = reference
                    .file
                    .map(|f| f.name)
                    .unwrap_or_default();
                citations.push(Citation {
                    references: vec![CitationReference {
                        source_document,
                        pages: reference.pages,
                    }],
                });
            }
        }

        let tokens_used = context.usage.map(|u| u.total_tokens).unwrap_or(0);
        let cost = pricing::cost_for_tokens(tokens_used, self.config.price_per_million_tokens);

        tracing::debug!(
            snippet_count = passages.len(),
            tokens = tokens_used,
            "Context retrieved"
        );

        Ok(RetrievedContext {
            context_text: passages.join("\n\n"),
            citations,
            tokens_used,
            cost,
        })
    }
}

// ============================================================================
// Pinecone API Request/Response Types
// ============================================================================

#[derive(Serialize)]
struct ContextRequest<'a> {
    query: &'a str,
}

#[derive(Deserialize)]
struct ContextResponse {
    #[serde(default)]
    snippets: Vec<Snippet>,
    #[serde(default)]
    usage: Option<ContextUsage>,
}

#[derive(Deserialize)]
struct Snippet {
    content: String,
    #[serde(default)]
    reference: Option<SnippetReference>,
}

#[derive(Deserialize)]
struct SnippetReference {
    #[serde(default)]
    file: Option<ReferencedFile>,
    #[serde(default)]
    pages: Vec<u32>,
}

#[derive(Deserialize)]
struct ReferencedFile {
    name: String,
}

#[derive(Deserialize)]
struct ContextUsage {
    #[serde(default)]
    total_tokens: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(api_key: &str, assistant_name: &str) -> PineconeRetrievalProvider {
        PineconeRetrievalProvider::new(PineconeConfig {
            api_key: api_key.to_string(),
            base_url: "https://prod-1-data.ke.pinecone.io".to_string(),
            assistant_name: assistant_name.to_string(),
            price_per_million_tokens: 8.0,
            timeout_secs: 5,
        })
    }

    #[test]
    fn missing_api_key_is_not_configured() {
        assert!(matches!(
            provider("", "hr-documents").ensure_configured(),
            Err(RetrievalError::NotConfigured(_))
        ));
    }

    #[test]
    fn missing_assistant_name_is_not_configured() {
        assert!(matches!(
            provider("key", "").ensure_configured(),
            Err(RetrievalError::NotConfigured(_))
        ));
    }

    #[test]
    fn context_url_includes_assistant_name() {
        let provider = provider("key", "hr-documents");
        assert_eq!(
            provider.context_url(),
            "https://prod-1-data.ke.pinecone.io/assistant/chat/hr-documents/context"
        );
    }
}
