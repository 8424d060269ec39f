//! Test helper module for assistant-service integration tests.

#![allow(dead_code)]

use assistant_service::config::{
    AssistantConfig, GenerationConfig, MongoConfig, RetrievalConfig,
};
use assistant_service::models::chat::{Citation, CitationReference};
use assistant_service::services::audit::{AuditLog, MemoryAuditLog};
use assistant_service::services::metrics;
use assistant_service::services::pricing::Pricing;
use assistant_service::services::providers::mock::{MockGenerationProvider, MockRetrievalProvider};
use assistant_service::services::providers::{
    GenerationProvider, RetrievalProvider, RetrievedContext,
};
use assistant_service::startup::{AppState, build_router};
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Pricing constants the cost assertions are written against.
pub const INPUT_PRICE_PER_MTOK: f64 = 2.50;
pub const OUTPUT_PRICE_PER_MTOK: f64 = 10.0;
pub const RETRIEVAL_PRICE_PER_MTOK: f64 = 8.0;

pub fn test_config() -> AssistantConfig {
    AssistantConfig {
        common: CoreConfig {
            port: 0,
            log_level: "warn".to_string(),
        },
        mongodb: MongoConfig {
            uri: String::new(),
            database: "hr_assistant_test".to_string(),
        },
        retrieval: RetrievalConfig {
            api_key: "test-key".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
            assistant_name: "hr-documents".to_string(),
            timeout_secs: 5,
        },
        generation: GenerationConfig {
            api_key: "test-key".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
            model: "gpt-4o".to_string(),
            temperature: 0.7,
            timeout_secs: 5,
        },
        pricing: Pricing {
            generation_input_per_million: INPUT_PRICE_PER_MTOK,
            generation_output_per_million: OUTPUT_PRICE_PER_MTOK,
            retrieval_per_million: RETRIEVAL_PRICE_PER_MTOK,
        },
        otlp_endpoint: None,
    }
}

/// Three passages across two documents, pages {1, 3} and {2}.
pub fn fixture_context() -> RetrievedContext {
    RetrievedContext {
        context_text: "Vacation days accrue monthly.\n\nSick leave must be reported before \
09:00.\n\nLeave requests go through the portal."
            .to_string(),
        citations: vec![
            Citation {
                references: vec![CitationReference {
                    source_document: "Personeelshandboek".to_string(),
                    pages: vec![1],
                }],
            },
            Citation {
                references: vec![CitationReference {
                    source_document: "Personeelshandboek".to_string(),
                    pages: vec![3],
                }],
            },
            Citation {
                references: vec![CitationReference {
                    source_document: "CAO Grafimedia".to_string(),
                    pages: vec![2],
                }],
            },
        ],
        tokens_used: 1200,
        cost: 1200.0 / 1_000_000.0 * RETRIEVAL_PRICE_PER_MTOK,
    }
}

/// Test application wrapper running the real router against mock
/// collaborators on a random port.
pub struct TestApp {
    pub address: String,
    pub retrieval: Arc<MockRetrievalProvider>,
    pub generation: Arc<MockGenerationProvider>,
    pub audit: Arc<MemoryAuditLog>,
}

impl TestApp {
    pub async fn spawn(
        retrieval: MockRetrievalProvider,
        generation: MockGenerationProvider,
    ) -> Self {
        Self::spawn_with_audit(retrieval, generation, MemoryAuditLog::new()).await
    }

    pub async fn spawn_with_audit(
        retrieval: MockRetrievalProvider,
        generation: MockGenerationProvider,
        audit: MemoryAuditLog,
    ) -> Self {
        metrics::init_metrics();

        let retrieval = Arc::new(retrieval);
        let generation = Arc::new(generation);
        let audit = Arc::new(audit);

        let audit_dyn: Arc<dyn AuditLog> = audit.clone();
        let retrieval_dyn: Arc<dyn RetrievalProvider> = retrieval.clone();
        let generation_dyn: Arc<dyn GenerationProvider> = generation.clone();

        let state = AppState {
            config: test_config(),
            audit: audit_dyn,
            retrieval: retrieval_dyn,
            generation: generation_dyn,
        };

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let port = listener.local_addr().expect("test listener addr").port();
        let router = build_router(state);

        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        Self {
            address: format!("http://127.0.0.1:{}", port),
            retrieval,
            generation,
            audit,
        }
    }

    pub async fn post_chat(&self, body: serde_json::Value) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/api/chat", self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute chat request")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        reqwest::Client::new()
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute GET request")
    }
}
