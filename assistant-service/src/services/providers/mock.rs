//! Mock provider implementations for testing.
//!
//! The mocks count their calls so tests can assert that validation and
//! configuration faults short-circuit before any remote call.

use super::{
    GenerationError, GenerationOutput, GenerationProvider, OutboundMessage, RetrievalError,
    RetrievalProvider, RetrievedContext,
};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Mock retrieval provider.
pub struct MockRetrievalProvider {
    context: RetrievedContext,
    fail_message: Option<String>,
    configured: bool,
    calls: AtomicUsize,
}

impl MockRetrievalProvider {
    /// Succeeds with the given context on every call.
    pub fn returning(context: RetrievedContext) -> Self {
        Self {
            context,
            fail_message: None,
            configured: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// Fails every call with a backend API error.
    pub fn failing(message: &str) -> Self {
        Self {
            context: RetrievedContext::default(),
            fail_message: Some(message.to_string()),
            configured: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// Simulates missing credentials.
    pub fn unconfigured() -> Self {
        Self {
            context: RetrievedContext::default(),
            fail_message: None,
            configured: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of retrieval calls issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RetrievalProvider for MockRetrievalProvider {
    fn ensure_configured(&self) -> Result<(), RetrievalError> {
        if self.configured {
            Ok(())
        } else {
            Err(RetrievalError::NotConfigured(
                "mock retrieval provider has no credentials".to_string(),
            ))
        }
    }

    async fn retrieve(&self, _query: &str) -> Result<RetrievedContext, RetrievalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_message {
            Some(message) => Err(RetrievalError::Api {
                status: 500,
                message: message.clone(),
            }),
            None => Ok(self.context.clone()),
        }
    }
}

enum MockGenerationFailure {
    Api(String),
    ContentFiltered,
}

/// Mock generation provider. Captures the last transmitted message list so
/// tests can assert history stripping and message ordering.
pub struct MockGenerationProvider {
    output: GenerationOutput,
    failure: Option<MockGenerationFailure>,
    configured: bool,
    calls: AtomicUsize,
    captured: Mutex<Vec<OutboundMessage>>,
}

impl MockGenerationProvider {
    /// Succeeds with the given answer and provider-reported token counts.
    pub fn returning(answer: &str, input_tokens: i64, output_tokens: i64) -> Self {
        Self {
            output: GenerationOutput {
                answer: answer.to_string(),
                input_tokens,
                output_tokens,
                total_tokens: input_tokens + output_tokens,
            },
            failure: None,
            configured: true,
            calls: AtomicUsize::new(0),
            captured: Mutex::new(Vec::new()),
        }
    }

    /// Fails every call with a backend API error.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(MockGenerationFailure::Api(message.to_string())),
            ..Self::returning("", 0, 0)
        }
    }

    /// Fails every call with a content-filter refusal.
    pub fn content_filtered() -> Self {
        Self {
            failure: Some(MockGenerationFailure::ContentFiltered),
            ..Self::returning("", 0, 0)
        }
    }

    /// Simulates missing credentials.
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::returning("", 0, 0)
        }
    }

    /// Number of generation calls issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The message list of the most recent call.
    pub fn last_messages(&self) -> Vec<OutboundMessage> {
        self.captured.lock().expect("captured messages lock").clone()
    }
}

#[async_trait]
impl GenerationProvider for MockGenerationProvider {
    fn ensure_configured(&self) -> Result<(), GenerationError> {
        if self.configured {
            Ok(())
        } else {
            Err(GenerationError::NotConfigured(
                "mock generation provider has no credentials".to_string(),
            ))
        }
    }

    async fn generate(
        &self,
        messages: &[OutboundMessage],
    ) -> Result<GenerationOutput, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.captured.lock().expect("captured messages lock") = messages.to_vec();

        match &self.failure {
            Some(MockGenerationFailure::Api(message)) => Err(GenerationError::Api {
                status: 500,
                message: message.clone(),
            }),
            Some(MockGenerationFailure::ContentFiltered) => Err(GenerationError::ContentFiltered),
            None => Ok(self.output.clone()),
        }
    }
}
