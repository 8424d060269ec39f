//! Fault classification and user-facing messaging.
//!
//! A state-free mapping from the pipeline's tagged fault variants to a
//! stable category, a fixed user message and an HTTP status. The raw
//! technical detail is preserved separately for operator diagnostics and
//! is never used as the user-facing string.

use super::pipeline::PipelineError;
use super::providers::{GenerationError, RetrievalError};
use axum::http::StatusCode;

/// Stable error taxonomy of the chat endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Configuration,
    ContentFilter,
    RetrievalProviderError,
    GenerationProviderError,
    Unknown,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Validation => "validation",
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::ContentFilter => "content_filter",
            ErrorCategory::RetrievalProviderError => "retrieval_provider_error",
            ErrorCategory::GenerationProviderError => "generation_provider_error",
            ErrorCategory::Unknown => "unknown",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCategory::Validation | ErrorCategory::ContentFilter => StatusCode::BAD_REQUEST,
            ErrorCategory::Configuration
            | ErrorCategory::RetrievalProviderError
            | ErrorCategory::GenerationProviderError
            | ErrorCategory::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Which collaborator raised the fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultSource {
    Retrieval,
    Generation,
    Unknown,
}

impl FaultSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultSource::Retrieval => "retrieval",
            FaultSource::Generation => "generation",
            FaultSource::Unknown => "unknown",
        }
    }
}

/// The classified outcome of one failed request.
#[derive(Debug)]
pub struct ErrorOutcome {
    pub category: ErrorCategory,
    pub user_message: String,
    pub source: FaultSource,
    /// Operator-facing technical detail; never shown as the user message.
    pub detail: String,
    /// Short variant tag for the response `type` field.
    pub kind: &'static str,
}

/// Classify a pipeline fault. Content-filter refusals take priority over
/// every other category; configuration faults are recognised from either
/// provider.
pub fn classify(error: &PipelineError, language: &str) -> ErrorOutcome {
    let (category, source, kind) = match error {
        PipelineError::Validation(_) => {
            (ErrorCategory::Validation, FaultSource::Unknown, "Validation")
        }
        PipelineError::Retrieval(fault) => match fault {
            RetrievalError::NotConfigured(_) => (
                ErrorCategory::Configuration,
                FaultSource::Retrieval,
                "NotConfigured",
            ),
            RetrievalError::Api { .. } => (
                ErrorCategory::RetrievalProviderError,
                FaultSource::Retrieval,
                "ApiError",
            ),
            RetrievalError::RateLimited => (
                ErrorCategory::RetrievalProviderError,
                FaultSource::Retrieval,
                "RateLimited",
            ),
            RetrievalError::Network(_) => (
                ErrorCategory::RetrievalProviderError,
                FaultSource::Retrieval,
                "NetworkError",
            ),
            RetrievalError::InvalidResponse(_) => (
                ErrorCategory::RetrievalProviderError,
                FaultSource::Retrieval,
                "InvalidResponse",
            ),
        },
        PipelineError::Generation(fault) => match fault {
            GenerationError::ContentFiltered => (
                ErrorCategory::ContentFilter,
                FaultSource::Generation,
                "ContentFiltered",
            ),
            GenerationError::NotConfigured(_) => (
                ErrorCategory::Configuration,
                FaultSource::Generation,
                "NotConfigured",
            ),
            GenerationError::Api { .. } => (
                ErrorCategory::GenerationProviderError,
                FaultSource::Generation,
                "ApiError",
            ),
            GenerationError::RateLimited => (
                ErrorCategory::GenerationProviderError,
                FaultSource::Generation,
                "RateLimited",
            ),
            GenerationError::Network(_) => (
                ErrorCategory::GenerationProviderError,
                FaultSource::Generation,
                "NetworkError",
            ),
            GenerationError::InvalidResponse(_) => (
                ErrorCategory::GenerationProviderError,
                FaultSource::Generation,
                "InvalidResponse",
            ),
        },
        PipelineError::Internal(_) => (ErrorCategory::Unknown, FaultSource::Unknown, "Internal"),
    };

    ErrorOutcome {
        category,
        user_message: user_message(category, language).to_string(),
        source,
        detail: error.to_string(),
        kind,
    }
}

/// One fixed user message per category. Dutch is the deployment default;
/// any explicit non-Dutch selection gets the English message and the model
/// itself handles all further languages on the success path.
pub fn user_message(category: ErrorCategory, language: &str) -> &'static str {
    let dutch = language != "en";
    match category {
        ErrorCategory::Validation => {
            if dutch {
                "Je bericht mag niet leeg zijn. Stel een vraag over HR-beleid, arbeidsvoorwaarden of procedures."
            } else {
                "Your message cannot be empty. Ask a question about HR policy, employment conditions or procedures."
            }
        }
        ErrorCategory::Configuration => {
            if dutch {
                "De assistent is op dit moment niet goed geconfigureerd. Probeer het later opnieuw of meld dit bij de HR-afdeling."
            } else {
                "The assistant is not configured correctly at the moment. Please try again later or report this to the HR department."
            }
        }
        ErrorCategory::ContentFilter => {
            if dutch {
                "Je vraag bevat termen die automatisch worden geblokkeerd om misbruik te voorkomen. Als je vraag echt HR-gerelateerd is, neem dan contact op met je leidinggevende of de HR-afdeling voor een persoonlijk gesprek."
            } else {
                "Your question contains terms that are blocked automatically to prevent misuse. If your question is genuinely HR-related, please contact your supervisor or the HR department for a personal conversation."
            }
        }
        ErrorCategory::RetrievalProviderError => {
            if dutch {
                "Het documentenarchief is tijdelijk niet bereikbaar. Probeer het over een paar minuten opnieuw."
            } else {
                "The document archive is temporarily unavailable. Please try again in a few minutes."
            }
        }
        ErrorCategory::GenerationProviderError => {
            if dutch {
                "Het genereren van een antwoord is niet gelukt. Probeer het over een paar minuten opnieuw."
            } else {
                "Generating an answer failed. Please try again in a few minutes."
            }
        }
        ErrorCategory::Unknown => {
            if dutch {
                "Er is een onverwachte fout opgetreden. Probeer het later opnieuw."
            } else {
                "An unexpected error occurred. Please try again later."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_filter_outranks_other_generation_faults() {
        let outcome = classify(
            &PipelineError::Generation(GenerationError::ContentFiltered),
            "nl",
        );
        assert_eq!(outcome.category, ErrorCategory::ContentFilter);
        assert_eq!(outcome.source, FaultSource::Generation);
        assert_eq!(outcome.category.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_credentials_classify_as_configuration_from_either_origin() {
        let retrieval = classify(
            &PipelineError::Retrieval(RetrievalError::NotConfigured("no key".into())),
            "nl",
        );
        assert_eq!(retrieval.category, ErrorCategory::Configuration);
        assert_eq!(retrieval.source, FaultSource::Retrieval);

        let generation = classify(
            &PipelineError::Generation(GenerationError::NotConfigured("no key".into())),
            "nl",
        );
        assert_eq!(generation.category, ErrorCategory::Configuration);
        assert_eq!(generation.source, FaultSource::Generation);
    }

    #[test]
    fn provider_faults_map_to_their_origin_category() {
        let retrieval = classify(
            &PipelineError::Retrieval(RetrievalError::Api {
                status: 503,
                message: "down".into(),
            }),
            "nl",
        );
        assert_eq!(retrieval.category, ErrorCategory::RetrievalProviderError);
        assert_eq!(
            retrieval.category.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let generation = classify(
            &PipelineError::Generation(GenerationError::RateLimited),
            "nl",
        );
        assert_eq!(generation.category, ErrorCategory::GenerationProviderError);
        assert_eq!(generation.kind, "RateLimited");
    }

    #[test]
    fn validation_is_a_bad_request_with_no_source() {
        let outcome = classify(&PipelineError::Validation("Message is required".into()), "nl");
        assert_eq!(outcome.category, ErrorCategory::Validation);
        assert_eq!(outcome.source, FaultSource::Unknown);
        assert_eq!(outcome.category.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unknown_faults_keep_their_detail_for_operators() {
        let outcome = classify(
            &PipelineError::Internal(anyhow::anyhow!("poisoned lock")),
            "en",
        );
        assert_eq!(outcome.category, ErrorCategory::Unknown);
        assert!(outcome.detail.contains("poisoned lock"));
        assert!(!outcome.user_message.contains("poisoned lock"));
    }

    #[test]
    fn user_messages_follow_the_language_hint() {
        assert!(user_message(ErrorCategory::ContentFilter, "nl").starts_with("Je vraag"));
        assert!(user_message(ErrorCategory::ContentFilter, "en").starts_with("Your question"));
        // Unlisted languages fall back to the deployment default.
        assert!(user_message(ErrorCategory::Unknown, "pl").starts_with("Er is"));
    }
}
