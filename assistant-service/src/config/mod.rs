use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

use crate::services::pricing::Pricing;

/// Default bounded timeout for both remote providers, in seconds.
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub retrieval: RetrievalConfig,
    pub generation: GenerationConfig,
    pub pricing: Pricing,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    /// Empty outside production means "no audit store"; the service then
    /// falls back to the in-memory audit sink.
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    pub api_key: String,
    pub base_url: String,
    /// Name of the assistant whose document index is queried.
    pub assistant_name: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl AssistantConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let timeout_secs: u64 = get_env(
            "PROVIDER_TIMEOUT_SECS",
            Some(&DEFAULT_PROVIDER_TIMEOUT_SECS.to_string()),
            is_prod,
        )?
        .parse()
        .unwrap_or(DEFAULT_PROVIDER_TIMEOUT_SECS);

        Ok(AssistantConfig {
            common,
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", Some(""), is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("hr_assistant"), is_prod)?,
            },
            retrieval: RetrievalConfig {
                api_key: get_env("RETRIEVAL_API_KEY", None, is_prod)?,
                base_url: get_env(
                    "RETRIEVAL_BASE_URL",
                    Some("https://prod-1-data.ke.pinecone.io"),
                    is_prod,
                )?,
                assistant_name: get_env("RETRIEVAL_ASSISTANT_NAME", Some("hr-documents"), is_prod)?,
                timeout_secs,
            },
            generation: GenerationConfig {
                api_key: get_env("GENERATION_API_KEY", None, is_prod)?,
                base_url: get_env(
                    "GENERATION_BASE_URL",
                    Some("https://api.openai.com/v1"),
                    is_prod,
                )?,
                model: get_env("GENERATION_MODEL", Some("gpt-4o"), is_prod)?,
                temperature: get_env("GENERATION_TEMPERATURE", Some("0.7"), is_prod)?
                    .parse()
                    .unwrap_or(0.7),
                timeout_secs,
            },
            pricing: Pricing {
                generation_input_per_million: get_env(
                    "PRICE_GENERATION_INPUT_PER_MTOK",
                    Some("2.50"),
                    is_prod,
                )?
                .parse()
                .unwrap_or(2.50),
                generation_output_per_million: get_env(
                    "PRICE_GENERATION_OUTPUT_PER_MTOK",
                    Some("10.00"),
                    is_prod,
                )?
                .parse()
                .unwrap_or(10.0),
                retrieval_per_million: get_env(
                    "PRICE_RETRIEVAL_PER_MTOK",
                    Some("8.00"),
                    is_prod,
                )?
                .parse()
                .unwrap_or(8.0),
            },
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok(),
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
