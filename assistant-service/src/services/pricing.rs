//! Token-to-cost accounting.
//!
//! Pure arithmetic over provider-reported token counts. Prices are
//! configuration (per million tokens), so a price change never requires a
//! code change.

use serde::Deserialize;

/// Per-million-token prices for both providers.
#[derive(Debug, Clone, Deserialize)]
pub struct Pricing {
    pub generation_input_per_million: f64,
    pub generation_output_per_million: f64,
    pub retrieval_per_million: f64,
}

/// Cost of `tokens` at a per-million-token price.
pub fn cost_for_tokens(tokens: i64, price_per_million: f64) -> f64 {
    tokens as f64 / 1_000_000.0 * price_per_million
}

/// Monetary values are reported with 6-decimal precision; internal
/// accumulation stays full precision.
pub fn round_currency(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

/// Cost split of one generation call.
#[derive(Debug, Clone, Copy)]
pub struct GenerationCost {
    pub input_cost: f64,
    pub output_cost: f64,
    pub total_cost: f64,
}

pub fn generation_cost(input_tokens: i64, output_tokens: i64, pricing: &Pricing) -> GenerationCost {
    let input_cost = cost_for_tokens(input_tokens, pricing.generation_input_per_million);
    let output_cost = cost_for_tokens(output_tokens, pricing.generation_output_per_million);
    GenerationCost {
        input_cost,
        output_cost,
        total_cost: input_cost + output_cost,
    }
}
