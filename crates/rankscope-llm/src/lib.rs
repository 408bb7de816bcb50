//! AI text service client and the three call sites that use it: keyword
//! generation, keyword relevance filtering and conversion-rate estimation.
//! Each call site has a deterministic fallback for when the service fails.

pub mod client;
pub mod conversion;
pub mod error;
pub mod keywords;
pub mod relevance;

pub use client::{CompletionRequest, DisabledCompletion, OpenAiClient, TextCompletion};
pub use conversion::{
    estimate_conversion_rate, parse_conversion_rate, resolve_conversion_rate,
    rule_based_conversion_rate, ConversionEstimate,
};
pub use error::{ConversionRateEstimateError, LlmError, RelevanceFilterError};
pub use keywords::{
    fallback_keywords, generate_keywords, parse_keyword_list, GeneratedKeywords, KeywordSource,
};
pub use relevance::{
    filter_relevant_keywords, parse_relevance_response, passthrough_filter, RelevanceContext,
};

/// Model names for each call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiModels {
    pub keywords: String,
    pub relevance: String,
    pub conversion: String,
}

impl Default for AiModels {
    fn default() -> Self {
        Self {
            keywords: "gpt-4o".to_string(),
            relevance: "gpt-4o".to_string(),
            conversion: "gpt-4o-mini".to_string(),
        }
    }
}
