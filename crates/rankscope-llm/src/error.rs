use thiserror::Error;

/// Errors from the chat-completion transport.
#[derive(Debug, Error)]
pub enum LlmError {
    /// No API key is configured; every call site should use its fallback.
    #[error("AI text service is not configured")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI text service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The completion came back without any message content.
    #[error("AI text service returned no content")]
    EmptyResponse,
}

/// Why the relevance filter could not produce a keyword subset.
#[derive(Debug, Error)]
pub enum RelevanceFilterError {
    #[error("relevance filter call failed: {0}")]
    Completion(#[from] LlmError),

    #[error("relevance filter returned malformed content: {0}")]
    Malformed(String),

    /// The model kept none of a non-empty input list.
    #[error("relevance filter discarded every keyword")]
    EmptySelection,
}

/// Why the AI conversion-rate estimate could not be used.
#[derive(Debug, Error)]
pub enum ConversionRateEstimateError {
    #[error("conversion rate call failed: {0}")]
    Completion(#[from] LlmError),

    #[error("conversion rate answer is not a number: '{0}'")]
    Unparseable(String),

    #[error("conversion rate answer must be positive, got {0}")]
    NonPositive(f64),
}
