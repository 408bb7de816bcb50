use thiserror::Error;

/// Errors returned by the DataForSEO client.
#[derive(Debug, Error)]
pub enum DataForSeoError {
    /// Login or password was empty at construction time.
    #[error("DataForSEO credentials are not configured")]
    MissingCredentials,

    /// The configured base URL could not be parsed.
    #[error("invalid DataForSEO base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-2xx HTTP status.
    #[error("DataForSEO API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// The JSON envelope (or a task inside it) carried a non-success status code.
    #[error("DataForSEO returned status {code}: {message}")]
    Api { code: i64, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A task_post call returned no usable task id.
    #[error("no task was created by {endpoint}")]
    NoTaskCreated { endpoint: String },

    /// A task_get call returned an envelope with no task in it.
    #[error("no task in response for {context}")]
    EmptyResponse { context: String },
}
