use thiserror::Error;

use rankscope_core::ValidationError;
use rankscope_dataforseo::DataForSeoError;

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("state \"{query}\" not found")]
    StateNotFound {
        query: String,
        suggestions: Vec<String>,
    },

    #[error("provider returned no US states")]
    EmptyLocationTable,

    #[error("failed to load location data: {0}")]
    Provider(#[from] DataForSeoError),
}

#[derive(Debug, Error)]
pub enum CompetitorError {
    #[error("no competitors found for {0}")]
    NoneFound(String),

    #[error("competitor lookup failed: {0}")]
    Provider(#[from] DataForSeoError),
}

/// Stage failures that leave nothing to report.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Competitors(#[from] CompetitorError),

    #[error("failed to fetch search volume: {0}")]
    VolumeFetch(#[source] DataForSeoError),
}

impl PipelineError {
    /// Short label for the failing stage.
    #[must_use]
    pub fn summary(&self) -> &'static str {
        match self {
            PipelineError::Validation(_) => "Invalid analysis request",
            PipelineError::Competitors(_) => "Failed to detect competitors",
            PipelineError::VolumeFetch(_) => "Failed to fetch keyword data",
        }
    }
}
