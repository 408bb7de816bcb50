//! Shared domain types and configuration for rankscope.

mod app_config;
mod config;
pub mod request;
pub mod types;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use request::{AnalysisRequest, ValidationError};
pub use types::{
    AnalysisInsights, AnalysisScope, CombinedKeywordEntry, Competitor, CompetitorDetails,
    CompetitorRanking, CompetitorSource, ConversionRateSource, KeywordRecord, LocationEntry,
    LocationKind, RankedKeywordRecord, RankingBuckets, RankingCoverage, Report,
    US_LOCATION_CODE,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
