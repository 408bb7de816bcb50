//! The SEO opportunity pipeline: location resolution, competitor detection,
//! keyword set construction, volume and ranking aggregation, and the
//! revenue model, orchestrated by [`Analyzer`].

pub mod analyzer;
pub mod competitors;
pub mod domain;
pub mod error;
pub mod keyword_set;
pub mod location;
pub mod opportunity;
pub mod ranking;

#[cfg(test)]
pub(crate) mod test_support;

pub use analyzer::{AnalysisOutcome, Analyzer, AnalyzerSettings};
pub use competitors::{detect_competitors, resolve_competitors, user_competitors};
pub use domain::{business_name, domain_from_url};
pub use error::{CompetitorError, LocationError, PipelineError};
pub use keyword_set::{build_keywords, dedup_keywords, KeywordSet, KeywordSetInput};
pub use location::{
    LocationCache, LocationIndex, LocationMatch, LocationResolver, LocationSource, MatchDetail,
    MatchMethod, ProviderLocations,
};
pub use opportunity::compute;
pub use ranking::{aggregate, DomainRanking, RankingAggregate, RankingInput, RankingSettings};
