use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provider location code for the whole United States.
pub const US_LOCATION_CODE: i64 = 2840;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisScope {
    #[default]
    Local,
    National,
}

impl AnalysisScope {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisScope::Local => "local",
            AnalysisScope::National => "national",
        }
    }

    #[must_use]
    pub fn is_local(self) -> bool {
        self == AnalysisScope::Local
    }
}

impl std::fmt::Display for AnalysisScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AnalysisScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(AnalysisScope::Local),
            "national" => Ok(AnalysisScope::National),
            other => Err(format!("unknown analysis scope '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    State,
    City,
}

impl std::fmt::Display for LocationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationKind::State => write!(f, "state"),
            LocationKind::City => write!(f, "city"),
        }
    }
}

/// A canonical state or city known to the SEO data provider.
///
/// `name` is the display name used for matching (for cities, the text before
/// the first comma); `full_name` is the provider's canonical string, e.g.
/// `"Austin,Texas,United States"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationEntry {
    pub name: String,
    pub code: i64,
    pub full_name: String,
}

/// Search-volume data for a single keyword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordRecord {
    pub keyword: String,
    pub search_volume: u64,
    pub cpc: Option<f64>,
    pub competition: Option<f64>,
}

/// A keyword a competitor domain was observed to rank for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedKeywordRecord {
    pub keyword: String,
    pub search_volume: u64,
    pub cpc: Option<f64>,
    pub rank: u32,
    pub url: String,
    pub domain: String,
    pub keyword_difficulty: f64,
}

/// One row of the final keyword table. `search_volume` is always non-zero.
///
/// `competitor_ranks` is keyed by the competitor URL as the caller supplied it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedKeywordEntry {
    pub keyword: String,
    pub search_volume: u64,
    pub client_rank: Option<u32>,
    pub competitor_ranks: BTreeMap<String, Option<u32>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompetitorSource {
    #[serde(rename = "Google Maps")]
    GoogleMaps,
    #[serde(rename = "DataForSEO Labs")]
    DataForSeoLabs,
    #[serde(rename = "User Provided")]
    UserProvided,
}

impl std::fmt::Display for CompetitorSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompetitorSource::GoogleMaps => write!(f, "Google Maps"),
            CompetitorSource::DataForSeoLabs => write!(f, "DataForSEO Labs"),
            CompetitorSource::UserProvided => write!(f, "User Provided"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "kind",
    rename_all = "lowercase",
    rename_all_fields = "camelCase"
)]
pub enum CompetitorDetails {
    Local {
        rating: Option<f64>,
        reviews: Option<u64>,
        address: Option<String>,
    },
    National {
        organic_traffic: Option<f64>,
        organic_keywords: Option<u64>,
        domain_rank: Option<f64>,
    },
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competitor {
    pub name: String,
    pub url: String,
    pub source: CompetitorSource,
    pub details: CompetitorDetails,
}

/// Cumulative rank distribution: a rank counted in `top3` is also counted in
/// `top10`, `top50` and `top100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingBuckets {
    pub top3: usize,
    pub top10: usize,
    pub top50: usize,
    pub top100: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorRanking {
    pub name: String,
    pub url: String,
    pub source: CompetitorSource,
    pub buckets: RankingBuckets,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "scope",
    rename_all = "lowercase",
    rename_all_fields = "camelCase"
)]
pub enum AnalysisInsights {
    Local {
        local_pack_opportunities: usize,
        google_maps_ranking_factor: String,
        near_me_searches: usize,
        local_competitor_strength: String,
        recommended_actions: Vec<String>,
    },
    National {
        competitive_difficulty: String,
        content_gaps: usize,
        backlink_opportunities: usize,
        recommended_actions: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionRateSource {
    AiEstimate,
    RuleBased,
}

/// How much of the keyword set was actually ranking-verified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingCoverage {
    pub analyzed_keywords: usize,
    pub submitted_tasks: usize,
    pub completed_tasks: usize,
    pub failed_batches: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub total_search_volume: u64,
    pub potential_traffic: u64,
    pub conversion_rate: f64,
    pub conversion_rate_source: ConversionRateSource,
    pub potential_customers: u64,
    pub potential_revenue: f64,
    pub current_rankings: RankingBuckets,
    pub competitor_rankings: Vec<CompetitorRanking>,
    pub analysis_scope: AnalysisScope,
    pub analysis_insights: AnalysisInsights,
    pub keyword_data: Vec<CombinedKeywordEntry>,
    pub ranking_coverage: RankingCoverage,
    pub created_at: DateTime<Utc>,
}
