//! DataForSEO API response types.
//!
//! Every v3 response is wrapped in the same envelope: a top-level
//! `status_code`/`status_message` pair and a `tasks` array, each task carrying
//! its own status and an optional `result` array. [`ApiResponse`] and [`Task`]
//! capture that pattern generically; the remaining types model the `result`
//! items of the endpoints this crate calls.

use serde::{Deserialize, Serialize};

/// Envelope status code for a successful call or a finished task.
pub const STATUS_OK: i64 = 20_000;

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    pub status_code: i64,
    #[serde(default)]
    pub status_message: String,
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    pub tasks: Vec<Task<T>>,
}

/// One task inside an envelope. `result` is `null` until the task finishes.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Task<T> {
    #[serde(default)]
    pub id: String,
    pub status_code: i64,
    #[serde(default)]
    pub status_message: String,
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    pub result: Vec<T>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// keywords_data/google_ads/locations
// ---------------------------------------------------------------------------

/// A location row, e.g. `{"location_name": "Austin,Texas,United States", "location_type": "City"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationItem {
    pub location_code: i64,
    pub location_name: String,
    #[serde(default)]
    pub location_type: String,
}

// ---------------------------------------------------------------------------
// keywords_data/google_ads/search_volume
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchVolumeItem {
    pub keyword: String,
    #[serde(default)]
    pub search_volume: Option<u64>,
    #[serde(default)]
    pub cpc: Option<f64>,
    /// Either a number or a label such as `"HIGH"` depending on the endpoint.
    #[serde(default)]
    pub competition: Option<serde_json::Value>,
    #[serde(default)]
    pub competition_index: Option<f64>,
}

// ---------------------------------------------------------------------------
// serp/google/organic
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerpResult {
    pub keyword: String,
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    pub items: Vec<SerpItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerpItem {
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub rank_absolute: Option<u32>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl SerpItem {
    #[must_use]
    pub fn is_organic(&self) -> bool {
        self.item_type == "organic"
    }
}

// ---------------------------------------------------------------------------
// dataforseo_labs/google/ranked_keywords
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RankedKeywordsResult {
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    pub items: Vec<RankedKeywordItem>,
}

#[derive(Debug, Deserialize)]
pub struct RankedKeywordItem {
    #[serde(default)]
    pub keyword_data: Option<KeywordData>,
    #[serde(default)]
    pub ranked_serp_element: Option<RankedSerpElement>,
}

#[derive(Debug, Deserialize)]
pub struct KeywordData {
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub keyword_info: Option<KeywordInfo>,
}

#[derive(Debug, Deserialize)]
pub struct KeywordInfo {
    #[serde(default)]
    pub search_volume: Option<u64>,
    #[serde(default)]
    pub cpc: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RankedSerpElement {
    #[serde(default)]
    pub keyword_difficulty: Option<f64>,
    #[serde(default)]
    pub serp_item: Option<RankedSerpItem>,
}

#[derive(Debug, Deserialize)]
pub struct RankedSerpItem {
    #[serde(default)]
    pub rank_absolute: Option<u32>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
}

// ---------------------------------------------------------------------------
// dataforseo_labs/google/competitors_domain
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CompetitorsDomainResult {
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    pub items: Vec<CompetitorDomainItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorDomainItem {
    pub domain: String,
    #[serde(default)]
    pub metrics: Option<DomainMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainMetrics {
    #[serde(default)]
    pub organic: Option<OrganicMetrics>,
    #[serde(default)]
    pub domain_rank: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganicMetrics {
    #[serde(default)]
    pub traffic: Option<f64>,
    #[serde(default)]
    pub keywords: Option<u64>,
}

// ---------------------------------------------------------------------------
// serp/google/maps/live/advanced
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct MapsResult {
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    pub items: Vec<MapsItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapsItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub rating: Option<MapsRating>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapsRating {
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub votes_count: Option<u64>,
}
