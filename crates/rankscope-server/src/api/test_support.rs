//! A provider fake and request helpers for route tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request},
    response::Response,
    Router,
};

use rankscope_core::RankedKeywordRecord;
use rankscope_dataforseo::{
    CompetitorDomainItem, DataForSeoError, LocationItem, MapsItem, SearchVolumeItem,
    SeoDataProvider, SerpResult, Task,
};
use rankscope_llm::{AiModels, DisabledCompletion};
use rankscope_pipeline::{
    Analyzer, AnalyzerSettings, LocationCache, LocationResolver, ProviderLocations,
};

use super::{build_app, AppState};
use crate::middleware::RateLimitState;

/// Serves a tiny location table and one maps listing for Austin searches.
/// Everything else fails.
struct StaticProvider;

fn unavailable() -> DataForSeoError {
    DataForSeoError::Status {
        status: 503,
        message: "Service Unavailable".to_string(),
    }
}

fn location(code: i64, name: &str, kind: &str) -> LocationItem {
    LocationItem {
        location_code: code,
        location_name: name.to_string(),
        location_type: kind.to_string(),
    }
}

#[async_trait]
impl SeoDataProvider for StaticProvider {
    async fn locations(&self) -> Result<Vec<LocationItem>, DataForSeoError> {
        Ok(vec![
            location(21_176, "Texas,United States", "State"),
            location(21_137, "California,United States", "State"),
            location(1_026_201, "Austin,Texas,United States", "City"),
            location(1_026_339, "Dallas,Texas,United States", "City"),
            location(1_014_044, "Fresno,California,United States", "City"),
        ])
    }

    async fn post_search_volume_task(
        &self,
        _keywords: &[String],
        _location_code: i64,
    ) -> Result<String, DataForSeoError> {
        Err(unavailable())
    }

    async fn get_search_volume_task(
        &self,
        _task_id: &str,
    ) -> Result<Task<SearchVolumeItem>, DataForSeoError> {
        Err(unavailable())
    }

    async fn post_serp_tasks(
        &self,
        _keywords: &[String],
        _location_code: i64,
    ) -> Result<Vec<String>, DataForSeoError> {
        Err(unavailable())
    }

    async fn get_serp_task(&self, _task_id: &str) -> Result<Task<SerpResult>, DataForSeoError> {
        Err(unavailable())
    }

    async fn ranked_keywords(
        &self,
        _domain: &str,
        _limit: u32,
    ) -> Result<Vec<RankedKeywordRecord>, DataForSeoError> {
        Err(unavailable())
    }

    async fn competitors_domain(
        &self,
        _domain: &str,
        _limit: u32,
    ) -> Result<Vec<CompetitorDomainItem>, DataForSeoError> {
        Ok(Vec::new())
    }

    async fn maps_search(
        &self,
        keyword: &str,
        _location_code: i64,
    ) -> Result<Vec<MapsItem>, DataForSeoError> {
        if !keyword.contains("Austin") {
            return Ok(Vec::new());
        }
        Ok(vec![MapsItem {
            title: "RoofCo Austin".to_string(),
            url: Some("https://roofco.com".to_string()),
            rating: None,
            address: Some("100 Congress Ave, Austin, TX".to_string()),
        }])
    }
}

pub(super) fn test_app_with_limit(max_requests: usize) -> Router {
    let provider: Arc<dyn SeoDataProvider> = Arc::new(StaticProvider);
    let cache = LocationCache::new(
        Arc::new(ProviderLocations::new(Arc::clone(&provider))),
        Duration::from_secs(60),
    );
    let state = AppState {
        analyzer: Arc::new(Analyzer::new(
            provider,
            Arc::new(DisabledCompletion),
            AiModels::default(),
            AnalyzerSettings::default(),
        )),
        resolver: Arc::new(LocationResolver::new(Arc::new(cache))),
    };
    build_app(
        state,
        RateLimitState::per_minute(max_requests),
        Duration::from_secs(30),
    )
}

pub(super) fn test_app() -> Router {
    test_app_with_limit(1_000)
}

pub(super) fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub(super) fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub(super) async fn body_json(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
