//! The seam between the analysis pipeline and the SEO data provider.

use async_trait::async_trait;

use rankscope_core::RankedKeywordRecord;

use crate::client::DataForSeoClient;
use crate::error::DataForSeoError;
use crate::types::{CompetitorDomainItem, LocationItem, MapsItem, SearchVolumeItem, SerpResult, Task};

/// Everything the pipeline needs from an SEO data provider.
///
/// [`DataForSeoClient`] is the production implementation; tests provide
/// in-memory fakes.
#[async_trait]
pub trait SeoDataProvider: Send + Sync {
    /// All US states and cities the provider can target.
    async fn locations(&self) -> Result<Vec<LocationItem>, DataForSeoError>;

    async fn post_search_volume_task(
        &self,
        keywords: &[String],
        location_code: i64,
    ) -> Result<String, DataForSeoError>;

    async fn get_search_volume_task(
        &self,
        task_id: &str,
    ) -> Result<Task<SearchVolumeItem>, DataForSeoError>;

    async fn post_serp_tasks(
        &self,
        keywords: &[String],
        location_code: i64,
    ) -> Result<Vec<String>, DataForSeoError>;

    async fn get_serp_task(&self, task_id: &str) -> Result<Task<SerpResult>, DataForSeoError>;

    async fn ranked_keywords(
        &self,
        domain: &str,
        limit: u32,
    ) -> Result<Vec<RankedKeywordRecord>, DataForSeoError>;

    async fn competitors_domain(
        &self,
        domain: &str,
        limit: u32,
    ) -> Result<Vec<CompetitorDomainItem>, DataForSeoError>;

    async fn maps_search(
        &self,
        keyword: &str,
        location_code: i64,
    ) -> Result<Vec<MapsItem>, DataForSeoError>;
}

#[async_trait]
impl SeoDataProvider for DataForSeoClient {
    async fn locations(&self) -> Result<Vec<LocationItem>, DataForSeoError> {
        DataForSeoClient::locations(self, "us").await
    }

    async fn post_search_volume_task(
        &self,
        keywords: &[String],
        location_code: i64,
    ) -> Result<String, DataForSeoError> {
        DataForSeoClient::post_search_volume_task(self, keywords, location_code).await
    }

    async fn get_search_volume_task(
        &self,
        task_id: &str,
    ) -> Result<Task<SearchVolumeItem>, DataForSeoError> {
        DataForSeoClient::get_search_volume_task(self, task_id).await
    }

    async fn post_serp_tasks(
        &self,
        keywords: &[String],
        location_code: i64,
    ) -> Result<Vec<String>, DataForSeoError> {
        DataForSeoClient::post_serp_tasks(self, keywords, location_code).await
    }

    async fn get_serp_task(&self, task_id: &str) -> Result<Task<SerpResult>, DataForSeoError> {
        DataForSeoClient::get_serp_task(self, task_id).await
    }

    async fn ranked_keywords(
        &self,
        domain: &str,
        limit: u32,
    ) -> Result<Vec<RankedKeywordRecord>, DataForSeoError> {
        DataForSeoClient::ranked_keywords(self, domain, limit).await
    }

    async fn competitors_domain(
        &self,
        domain: &str,
        limit: u32,
    ) -> Result<Vec<CompetitorDomainItem>, DataForSeoError> {
        DataForSeoClient::competitors_domain(self, domain, limit).await
    }

    async fn maps_search(
        &self,
        keyword: &str,
        location_code: i64,
    ) -> Result<Vec<MapsItem>, DataForSeoError> {
        DataForSeoClient::maps_search(self, keyword, location_code).await
    }
}
