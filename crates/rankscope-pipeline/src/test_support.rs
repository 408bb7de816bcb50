//! In-memory provider and AI fakes for pipeline tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use rankscope_core::RankedKeywordRecord;
use rankscope_dataforseo::{
    CompetitorDomainItem, DataForSeoError, LocationItem, MapsItem, SearchVolumeItem,
    SeoDataProvider, SerpItem, SerpResult, Task,
};
use rankscope_dataforseo::types::STATUS_OK;
use rankscope_llm::{CompletionRequest, LlmError, TextCompletion};

pub(crate) const PENDING: i64 = 40_602;

fn status_error() -> DataForSeoError {
    DataForSeoError::Status {
        status: 500,
        message: "Internal Server Error".to_string(),
    }
}

#[derive(Default)]
pub(crate) struct FakeProvider {
    pub locations: Vec<LocationItem>,
    pub maps: Vec<MapsItem>,
    pub competitor_domains: Vec<CompetitorDomainItem>,
    pub ranked: HashMap<String, Vec<RankedKeywordRecord>>,
    pub failing_domains: HashSet<String>,
    pub volumes: HashMap<String, u64>,
    pub volume_status: Option<i64>,
    pub volume_post_fails: bool,
    pub serp: HashMap<String, Vec<SerpItem>>,
    pub serp_status: Option<i64>,
    /// Zero-based SERP submissions that fail with a 500.
    pub failing_serp_batches: HashSet<usize>,
    pub submitted_serp: Mutex<Vec<Vec<String>>>,
    pub submitted_volume: Mutex<Vec<String>>,
    pub maps_queries: Mutex<Vec<(String, i64)>>,
}

impl FakeProvider {
    pub fn submitted_serp_keywords(&self) -> Vec<String> {
        self.submitted_serp
            .lock()
            .map(|batches| batches.iter().flatten().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SeoDataProvider for FakeProvider {
    async fn locations(&self) -> Result<Vec<LocationItem>, DataForSeoError> {
        Ok(self.locations.clone())
    }

    async fn post_search_volume_task(
        &self,
        keywords: &[String],
        _location_code: i64,
    ) -> Result<String, DataForSeoError> {
        if self.volume_post_fails {
            return Err(status_error());
        }
        if let Ok(mut submitted) = self.submitted_volume.lock() {
            *submitted = keywords.to_vec();
        }
        Ok("volume-task".to_string())
    }

    async fn get_search_volume_task(
        &self,
        task_id: &str,
    ) -> Result<Task<SearchVolumeItem>, DataForSeoError> {
        let submitted = self.submitted_volume.lock().map(|k| k.clone()).unwrap_or_default();
        let result = submitted
            .iter()
            .filter_map(|keyword| {
                self.volumes.get(keyword).map(|volume| SearchVolumeItem {
                    keyword: keyword.clone(),
                    search_volume: Some(*volume),
                    cpc: Some(1.5),
                    competition: None,
                    competition_index: Some(40.0),
                })
            })
            .collect();
        Ok(Task {
            id: task_id.to_string(),
            status_code: self.volume_status.unwrap_or(STATUS_OK),
            status_message: String::new(),
            result,
        })
    }

    async fn post_serp_tasks(
        &self,
        keywords: &[String],
        _location_code: i64,
    ) -> Result<Vec<String>, DataForSeoError> {
        let batch_no = match self.submitted_serp.lock() {
            Ok(mut submitted) => {
                submitted.push(keywords.to_vec());
                submitted.len() - 1
            }
            Err(_) => 0,
        };
        if self.failing_serp_batches.contains(&batch_no) {
            return Err(status_error());
        }
        Ok(keywords.iter().map(|k| format!("serp:{k}")).collect())
    }

    async fn get_serp_task(&self, task_id: &str) -> Result<Task<SerpResult>, DataForSeoError> {
        let keyword = task_id.trim_start_matches("serp:").to_string();
        let items = self.serp.get(&keyword).cloned().unwrap_or_default();
        Ok(Task {
            id: task_id.to_string(),
            status_code: self.serp_status.unwrap_or(STATUS_OK),
            status_message: String::new(),
            result: vec![SerpResult { keyword, items }],
        })
    }

    async fn ranked_keywords(
        &self,
        domain: &str,
        _limit: u32,
    ) -> Result<Vec<RankedKeywordRecord>, DataForSeoError> {
        if self.failing_domains.contains(domain) {
            return Err(status_error());
        }
        Ok(self.ranked.get(domain).cloned().unwrap_or_default())
    }

    async fn competitors_domain(
        &self,
        _domain: &str,
        _limit: u32,
    ) -> Result<Vec<CompetitorDomainItem>, DataForSeoError> {
        Ok(self.competitor_domains.clone())
    }

    async fn maps_search(
        &self,
        keyword: &str,
        location_code: i64,
    ) -> Result<Vec<MapsItem>, DataForSeoError> {
        if let Ok(mut queries) = self.maps_queries.lock() {
            queries.push((keyword.to_string(), location_code));
        }
        Ok(self.maps.clone())
    }
}

pub(crate) fn ranked(keyword: &str, domain: &str, volume: u64) -> RankedKeywordRecord {
    RankedKeywordRecord {
        keyword: keyword.to_string(),
        search_volume: volume,
        cpc: None,
        rank: 5,
        url: format!("https://{domain}/"),
        domain: domain.to_string(),
        keyword_difficulty: 30.0,
    }
}

pub(crate) fn organic(rank: u32, domain: &str) -> SerpItem {
    SerpItem {
        item_type: "organic".to_string(),
        rank_absolute: Some(rank),
        domain: Some(domain.to_string()),
        url: Some(format!("https://{domain}/page")),
    }
}

/// Answers every completion with a fixed string.
pub(crate) struct ScriptedAi(pub &'static str);

#[async_trait]
impl TextCompletion for ScriptedAi {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, LlmError> {
        Ok(self.0.to_string())
    }
}

/// An AI service that is always unavailable.
pub(crate) struct OfflineAi;

#[async_trait]
impl TextCompletion for OfflineAi {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, LlmError> {
        Err(LlmError::MissingApiKey)
    }
}
