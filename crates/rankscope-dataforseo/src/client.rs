//! HTTP client for the DataForSEO v3 REST API.
//!
//! Wraps `reqwest` with HTTP Basic authentication, transient-error retry,
//! and typed envelope deserialization. Every call checks the top-level
//! `status_code` and surfaces non-success values as [`DataForSeoError::Api`].

use std::time::Duration;

use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use rankscope_core::{RankedKeywordRecord, US_LOCATION_CODE};

use crate::error::DataForSeoError;
use crate::normalize::ranked_keyword_records;
use crate::retry::retry_with_backoff;
use crate::types::{
    ApiResponse, CompetitorDomainItem, CompetitorsDomainResult, LocationItem, MapsItem,
    MapsResult, RankedKeywordsResult, SearchVolumeItem, SerpResult, Task, STATUS_OK,
};

const DEFAULT_BASE_URL: &str = "https://api.dataforseo.com/v3";
const LANGUAGE_CODE: &str = "en";
const SERP_DEPTH: u32 = 100;
const SERP_PRIORITY: u32 = 2;

const SEARCH_VOLUME_POST: &str = "/keywords_data/google_ads/search_volume/task_post";
const SEARCH_VOLUME_GET: &str = "/keywords_data/google_ads/search_volume/task_get";
const SERP_POST: &str = "/serp/google/organic/task_post";
const SERP_GET: &str = "/serp/google/organic/task_get/advanced";
const RANKED_KEYWORDS: &str = "/dataforseo_labs/google/ranked_keywords/live";
const COMPETITORS_DOMAIN: &str = "/dataforseo_labs/google/competitors_domain/live";
const MAPS_SEARCH: &str = "/serp/google/maps/live/advanced";

/// Client for the DataForSEO REST API.
///
/// Use [`DataForSeoClient::new`] for production or
/// [`DataForSeoClient::with_base_url`] to point at a mock server in tests.
pub struct DataForSeoClient {
    client: Client,
    login: String,
    password: String,
    base_url: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl DataForSeoClient {
    /// Creates a new client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`DataForSeoError::MissingCredentials`] if either credential is
    /// blank, or [`DataForSeoError::Http`] if the `reqwest::Client` cannot be
    /// constructed.
    pub fn new(login: &str, password: &str, timeout_secs: u64) -> Result<Self, DataForSeoError> {
        Self::with_base_url(login, password, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`DataForSeoError::MissingCredentials`] if either credential is
    /// blank, [`DataForSeoError::InvalidBaseUrl`] if `base_url` does not parse,
    /// or [`DataForSeoError::Http`] if the `reqwest::Client` cannot be built.
    pub fn with_base_url(
        login: &str,
        password: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, DataForSeoError> {
        if login.trim().is_empty() || password.trim().is_empty() {
            return Err(DataForSeoError::MissingCredentials);
        }

        let trimmed = base_url.trim_end_matches('/');
        Url::parse(trimmed).map_err(|e| DataForSeoError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("rankscope/0.1 (seo-opportunity)")
            .build()?;

        Ok(Self {
            client,
            login: login.to_owned(),
            password: password.to_owned(),
            base_url: trimmed.to_owned(),
            max_retries: 2,
            backoff_base_ms: 1_000,
        })
    }

    /// Overrides the transient-error retry budget.
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Sends an authenticated request and returns the decoded JSON body.
    ///
    /// `endpoint` is the path below `/v3`, e.g. `"/serp/google/maps/live/advanced"`.
    /// The body is only sent for non-GET methods. Transient failures are
    /// retried with jittered back-off. `task_post` endpoints are sent once: a
    /// resend after an unseen success creates duplicate tasks.
    ///
    /// # Errors
    ///
    /// - [`DataForSeoError::Status`] on a non-2xx response, carrying the body text.
    /// - [`DataForSeoError::Http`] on network failure.
    /// - [`DataForSeoError::Deserialize`] if the body is not JSON.
    pub async fn call(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&Value>,
    ) -> Result<Value, DataForSeoError> {
        let max_retries = if endpoint.ends_with("/task_post") {
            0
        } else {
            self.max_retries
        };
        retry_with_backoff(max_retries, self.backoff_base_ms, || {
            self.send_once(endpoint, method.clone(), body)
        })
        .await
    }

    async fn send_once(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&Value>,
    ) -> Result<Value, DataForSeoError> {
        let url = format!("{}{endpoint}", self.base_url);
        let mut request = self
            .client
            .request(method.clone(), &url)
            .basic_auth(&self.login, Some(&self.password));
        if let Some(body) = body.filter(|_| method != Method::GET) {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(DataForSeoError::Status {
                status: status.as_u16(),
                message: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| DataForSeoError::Deserialize {
            context: endpoint.to_owned(),
            source: e,
        })
    }

    /// Calls `endpoint`, checks the envelope status and decodes it into `T` items.
    async fn request_envelope<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&Value>,
    ) -> Result<ApiResponse<T>, DataForSeoError> {
        let raw = self.call(endpoint, method, body).await?;
        Self::check_api_error(&raw)?;
        serde_json::from_value(raw).map_err(|e| DataForSeoError::Deserialize {
            context: endpoint.to_owned(),
            source: e,
        })
    }

    /// Checks the top-level `status_code` and returns an error if it is not 20000.
    fn check_api_error(body: &Value) -> Result<(), DataForSeoError> {
        let code = body
            .get("status_code")
            .and_then(Value::as_i64)
            .unwrap_or_default();
        if code != STATUS_OK {
            let message = body
                .get("status_message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            return Err(DataForSeoError::Api { code, message });
        }
        Ok(())
    }

    /// Collects the result items of a live (synchronous) endpoint.
    ///
    /// A task that failed inside an otherwise successful envelope is an error:
    /// live endpoints have nothing to poll.
    fn live_results<T>(envelope: ApiResponse<T>) -> Result<Vec<T>, DataForSeoError> {
        let mut out = Vec::new();
        for task in envelope.tasks {
            if task.status_code != STATUS_OK {
                return Err(DataForSeoError::Api {
                    code: task.status_code,
                    message: task.status_message,
                });
            }
            out.extend(task.result);
        }
        Ok(out)
    }

    fn first_task<T>(envelope: ApiResponse<T>, context: &str) -> Result<Task<T>, DataForSeoError> {
        envelope
            .tasks
            .into_iter()
            .next()
            .ok_or_else(|| DataForSeoError::EmptyResponse {
                context: context.to_owned(),
            })
    }

    /// Lists every Google Ads location for a country (e.g. `"us"`).
    ///
    /// # Errors
    ///
    /// Propagates transport, status and decoding errors.
    pub async fn locations(&self, country: &str) -> Result<Vec<LocationItem>, DataForSeoError> {
        let endpoint = format!("/keywords_data/google_ads/locations/{country}");
        let envelope = self
            .request_envelope::<LocationItem>(&endpoint, Method::GET, None)
            .await?;
        Self::live_results(envelope)
    }

    /// Submits one search-volume task covering all `keywords` and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`DataForSeoError::NoTaskCreated`] if the response has no task id.
    pub async fn post_search_volume_task(
        &self,
        keywords: &[String],
        location_code: i64,
    ) -> Result<String, DataForSeoError> {
        let body = json!([{ "location_code": location_code, "keywords": keywords }]);
        let envelope = self
            .request_envelope::<Value>(SEARCH_VOLUME_POST, Method::POST, Some(&body))
            .await?;

        let id = envelope
            .tasks
            .into_iter()
            .map(|t| t.id)
            .find(|id| !id.is_empty())
            .ok_or_else(|| DataForSeoError::NoTaskCreated {
                endpoint: SEARCH_VOLUME_POST.to_owned(),
            })?;

        tracing::info!(task_id = %id, keywords = keywords.len(), location_code, "search volume task created");
        Ok(id)
    }

    /// Fetches the current state of a search-volume task.
    ///
    /// # Errors
    ///
    /// Propagates transport, status and decoding errors, and
    /// [`DataForSeoError::EmptyResponse`] when the envelope has no task.
    pub async fn get_search_volume_task(
        &self,
        task_id: &str,
    ) -> Result<Task<SearchVolumeItem>, DataForSeoError> {
        let endpoint = format!("{SEARCH_VOLUME_GET}/{task_id}");
        let envelope = self.request_envelope(&endpoint, Method::GET, None).await?;
        Self::first_task(envelope, &endpoint)
    }

    /// Submits one organic SERP task per keyword (depth 100) and returns the
    /// ids of the tasks the provider accepted.
    ///
    /// # Errors
    ///
    /// Returns [`DataForSeoError::NoTaskCreated`] if no task was accepted.
    pub async fn post_serp_tasks(
        &self,
        keywords: &[String],
        location_code: i64,
    ) -> Result<Vec<String>, DataForSeoError> {
        let body: Vec<Value> = keywords
            .iter()
            .map(|keyword| {
                json!({
                    "keyword": keyword,
                    "location_code": location_code,
                    "language_code": LANGUAGE_CODE,
                    "depth": SERP_DEPTH,
                    "priority": SERP_PRIORITY,
                })
            })
            .collect();
        let body = Value::Array(body);

        let envelope = self
            .request_envelope::<Value>(SERP_POST, Method::POST, Some(&body))
            .await?;

        let mut ids = Vec::with_capacity(envelope.tasks.len());
        for task in envelope.tasks {
            if task.id.is_empty() || task.status_code >= 40_000 {
                tracing::warn!(
                    status_code = task.status_code,
                    status_message = %task.status_message,
                    "SERP task rejected"
                );
                continue;
            }
            ids.push(task.id);
        }

        if ids.is_empty() {
            return Err(DataForSeoError::NoTaskCreated {
                endpoint: SERP_POST.to_owned(),
            });
        }
        tracing::info!(tasks = ids.len(), location_code, "SERP tasks created");
        Ok(ids)
    }

    /// Fetches the current state of an organic SERP task.
    ///
    /// # Errors
    ///
    /// Propagates transport, status and decoding errors, and
    /// [`DataForSeoError::EmptyResponse`] when the envelope has no task.
    pub async fn get_serp_task(&self, task_id: &str) -> Result<Task<SerpResult>, DataForSeoError> {
        let endpoint = format!("{SERP_GET}/{task_id}");
        let envelope = self.request_envelope(&endpoint, Method::GET, None).await?;
        Self::first_task(envelope, &endpoint)
    }

    /// Keywords `domain` ranks for in the US-wide index, at most `limit`.
    ///
    /// # Errors
    ///
    /// Propagates transport, status, task and decoding errors.
    pub async fn ranked_keywords(
        &self,
        domain: &str,
        limit: u32,
    ) -> Result<Vec<RankedKeywordRecord>, DataForSeoError> {
        let body = json!([{
            "target": domain,
            "location_code": US_LOCATION_CODE,
            "language_code": LANGUAGE_CODE,
            "limit": limit,
        }]);
        let envelope = self
            .request_envelope::<RankedKeywordsResult>(RANKED_KEYWORDS, Method::POST, Some(&body))
            .await?;

        let items = Self::live_results(envelope)?
            .into_iter()
            .flat_map(|r| r.items)
            .collect();
        Ok(ranked_keyword_records(items))
    }

    /// Organic competitors of `domain`, excluding the very largest sites.
    ///
    /// # Errors
    ///
    /// Propagates transport, status, task and decoding errors.
    pub async fn competitors_domain(
        &self,
        domain: &str,
        limit: u32,
    ) -> Result<Vec<CompetitorDomainItem>, DataForSeoError> {
        let body = json!([{
            "target": domain,
            "location_code": US_LOCATION_CODE,
            "language_code": LANGUAGE_CODE,
            "language_name": "English",
            "limit": limit,
            "exclude_top_domains": true,
        }]);
        let envelope = self
            .request_envelope::<CompetitorsDomainResult>(
                COMPETITORS_DOMAIN,
                Method::POST,
                Some(&body),
            )
            .await?;

        Ok(Self::live_results(envelope)?
            .into_iter()
            .flat_map(|r| r.items)
            .collect())
    }

    /// Google Maps results for `keyword` at `location_code`.
    ///
    /// # Errors
    ///
    /// Propagates transport, status, task and decoding errors.
    pub async fn maps_search(
        &self,
        keyword: &str,
        location_code: i64,
    ) -> Result<Vec<MapsItem>, DataForSeoError> {
        let body = json!([{
            "keyword": keyword,
            "location_code": location_code,
            "language_code": LANGUAGE_CODE,
        }]);
        let envelope = self
            .request_envelope::<MapsResult>(MAPS_SEARCH, Method::POST, Some(&body))
            .await?;

        Ok(Self::live_results(envelope)?
            .into_iter()
            .flat_map(|r| r.items)
            .collect())
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
