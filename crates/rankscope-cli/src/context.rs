//! Wires the provider, AI client and pipeline from the loaded config.

use std::{sync::Arc, time::Duration};

use rankscope_core::AppConfig;
use rankscope_dataforseo::{DataForSeoClient, SeoDataProvider};
use rankscope_llm::{AiModels, DisabledCompletion, OpenAiClient, TextCompletion};
use rankscope_pipeline::{
    Analyzer, AnalyzerSettings, LocationCache, LocationResolver, ProviderLocations,
    RankingSettings,
};

pub(crate) struct Context {
    pub analyzer: Analyzer,
    pub resolver: LocationResolver,
}

impl Context {
    pub(crate) fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let provider: Arc<dyn SeoDataProvider> = Arc::new(
            DataForSeoClient::with_base_url(
                &config.dataforseo_login,
                &config.dataforseo_password,
                config.http_timeout_secs,
                &config.dataforseo_base_url,
            )?
            .with_retry(config.max_retries, config.retry_backoff_base_ms),
        );

        let ai: Arc<dyn TextCompletion> = match config.openai_api_key.as_deref() {
            Some(key) => Arc::new(OpenAiClient::with_base_url(
                key,
                config.http_timeout_secs,
                &config.openai_base_url,
            )?),
            None => {
                tracing::debug!("no AI key configured, using fallbacks");
                Arc::new(DisabledCompletion)
            }
        };

        let cache = LocationCache::new(
            Arc::new(ProviderLocations::new(Arc::clone(&provider))),
            Duration::from_secs(config.location_cache_ttl_secs),
        );

        Ok(Self {
            analyzer: Analyzer::new(provider, ai, models(config), settings(config)),
            resolver: LocationResolver::new(Arc::new(cache)),
        })
    }
}

fn models(config: &AppConfig) -> AiModels {
    AiModels {
        keywords: config.keyword_model.clone(),
        relevance: config.filter_model.clone(),
        conversion: config.conversion_model.clone(),
    }
}

fn settings(config: &AppConfig) -> AnalyzerSettings {
    AnalyzerSettings {
        ranking: RankingSettings {
            top_n: config.ranking_top_n,
            poll_max_attempts: config.poll_max_attempts,
            volume_poll_delay_ms: config.volume_poll_delay_ms,
            serp_poll_delay_ms: config.serp_poll_delay_ms,
        },
        competitor_keyword_limit: config.competitor_keyword_limit,
    }
}
