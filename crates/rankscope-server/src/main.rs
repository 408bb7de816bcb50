mod api;
mod middleware;

use std::{sync::Arc, time::Duration};

use tracing_subscriber::EnvFilter;

use rankscope_core::AppConfig;
use rankscope_dataforseo::{DataForSeoClient, SeoDataProvider};
use rankscope_llm::{AiModels, DisabledCompletion, OpenAiClient, TextCompletion};
use rankscope_pipeline::{
    Analyzer, AnalyzerSettings, LocationCache, LocationResolver, ProviderLocations,
    RankingSettings,
};

use crate::{
    api::{build_app, AppState},
    middleware::RateLimitState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = rankscope_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(env = %config.env, bind_addr = %config.bind_addr, "starting rankscope-server");

    let state = build_state(&config)?;
    let app = build_app(
        state,
        RateLimitState::per_minute(config.rate_limit_per_minute),
        Duration::from_secs(config.request_timeout_secs),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
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
            tracing::warn!("OPENAI_API_KEY not set; AI call sites will use their fallbacks");
            Arc::new(DisabledCompletion)
        }
    };

    let cache = LocationCache::new(
        Arc::new(ProviderLocations::new(Arc::clone(&provider))),
        Duration::from_secs(config.location_cache_ttl_secs),
    );

    let analyzer = Analyzer::new(
        provider,
        ai,
        AiModels {
            keywords: config.keyword_model.clone(),
            relevance: config.filter_model.clone(),
            conversion: config.conversion_model.clone(),
        },
        AnalyzerSettings {
            ranking: RankingSettings {
                top_n: config.ranking_top_n,
                poll_max_attempts: config.poll_max_attempts,
                volume_poll_delay_ms: config.volume_poll_delay_ms,
                serp_poll_delay_ms: config.serp_poll_delay_ms,
            },
            competitor_keyword_limit: config.competitor_keyword_limit,
        },
    );

    Ok(AppState {
        analyzer: Arc::new(analyzer),
        resolver: Arc::new(LocationResolver::new(Arc::new(cache))),
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
