use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Upper bound for `RANKSCOPE_RANKING_TOP_N`: one live SERP batch.
const MAX_RANKING_TOP_N: usize = 50;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        parse_value::<SocketAddr>(var, &or_default(var, default))
    };

    let env = parse_environment(&or_default("RANKSCOPE_ENV", "development"))?;

    let dataforseo_login = require("DATAFORSEO_LOGIN")?;
    let dataforseo_password = require("DATAFORSEO_PASSWORD")?;
    let dataforseo_base_url = or_default("DATAFORSEO_BASE_URL", "https://api.dataforseo.com/v3");

    let openai_api_key = lookup("OPENAI_API_KEY")
        .ok()
        .filter(|v| !v.trim().is_empty());
    let openai_base_url = or_default("OPENAI_BASE_URL", "https://api.openai.com/v1");
    let keyword_model = or_default("RANKSCOPE_KEYWORD_MODEL", "gpt-4o");
    let filter_model = or_default("RANKSCOPE_FILTER_MODEL", "gpt-4o");
    let conversion_model = or_default("RANKSCOPE_CONVERSION_MODEL", "gpt-4o-mini");

    let bind_addr = parse_addr("RANKSCOPE_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("RANKSCOPE_LOG_LEVEL", "info");

    let http_timeout_secs = parse_value::<u64>(
        "RANKSCOPE_HTTP_TIMEOUT_SECS",
        &or_default("RANKSCOPE_HTTP_TIMEOUT_SECS", "60"),
    )?;
    let max_retries = parse_value::<u32>(
        "RANKSCOPE_MAX_RETRIES",
        &or_default("RANKSCOPE_MAX_RETRIES", "2"),
    )?;
    let retry_backoff_base_ms = parse_value::<u64>(
        "RANKSCOPE_RETRY_BACKOFF_BASE_MS",
        &or_default("RANKSCOPE_RETRY_BACKOFF_BASE_MS", "1000"),
    )?;
    let poll_max_attempts = parse_value::<u32>(
        "RANKSCOPE_POLL_MAX_ATTEMPTS",
        &or_default("RANKSCOPE_POLL_MAX_ATTEMPTS", "20"),
    )?;
    let volume_poll_delay_ms = parse_value::<u64>(
        "RANKSCOPE_VOLUME_POLL_DELAY_MS",
        &or_default("RANKSCOPE_VOLUME_POLL_DELAY_MS", "3000"),
    )?;
    let serp_poll_delay_ms = parse_value::<u64>(
        "RANKSCOPE_SERP_POLL_DELAY_MS",
        &or_default("RANKSCOPE_SERP_POLL_DELAY_MS", "10000"),
    )?;
    let location_cache_ttl_secs = parse_value::<u64>(
        "RANKSCOPE_LOCATION_CACHE_TTL_SECS",
        &or_default("RANKSCOPE_LOCATION_CACHE_TTL_SECS", "86400"),
    )?;
    let ranking_top_n = parse_value::<usize>(
        "RANKSCOPE_RANKING_TOP_N",
        &or_default("RANKSCOPE_RANKING_TOP_N", "50"),
    )?;
    let competitor_keyword_limit = parse_value::<u32>(
        "RANKSCOPE_COMPETITOR_KEYWORD_LIMIT",
        &or_default("RANKSCOPE_COMPETITOR_KEYWORD_LIMIT", "30"),
    )?;
    let rate_limit_per_minute = parse_value::<usize>(
        "RANKSCOPE_RATE_LIMIT_PER_MINUTE",
        &or_default("RANKSCOPE_RATE_LIMIT_PER_MINUTE", "30"),
    )?;
    let request_timeout_secs = parse_value::<u64>(
        "RANKSCOPE_REQUEST_TIMEOUT_SECS",
        &or_default("RANKSCOPE_REQUEST_TIMEOUT_SECS", "600"),
    )?;

    if poll_max_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "RANKSCOPE_POLL_MAX_ATTEMPTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if !(1..=MAX_RANKING_TOP_N).contains(&ranking_top_n) {
        return Err(ConfigError::InvalidEnvVar {
            var: "RANKSCOPE_RANKING_TOP_N".to_string(),
            reason: format!("must be between 1 and {MAX_RANKING_TOP_N}"),
        });
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        dataforseo_login,
        dataforseo_password,
        dataforseo_base_url,
        openai_api_key,
        openai_base_url,
        keyword_model,
        filter_model,
        conversion_model,
        http_timeout_secs,
        max_retries,
        retry_backoff_base_ms,
        poll_max_attempts,
        volume_poll_delay_ms,
        serp_poll_delay_ms,
        location_cache_ttl_secs,
        ranking_top_n,
        competitor_keyword_limit,
        rate_limit_per_minute,
        request_timeout_secs,
    })
}

fn parse_value<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "RANKSCOPE_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
