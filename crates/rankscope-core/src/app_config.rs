use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub dataforseo_login: String,
    pub dataforseo_password: String,
    pub dataforseo_base_url: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub keyword_model: String,
    pub filter_model: String,
    pub conversion_model: String,
    pub http_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub poll_max_attempts: u32,
    pub volume_poll_delay_ms: u64,
    pub serp_poll_delay_ms: u64,
    pub location_cache_ttl_secs: u64,
    pub ranking_top_n: usize,
    pub competitor_keyword_limit: u32,
    pub rate_limit_per_minute: usize,
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("dataforseo_login", &self.dataforseo_login)
            .field("dataforseo_password", &"[redacted]")
            .field("dataforseo_base_url", &self.dataforseo_base_url)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("openai_base_url", &self.openai_base_url)
            .field("keyword_model", &self.keyword_model)
            .field("filter_model", &self.filter_model)
            .field("conversion_model", &self.conversion_model)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("poll_max_attempts", &self.poll_max_attempts)
            .field("volume_poll_delay_ms", &self.volume_poll_delay_ms)
            .field("serp_poll_delay_ms", &self.serp_poll_delay_ms)
            .field("location_cache_ttl_secs", &self.location_cache_ttl_secs)
            .field("ranking_top_n", &self.ranking_top_n)
            .field("competitor_keyword_limit", &self.competitor_keyword_limit)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}
