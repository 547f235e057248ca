use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub itunes: ItunesConfig,

    #[serde(default)]
    pub taddy: TaddyConfig,

    #[serde(default)]
    pub podchaser: PodchaserConfig,

    #[serde(default)]
    pub refresh: RefreshConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Lifetime of a cached payload (`main` key)
    #[serde(default = "default_main_ttl")]
    pub main_ttl_secs: u64,

    /// Freshness window (`fresh` key); must not exceed `main_ttl_secs`
    #[serde(default = "default_fresh_ttl")]
    pub fresh_ttl_secs: u64,

    /// Lifetime of cached search results
    #[serde(default = "default_main_ttl")]
    pub search_ttl_secs: u64,

    /// Soft cap on in-memory entries before the oldest expiry is evicted
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_main_ttl() -> u64 {
    86_400
}
fn default_fresh_ttl() -> u64 {
    3_600
}
fn default_max_entries() -> usize {
    10_000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            main_ttl_secs: default_main_ttl(),
            fresh_ttl_secs: default_fresh_ttl(),
            search_ttl_secs: default_main_ttl(),
            max_entries: default_max_entries(),
        }
    }
}

impl CacheConfig {
    pub fn main_ttl(&self) -> Duration {
        Duration::from_secs(self.main_ttl_secs)
    }

    pub fn fresh_ttl(&self) -> Duration {
        Duration::from_secs(self.fresh_ttl_secs)
    }

    pub fn search_ttl(&self) -> Duration {
        Duration::from_secs(self.search_ttl_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ItunesConfig {
    #[serde(default = "default_itunes_search_url")]
    pub search_url: String,

    #[serde(default = "default_itunes_lookup_url")]
    pub lookup_url: String,

    /// Calls allowed per `period_secs`, shared by every iTunes client in the process
    #[serde(default = "default_itunes_max_calls")]
    pub max_calls: u32,

    #[serde(default = "default_itunes_period")]
    pub period_secs: u64,

    /// Retries on HTTP 429 before giving up
    #[serde(default = "default_itunes_max_retries")]
    pub max_retries: u32,

    /// Back-off unit; retry `n` (0-based) waits `base * 2^(n+1)`
    #[serde(default = "default_backoff_base")]
    pub backoff_base_ms: u64,

    #[serde(default = "default_itunes_timeout")]
    pub timeout_secs: u64,
}

fn default_itunes_search_url() -> String {
    "https://itunes.apple.com/search".to_string()
}
fn default_itunes_lookup_url() -> String {
    "https://itunes.apple.com/lookup".to_string()
}
fn default_itunes_max_calls() -> u32 {
    20
}
fn default_itunes_period() -> u64 {
    60
}
fn default_itunes_max_retries() -> u32 {
    3
}
fn default_backoff_base() -> u64 {
    1_000
}
fn default_itunes_timeout() -> u64 {
    10
}

impl Default for ItunesConfig {
    fn default() -> Self {
        Self {
            search_url: default_itunes_search_url(),
            lookup_url: default_itunes_lookup_url(),
            max_calls: default_itunes_max_calls(),
            period_secs: default_itunes_period(),
            max_retries: default_itunes_max_retries(),
            backoff_base_ms: default_backoff_base(),
            timeout_secs: default_itunes_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TaddyConfig {
    #[serde(default = "default_taddy_endpoint")]
    pub endpoint: String,

    /// Sent as `X-API-KEY` (overridden by `TADDY_API_KEY`)
    #[serde(default)]
    pub api_key: String,

    /// Sent as `X-USER-ID` (overridden by `TADDY_USER_ID`)
    #[serde(default)]
    pub user_id: String,

    #[serde(default = "default_graphql_timeout")]
    pub timeout_secs: u64,
}

fn default_taddy_endpoint() -> String {
    "https://api.taddy.org".to_string()
}
fn default_graphql_timeout() -> u64 {
    15
}

impl Default for TaddyConfig {
    fn default() -> Self {
        Self {
            endpoint: default_taddy_endpoint(),
            api_key: String::new(),
            user_id: String::new(),
            timeout_secs: default_graphql_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PodchaserConfig {
    #[serde(default = "default_podchaser_endpoint")]
    pub endpoint: String,

    /// Comma-separated `key:secret` pairs (overridden by `PODCHASER_CREDENTIALS`)
    #[serde(default)]
    pub credentials: String,

    #[serde(default = "default_graphql_timeout")]
    pub timeout_secs: u64,

    /// Access tokens live 365 days; cache them for one day less
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
}

fn default_podchaser_endpoint() -> String {
    "https://api.podchaser.com/graphql".to_string()
}
fn default_token_ttl() -> u64 {
    60 * 60 * 24 * 364
}

impl Default for PodchaserConfig {
    fn default() -> Self {
        Self {
            endpoint: default_podchaser_endpoint(),
            credentials: String::new(),
            timeout_secs: default_graphql_timeout(),
            token_ttl_secs: default_token_ttl(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefreshConfig {
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Retries per task after a retryable provider failure
    #[serde(default = "default_refresh_retries")]
    pub max_retries: u32,

    #[serde(default = "default_detail_retry_delay")]
    pub detail_retry_delay_secs: u64,

    #[serde(default = "default_credits_retry_delay")]
    pub credits_retry_delay_secs: u64,

    /// Pause between consecutive jobs on the worker
    #[serde(default = "default_pace")]
    pub pace_ms: u64,
}

fn default_queue_capacity() -> usize {
    100
}
fn default_refresh_retries() -> u32 {
    3
}
fn default_detail_retry_delay() -> u64 {
    30
}
fn default_credits_retry_delay() -> u64 {
    60
}
fn default_pace() -> u64 {
    250
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            max_retries: default_refresh_retries(),
            detail_retry_delay_secs: default_detail_retry_delay(),
            credits_retry_delay_secs: default_credits_retry_delay(),
            pace_ms: default_pace(),
        }
    }
}
