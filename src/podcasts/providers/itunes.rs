//! iTunes Search API provider.
//!
//! Implements [`PodcastProvider`] against Apple's public, unauthenticated
//! search and lookup endpoints. iTunes is the primary source of base podcast
//! metadata.
//!
//! Features:
//! - Shared token-bucket rate limiting (20 requests / minute by default). The
//!   limiter is injected so every iTunes client in the process draws from the
//!   same budget.
//! - Retry on HTTP 429 with exponential back-off `base * 2^(attempt+1)`.
//! - 10-second request timeout.
//! - Results without an RSS feed are dropped.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use podvault_common::{ProviderError, ProviderKind};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::ItunesConfig;
use crate::podcasts::provider::{NormalizedPodcast, PodcastProvider, ProviderResult};
use crate::podcasts::rate_limiter::RateLimiter;

/// iTunes refuses `limit` values above this.
const MAX_LIMIT: usize = 200;

// ---------------------------------------------------------------------------
// iTunes API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ItunesResponse {
    #[serde(default)]
    results: Vec<ItunesItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItunesItem {
    collection_id: Option<u64>,
    track_name: Option<String>,
    collection_name: Option<String>,
    artist_name: Option<String>,
    description: Option<String>,
    short_description: Option<String>,
    artwork_url600: Option<String>,
    artwork_url100: Option<String>,
    feed_url: Option<String>,
    primary_genre_name: Option<String>,
    track_count: Option<u32>,
    collection_view_url: Option<String>,
}

impl ItunesItem {
    fn has_feed(&self) -> bool {
        self.feed_url.as_deref().is_some_and(|url| !url.is_empty())
    }

    fn into_podcast(self) -> NormalizedPodcast {
        NormalizedPodcast {
            provider: ProviderKind::Itunes,
            remote_id: self.collection_id.map(|id| id.to_string()).unwrap_or_default(),
            title: first_non_empty(self.track_name, self.collection_name),
            author: self.artist_name.unwrap_or_default(),
            description: first_non_empty(self.description, self.short_description),
            cover_url: first_non_empty(self.artwork_url600, self.artwork_url100),
            rss_feed: self.feed_url.unwrap_or_default(),
            genre: self.primary_genre_name.unwrap_or_default(),
            total_episodes: self.track_count.unwrap_or(0),
            rating: None,
            credits: None,
            website: self.collection_view_url,
        }
    }
}

fn first_non_empty(primary: Option<String>, fallback: Option<String>) -> String {
    primary
        .filter(|s| !s.is_empty())
        .or(fallback)
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Provider implementation
// ---------------------------------------------------------------------------

/// iTunes podcast provider.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use podvault::config::ItunesConfig;
/// use podvault::podcasts::{providers::ItunesProvider, RateLimiter};
///
/// let limiter = Arc::new(RateLimiter::new(20, Duration::from_secs(60)));
/// let provider = ItunesProvider::new(&ItunesConfig::default(), limiter);
/// ```
pub struct ItunesProvider {
    client: reqwest::Client,
    search_url: String,
    lookup_url: String,
    rate_limiter: Arc<RateLimiter>,
    max_retries: u32,
    backoff_base: Duration,
}

impl ItunesProvider {
    /// Create a provider drawing tokens from `rate_limiter`.
    pub fn new(config: &ItunesConfig, rate_limiter: Arc<RateLimiter>) -> Self {
        Self {
            client: super::http_client(Duration::from_secs(config.timeout_secs)),
            search_url: config.search_url.clone(),
            lookup_url: config.lookup_url.clone(),
            rate_limiter,
            max_retries: config.max_retries,
            backoff_base: Duration::from_millis(config.backoff_base_ms),
        }
    }

    /// Rate-limited GET with exponential back-off on 429.
    async fn get(&self, url: &str, params: &[(&str, String)]) -> ProviderResult<ItunesResponse> {
        let mut attempt = 0u32;
        loop {
            self.rate_limiter.acquire().await;

            let resp = self
                .client
                .get(url)
                .query(params)
                .send()
                .await
                .map_err(|e| unavailable(format!("iTunes request failed: {e}")))?;

            if resp.status() == StatusCode::TOO_MANY_REQUESTS {
                if attempt < self.max_retries {
                    let wait = self.backoff_base * 2u32.saturating_pow(attempt + 1);
                    warn!(
                        provider = "itunes",
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        wait_ms = wait.as_millis() as u64,
                        "iTunes returned 429, backing off"
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                    continue;
                }
                return Err(ProviderError::rate_limited(
                    ProviderKind::Itunes,
                    format!("iTunes returned 429 after {} retries.", self.max_retries),
                ));
            }

            if !resp.status().is_success() {
                return Err(unavailable(format!(
                    "iTunes request failed with HTTP {}",
                    resp.status()
                )));
            }

            return resp
                .json::<ItunesResponse>()
                .await
                .map_err(|e| unavailable(format!("Failed to parse iTunes response: {e}")));
        }
    }
}

fn unavailable(message: String) -> ProviderError {
    ProviderError::unavailable(ProviderKind::Itunes, message)
}

#[async_trait]
impl PodcastProvider for ItunesProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Itunes
    }

    async fn search(&self, query: &str, limit: usize) -> ProviderResult<Vec<NormalizedPodcast>> {
        let params = [
            ("term", query.to_string()),
            ("media", "podcast".to_string()),
            ("entity", "podcast".to_string()),
            ("limit", limit.min(MAX_LIMIT).to_string()),
        ];
        debug!(query = %query, limit, "iTunes search");

        let body = self.get(&self.search_url, &params).await?;
        info!(provider = "itunes", query = %query, count = body.results.len(), "Search complete");

        Ok(body
            .results
            .into_iter()
            .filter(ItunesItem::has_feed)
            .map(ItunesItem::into_podcast)
            .collect())
    }

    async fn get_by_id(&self, id: &str) -> ProviderResult<Option<NormalizedPodcast>> {
        let params = [("id", id.to_string()), ("entity", "podcast".to_string())];
        debug!(id = %id, "iTunes lookup");

        let body = self.get(&self.lookup_url, &params).await?;
        match body.results.into_iter().next() {
            Some(item) => Ok(Some(item.into_podcast())),
            None => {
                warn!(provider = "itunes", id = %id, "Lookup returned no results");
                Ok(None)
            }
        }
    }
}
