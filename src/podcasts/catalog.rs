//! Caller-facing facade over the search and detail services.
//!
//! [`PodcastCatalog`] validates caller input, applies defaults and maps
//! "nothing found" to [`Error::NotFound`]. It is what a web layer or the CLI
//! talks to.

use std::sync::Arc;
use std::time::Duration;

use podvault_common::{Error, ProviderKind, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::cache::{CacheStore, MemoryCache};
use super::detail::{CreditsPayload, DetailService, Hydrator, SwrCache};
use super::provider::NormalizedPodcast;
use super::queue::RefreshQueue;
use super::rate_limiter::RateLimiter;
use super::refresh::{BackgroundRefresher, RefreshDispatcher};
use super::registry::ProviderRegistry;
use super::search::SearchService;
use crate::config::{CacheConfig, Config};

/// Results returned when the caller names no limit.
pub const DEFAULT_LIMIT: usize = 20;
/// Largest accepted limit; larger values are clamped.
pub const MAX_LIMIT: usize = 50;
/// Provider searched when the caller names none.
pub const DEFAULT_PROVIDER: ProviderKind = ProviderKind::Itunes;

/// Search results with their count and source provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub count: usize,
    pub provider: ProviderKind,
    pub results: Vec<NormalizedPodcast>,
}

/// Entry point for podcast search, detail and credits lookups.
pub struct PodcastCatalog {
    search: SearchService,
    detail: DetailService,
}

impl PodcastCatalog {
    /// Wire a catalog from its parts.
    pub fn new(
        registry: ProviderRegistry,
        cache: Arc<dyn CacheStore>,
        cache_config: &CacheConfig,
        dispatcher: Arc<dyn RefreshDispatcher>,
    ) -> Self {
        let swr = SwrCache::new(
            Arc::clone(&cache),
            cache_config.main_ttl(),
            cache_config.fresh_ttl(),
        );
        let hydrator = Hydrator::from_registry(&registry);

        Self {
            search: SearchService::new(registry, cache, cache_config.search_ttl()),
            detail: DetailService::new(swr, hydrator, dispatcher),
        }
    }

    /// Wire a catalog whose stale reads are refreshed by a spawned
    /// [`RefreshQueue`]. Must be called inside a Tokio runtime.
    pub fn with_queue(registry: ProviderRegistry, cache: Arc<dyn CacheStore>, config: &Config) -> Self {
        let refresher = Arc::new(BackgroundRefresher::new(
            SwrCache::new(
                Arc::clone(&cache),
                config.cache.main_ttl(),
                config.cache.fresh_ttl(),
            ),
            Hydrator::from_registry(&registry),
        ));
        let queue = Arc::new(RefreshQueue::new(refresher, &config.refresh));

        Self::new(registry, cache, &config.cache, queue)
    }

    /// Build the full stack from configuration: one in-memory cache, one
    /// shared iTunes rate limiter, HTTP providers and a running refresh queue.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn from_config(config: &Config) -> Self {
        let cache: Arc<dyn CacheStore> = Arc::new(MemoryCache::new(config.cache.max_entries));
        let itunes_limiter = Arc::new(RateLimiter::new(
            config.itunes.max_calls,
            Duration::from_secs(config.itunes.period_secs),
        ));
        let registry = ProviderRegistry::from_config(config, Arc::clone(&cache), itunes_limiter);

        Self::with_queue(registry, cache, config)
    }

    /// Search one provider.
    ///
    /// A blank query or unknown provider is a validation error. `limit` is
    /// clamped to `1..=MAX_LIMIT` and defaults to [`DEFAULT_LIMIT`].
    pub async fn search(
        &self,
        query: &str,
        provider: Option<&str>,
        limit: Option<usize>,
    ) -> Result<SearchResponse> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::validation("Query parameter 'q' is required."));
        }

        let provider = match provider {
            Some(name) => ProviderRegistry::validate_name(name)?,
            None => DEFAULT_PROVIDER,
        };
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

        info!(query = %query, provider = %provider, limit, "Search");
        let results = self
            .search
            .search(query, provider.as_str(), limit)
            .await?
            .into_inner();

        Ok(SearchResponse {
            count: results.len(),
            provider,
            results,
        })
    }

    /// Hydrated detail for `id`.
    pub async fn get_detail(&self, id: &str) -> Result<NormalizedPodcast> {
        let id = validate_id(id)?;
        info!(id = %id, "Fetching detail");

        self.detail
            .get_detail(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("No podcast found for id '{id}'.")))
    }

    /// Credits for `id`; provider failures yield an empty list, never an error.
    pub async fn get_credits(&self, id: &str) -> Result<CreditsPayload> {
        let id = validate_id(id)?;
        info!(id = %id, "Fetching credits");
        self.detail.get_credits(id).await
    }

    /// Names of the providers accepted by [`search`](Self::search).
    pub fn providers(&self) -> Vec<&'static str> {
        ProviderRegistry::available_names()
    }
}

fn validate_id(id: &str) -> Result<&str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(Error::validation("Podcast id is required."));
    }
    Ok(id)
}
