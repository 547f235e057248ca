//! Cache-aside search over a single named provider.
//!
//! Results are cached under `search:<provider>:<slug>:<limit>`, where the
//! slug lowercases and normalises the query so "The Daily" and "the daily"
//! share an entry.

use std::sync::Arc;
use std::time::Duration;

use podvault_common::{Error, ProviderKind, Result};
use rslug::slugify;
use tracing::{info, warn};

use super::cache::{CacheLookup, CacheStore};
use super::provider::NormalizedPodcast;
use super::registry::ProviderRegistry;

/// Cache key for a search.
pub fn search_cache_key(provider: ProviderKind, query: &str, limit: usize) -> String {
    format!("search:{}:{}:{}", provider, slugify!(query), limit)
}

/// Searches one provider, caching results for `ttl`.
pub struct SearchService {
    registry: ProviderRegistry,
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl SearchService {
    pub fn new(registry: ProviderRegistry, cache: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self {
            registry,
            cache,
            ttl,
        }
    }

    /// Search `provider` for `query`.
    ///
    /// Unknown provider names fail with [`Error::Validation`] before any cache
    /// or network access. Provider failures propagate unchanged and are not
    /// cached.
    pub async fn search(
        &self,
        query: &str,
        provider: &str,
        limit: usize,
    ) -> Result<CacheLookup<Vec<NormalizedPodcast>>> {
        let kind: ProviderKind = provider.parse()?;
        let key = search_cache_key(kind, query, limit);

        match self.lookup(kind, &key, query, limit).await? {
            CacheLookup::Hit(value) => match decode(value) {
                Ok(results) => {
                    info!(key = %key, "Search cache HIT");
                    Ok(CacheLookup::Hit(results))
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Discarding unreadable cached search results");
                    self.cache.delete(&key).await;
                    match self.lookup(kind, &key, query, limit).await? {
                        CacheLookup::Hit(value) => decode(value).map(CacheLookup::Hit),
                        CacheLookup::Computed(value) => decode(value).map(CacheLookup::Computed),
                    }
                }
            },
            CacheLookup::Computed(value) => decode(value).map(CacheLookup::Computed),
        }
    }

    async fn lookup(
        &self,
        kind: ProviderKind,
        key: &str,
        query: &str,
        limit: usize,
    ) -> Result<CacheLookup<serde_json::Value>> {
        let client = self.registry.get(kind);
        self.cache
            .get_or_compute(
                key,
                self.ttl,
                Box::pin(async move {
                    info!(provider = %kind, query = %query, "Search cache MISS, querying provider");
                    let results = client.search(query, limit).await?;
                    info!(
                        provider = %kind,
                        count = results.len(),
                        ttl_secs = self.ttl.as_secs(),
                        "Fetched results, caching"
                    );
                    serde_json::to_value(&results)
                        .map_err(|e| Error::internal(format!("Failed to serialize results: {e}")))
                }),
            )
            .await
    }
}

fn decode(value: serde_json::Value) -> Result<Vec<NormalizedPodcast>> {
    serde_json::from_value(value)
        .map_err(|e| Error::cache(format!("Unreadable cached search results: {e}")))
}
