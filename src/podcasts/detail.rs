//! Stale-while-revalidate detail and credits services.
//!
//! Each logical resource is cached under two keys:
//!
//! - `pod:<id>` / `credits:<id>` holds the payload for the main TTL. Its
//!   presence decides whether data exists at all.
//! - `pod:<id>:fresh` / `credits:<id>:fresh` is a sentinel with the shorter
//!   fresh TTL. Its presence decides whether the payload is still current.
//!
//! Reads never block on a refresh: a payload whose sentinel has expired is
//! returned as-is and a background refresh is dispatched. Only a missing
//! payload triggers a synchronous fetch.

use std::sync::Arc;
use std::time::Duration;

use podvault_common::{Error, ProviderKind, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::cache::CacheStore;
use super::provider::{Credit, NormalizedPodcast, PodcastProvider, ProviderResult};
use super::refresh::{RefreshDispatcher, RefreshTask};
use super::registry::ProviderRegistry;

/// Provider supplying base metadata for detail pages.
pub const PRIMARY_PROVIDER: ProviderKind = ProviderKind::Itunes;
/// Provider supplying ratings and credits.
pub const SECONDARY_PROVIDER: ProviderKind = ProviderKind::Podchaser;

/// Credits for one podcast, as cached and returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditsPayload {
    pub id: String,
    pub provider: ProviderKind,
    pub credits: Vec<Credit>,
}

impl CreditsPayload {
    pub fn new(id: impl Into<String>, credits: Vec<Credit>) -> Self {
        Self {
            id: id.into(),
            provider: SECONDARY_PROVIDER,
            credits,
        }
    }
}

// ---------------------------------------------------------------------------
// Dual-key cache
// ---------------------------------------------------------------------------

/// Resource cached with stale-while-revalidate semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwrResource {
    Detail,
    Credits,
}

impl SwrResource {
    fn prefix(self) -> &'static str {
        match self {
            Self::Detail => "pod",
            Self::Credits => "credits",
        }
    }

    pub fn main_key(self, id: &str) -> String {
        format!("{}:{}", self.prefix(), id)
    }

    pub fn fresh_key(self, id: &str) -> String {
        format!("{}:{}:fresh", self.prefix(), id)
    }
}

/// Result of reading both keys of a resource.
#[derive(Debug, Clone, PartialEq)]
pub enum SwrRead<T> {
    /// Payload present and within its freshness window.
    Fresh(T),
    /// Payload present but its sentinel has expired.
    Stale(T),
    /// No usable payload.
    Miss,
}

/// Reads and writes the main/fresh key pair.
#[derive(Clone)]
pub struct SwrCache {
    cache: Arc<dyn CacheStore>,
    main_ttl: Duration,
    fresh_ttl: Duration,
}

impl SwrCache {
    pub fn new(cache: Arc<dyn CacheStore>, main_ttl: Duration, fresh_ttl: Duration) -> Self {
        Self {
            cache,
            main_ttl,
            fresh_ttl,
        }
    }

    pub async fn read<T: DeserializeOwned>(&self, resource: SwrResource, id: &str) -> SwrRead<T> {
        let main_key = resource.main_key(id);
        let Some(raw) = self.cache.get(&main_key).await else {
            return SwrRead::Miss;
        };

        let payload = match serde_json::from_value(raw) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key = %main_key, error = %e, "Unreadable cached payload, treating as miss");
                return SwrRead::Miss;
            }
        };

        if self.cache.get(&resource.fresh_key(id)).await.is_some() {
            SwrRead::Fresh(payload)
        } else {
            SwrRead::Stale(payload)
        }
    }

    /// Write the payload, then the sentinel.
    ///
    /// The two writes are independent; if the second never lands the payload
    /// simply reads as stale.
    pub async fn write<T: Serialize>(&self, resource: SwrResource, id: &str, payload: &T) -> Result<()> {
        let value = serde_json::to_value(payload)
            .map_err(|e| Error::internal(format!("Failed to serialize payload: {e}")))?;

        self.cache.set(&resource.main_key(id), value, self.main_ttl).await;
        self.cache
            .set(&resource.fresh_key(id), Value::Bool(true), self.fresh_ttl)
            .await;

        info!(
            id = %id,
            resource = ?resource,
            main_ttl_secs = self.main_ttl.as_secs(),
            fresh_ttl_secs = self.fresh_ttl.as_secs(),
            "Primed main and fresh keys"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Hydration
// ---------------------------------------------------------------------------

/// Fetches base records from the primary provider and enriches them from the
/// secondary. Shared by the request path and the background refresher.
#[derive(Clone)]
pub struct Hydrator {
    primary: Arc<dyn PodcastProvider>,
    secondary: Arc<dyn PodcastProvider>,
}

impl Hydrator {
    pub fn new(primary: Arc<dyn PodcastProvider>, secondary: Arc<dyn PodcastProvider>) -> Self {
        Self { primary, secondary }
    }

    pub fn from_registry(registry: &ProviderRegistry) -> Self {
        Self::new(
            registry.get(PRIMARY_PROVIDER),
            registry.get(SECONDARY_PROVIDER),
        )
    }

    /// Search query for an identifier: separators become spaces.
    pub fn derive_query(id: &str) -> String {
        id.replace(['-', '_'], " ")
    }

    /// Base record for `id`, enriched with rating and credits when available.
    ///
    /// `None` when the primary provider finds nothing. Primary failures are
    /// returned; secondary failures only degrade the record.
    pub async fn fetch_detail(&self, id: &str) -> ProviderResult<Option<NormalizedPodcast>> {
        let query = Self::derive_query(id);
        let Some(mut base) = self.primary.search(&query, 1).await?.into_iter().next() else {
            warn!(id = %id, provider = %self.primary.kind(), "Primary provider returned nothing");
            return Ok(None);
        };

        self.hydrate(&mut base, &query).await;
        Ok(Some(base))
    }

    async fn hydrate(&self, base: &mut NormalizedPodcast, query: &str) {
        match self.secondary.search(query, 1).await {
            Ok(results) => {
                let Some(enrichment) = results.into_iter().next() else {
                    return;
                };
                if base.rating.is_none() {
                    base.rating = enrichment.rating;
                }
                base.credits = Some(enrichment.credits.unwrap_or_default());
                info!(
                    rating = ?base.rating,
                    credits = base.credits.as_ref().map_or(0, Vec::len),
                    "Hydrated record"
                );
            }
            Err(e) => {
                warn!(
                    provider = %e.provider(),
                    error = %e,
                    "Hydration failed, returning primary data only"
                );
            }
        }
    }

    /// Credits for `id` from the secondary provider.
    ///
    /// `None` when the secondary provider has no matching podcast.
    pub async fn fetch_credits(&self, id: &str) -> ProviderResult<Option<Vec<Credit>>> {
        let query = Self::derive_query(id);
        let Some(found) = self.secondary.search(&query, 1).await?.into_iter().next() else {
            return Ok(None);
        };
        self.secondary.get_credits(&found.remote_id).await.map(Some)
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Detail and credits lookups with stale-while-revalidate caching.
pub struct DetailService {
    swr: SwrCache,
    hydrator: Hydrator,
    dispatcher: Arc<dyn RefreshDispatcher>,
}

impl DetailService {
    pub fn new(swr: SwrCache, hydrator: Hydrator, dispatcher: Arc<dyn RefreshDispatcher>) -> Self {
        Self {
            swr,
            hydrator,
            dispatcher,
        }
    }

    /// Hydrated record for `id`, or `None` when the primary provider has
    /// nothing (in which case nothing is cached).
    pub async fn get_detail(&self, id: &str) -> Result<Option<NormalizedPodcast>> {
        match self.swr.read(SwrResource::Detail, id).await {
            SwrRead::Fresh(payload) => {
                info!(id = %id, "Detail FRESH hit");
                Ok(Some(payload))
            }
            SwrRead::Stale(payload) => {
                info!(id = %id, "Detail STALE, serving cached data and dispatching refresh");
                self.dispatch(RefreshTask::Detail(id.to_string()));
                Ok(Some(payload))
            }
            SwrRead::Miss => {
                info!(id = %id, "Detail COLD miss, fetching synchronously");
                let Some(payload) = self.hydrator.fetch_detail(id).await? else {
                    return Ok(None);
                };
                self.swr.write(SwrResource::Detail, id, &payload).await?;
                Ok(Some(payload))
            }
        }
    }

    /// Credits for `id`. Provider failures degrade to an empty list.
    pub async fn get_credits(&self, id: &str) -> Result<CreditsPayload> {
        match self.swr.read(SwrResource::Credits, id).await {
            SwrRead::Fresh(payload) => {
                info!(id = %id, "Credits FRESH hit");
                Ok(payload)
            }
            SwrRead::Stale(payload) => {
                info!(id = %id, "Credits STALE, serving cached data and dispatching refresh");
                self.dispatch(RefreshTask::Credits(id.to_string()));
                Ok(payload)
            }
            SwrRead::Miss => {
                info!(id = %id, "Credits COLD miss, fetching synchronously");
                let credits = match self.hydrator.fetch_credits(id).await {
                    Ok(credits) => credits.unwrap_or_default(),
                    Err(e) => {
                        warn!(id = %id, error = %e, "Credits fetch failed, caching empty credits");
                        Vec::new()
                    }
                };
                let payload = CreditsPayload::new(id, credits);
                self.swr.write(SwrResource::Credits, id, &payload).await?;
                Ok(payload)
            }
        }
    }

    fn dispatch(&self, task: RefreshTask) {
        if let Err(e) = self.dispatcher.dispatch(task.clone()) {
            warn!(task = %task, error = %e, "Could not dispatch refresh task");
        }
    }
}
