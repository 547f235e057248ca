//! Multi-provider podcast lookups with a stale-while-revalidate cache.
//!
//! Search goes to exactly one provider and is cached per
//! `(provider, query, limit)`. Detail and credits lookups combine a primary
//! and a secondary provider and are served from a two-key SWR cache, with
//! stale entries refreshed by a background queue.
//!
//! # Module layout
//!
//! - [`provider`] -- Provider trait and the normalized podcast/credit types.
//! - [`providers`] -- iTunes, Taddy and Podchaser clients.
//! - [`registry`] -- Name-to-provider lookup.
//! - [`cache`] -- Cache store trait and the in-memory implementation.
//! - [`rate_limiter`] -- Token-bucket limiter shared across iTunes calls.
//! - [`search`] -- Cached single-provider search.
//! - [`detail`] -- SWR cache, hydration and the detail/credits read path.
//! - [`refresh`] / [`queue`] -- Background refresh tasks and their worker.
//! - [`catalog`] -- Caller-facing facade with input validation.

pub mod cache;
pub mod catalog;
pub mod detail;
pub mod provider;
pub mod providers;
pub mod queue;
pub mod rate_limiter;
pub mod refresh;
pub mod registry;
pub mod search;

#[cfg(test)]
mod testing;

pub use cache::{CacheLookup, CacheStore, MemoryCache};
pub use catalog::{PodcastCatalog, SearchResponse};
pub use detail::{CreditsPayload, DetailService, Hydrator, SwrCache, SwrRead, SwrResource};
pub use provider::{
    Credit, CreditEpisode, CreditPerson, NormalizedPodcast, PodcastProvider, ProviderResult,
};
pub use queue::{RefreshQueue, RetryPolicy};
pub use rate_limiter::RateLimiter;
pub use refresh::{BackgroundRefresher, RefreshDispatcher, RefreshOutcome, RefreshTask};
pub use registry::ProviderRegistry;
pub use search::{search_cache_key, SearchService};
