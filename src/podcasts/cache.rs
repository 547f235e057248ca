//! Key/value cache with per-entry TTL.
//!
//! [`CacheStore`] is the contract the services depend on: plain `get`/`set`
//! for the stale-while-revalidate dual keys, and [`CacheStore::get_or_compute`]
//! for cache-aside reads. [`MemoryCache`] is the in-process backend; its
//! `get_or_compute` is single-flight per key, so concurrent misses on the same
//! key run the computation once.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use futures::future::BoxFuture;
use podvault_common::Result;
use serde_json::Value;
use tokio::sync::OnceCell;
use tokio::time::Instant;
use tracing::debug;

/// Outcome of a read-or-compute lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup<T> {
    /// The value was already cached.
    Hit(T),
    /// The value was missing; it was computed and stored.
    Computed(T),
}

impl<T> CacheLookup<T> {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Hit(v) | Self::Computed(v) => v,
        }
    }
}

/// Shared key/value store with TTL semantics.
///
/// Values are JSON so any backend (in-memory, Redis, ...) can hold them.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Return the live value under `key`, if any.
    async fn get(&self, key: &str) -> Option<Value>;

    /// Store `value` under `key` for `ttl`, replacing any previous value.
    async fn set(&self, key: &str, value: Value, ttl: Duration);

    /// Remove `key`.
    async fn delete(&self, key: &str);

    /// Return the cached value, or run `compute`, store its output and return it.
    ///
    /// A failed computation stores nothing. This default is not atomic:
    /// concurrent misses may each run `compute`. Backends with an atomic
    /// primitive should override it.
    async fn get_or_compute<'a>(
        &'a self,
        key: &'a str,
        ttl: Duration,
        compute: BoxFuture<'a, Result<Value>>,
    ) -> Result<CacheLookup<Value>> {
        if let Some(value) = self.get(key).await {
            return Ok(CacheLookup::Hit(value));
        }
        let value = compute.await?;
        self.set(key, value.clone(), ttl).await;
        Ok(CacheLookup::Computed(value))
    }
}

/// Entry in the memory cache.
struct CacheEntry {
    value: Value,
    expires_at: Instant,
    last_accessed: Instant,
}

/// Outcome of one in-flight computation, shared by every caller waiting on
/// the same key.
type Flight = OnceCell<Result<Value>>;

/// Removes a key's flight once it is settled or nobody else holds it.
///
/// Runs on success, on error and when the caller's future is dropped
/// mid-computation.
struct FlightGuard<'a> {
    inflight: &'a DashMap<String, Arc<Flight>>,
    key: &'a str,
    flight: Arc<Flight>,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        // The map and this guard hold two references; any more belong to
        // waiters, one of which takes over an abandoned computation.
        self.inflight.remove_if(self.key, |_, flight| {
            Arc::ptr_eq(flight, &self.flight)
                && (flight.initialized() || Arc::strong_count(flight) <= 2)
        });
    }
}

/// Thread-safe in-memory [`CacheStore`].
///
/// When full, the least recently used entry is evicted. Reads refresh the
/// access time, so an SWR payload and its freshness sentinel age together.
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
    inflight: DashMap<String, Arc<Flight>>,
    max_entries: usize,
}

impl MemoryCache {
    /// Create a cache holding at most `max_entries` live entries.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            inflight: DashMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove expired entries.
    pub fn cleanup_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
    }

    /// Remaining lifetime of `key`, if it is live.
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.entries
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.expires_at - now)
    }

    fn evict_least_recently_used(&self) {
        let victim = self
            .entries
            .iter()
            .min_by_key(|entry| entry.last_accessed)
            .map(|entry| entry.key().clone());

        if let Some(key) = victim {
            debug!(key = %key, "Cache full, evicting least recently used entry");
            self.entries.remove(&key);
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        if let Some(mut entry) = self.entries.get_mut(key) {
            if entry.expires_at > now {
                entry.last_accessed = now;
                return Some(entry.value.clone());
            }
        }
        self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        None
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) {
        if !self.entries.contains_key(key) && self.entries.len() >= self.max_entries {
            self.cleanup_expired();
            if self.entries.len() >= self.max_entries {
                self.evict_least_recently_used();
            }
        }

        let now = Instant::now();
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: now + ttl,
                last_accessed: now,
            },
        );
    }

    async fn delete(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Single-flight per key: concurrent misses share one computation and
    /// all receive its outcome, success or error. If the computing caller is
    /// dropped, a waiting caller runs its own `compute` instead.
    async fn get_or_compute<'a>(
        &'a self,
        key: &'a str,
        ttl: Duration,
        compute: BoxFuture<'a, Result<Value>>,
    ) -> Result<CacheLookup<Value>> {
        if let Some(value) = self.get(key).await {
            return Ok(CacheLookup::Hit(value));
        }

        let guard = FlightGuard {
            inflight: &self.inflight,
            key,
            flight: Arc::clone(&self.inflight.entry(key.to_string()).or_default()),
        };

        let mut computed_here = false;
        let outcome = guard
            .flight
            .get_or_init(|| {
                computed_here = true;
                async move {
                    let result = compute.await;
                    if let Ok(value) = &result {
                        self.set(key, value.clone(), ttl).await;
                    }
                    result
                }
            })
            .await
            .clone();

        let value = outcome?;
        Ok(if computed_here {
            CacheLookup::Computed(value)
        } else {
            CacheLookup::Hit(value)
        })
    }
}
