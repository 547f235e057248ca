//! Trait definition and types for podcast providers.
//!
//! This module defines the [`PodcastProvider`] trait that every upstream
//! backend (iTunes, Taddy, Podchaser) implements, along with the
//! provider-agnostic [`NormalizedPodcast`] record they all produce.

use async_trait::async_trait;
use podvault_common::{ProviderError, ProviderKind};
use serde::{Deserialize, Serialize};

/// Result alias for provider calls; every failure is a [`ProviderError`].
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

// ---------------------------------------------------------------------------
// Normalized record
// ---------------------------------------------------------------------------

/// The canonical, provider-agnostic podcast shape.
///
/// String fields may be empty but are always present. Optional fields are
/// serialized as `null` when unset, never omitted, so every serialized record
/// carries the full key set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPodcast {
    /// Provider that produced this record.
    pub provider: ProviderKind,
    /// Identifier within `provider`'s namespace (not globally unique).
    pub remote_id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub cover_url: String,
    pub rss_feed: String,
    pub genre: String,
    pub total_episodes: u32,
    /// Average rating (0.0 - 5.0), populated by Podchaser hydration.
    pub rating: Option<f64>,
    /// `None` means "not hydrated yet"; an empty list means "hydrated, no credits".
    pub credits: Option<Vec<Credit>>,
    pub website: Option<String>,
}

impl NormalizedPodcast {
    /// Build a record with the required fields and every optional field unset.
    pub fn new(provider: ProviderKind, remote_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            provider,
            remote_id: remote_id.into(),
            title: title.into(),
            author: String::new(),
            description: String::new(),
            cover_url: String::new(),
            rss_feed: String::new(),
            genre: String::new(),
            total_episodes: 0,
            rating: None,
            credits: None,
            website: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Credits
// ---------------------------------------------------------------------------

/// A person credited on a podcast (host, guest, producer...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credit {
    pub person: CreditPerson,
    /// Role title, e.g. "Host" or "Guest".
    pub role: String,
    /// Episode the credit applies to, when it is episode-scoped.
    pub episode: Option<CreditEpisode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditPerson {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditEpisode {
    pub id: String,
    pub title: String,
    pub air_date: Option<String>,
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// Async trait that all podcast providers must implement.
///
/// Each provider wraps a single external API and maps its responses into
/// [`NormalizedPodcast`]. Transport, HTTP and GraphQL failures must be
/// translated into exactly one [`ProviderError`] kind before they leave the
/// provider.
///
/// Providers are shared behind an `Arc` across request and background tasks.
#[async_trait]
pub trait PodcastProvider: Send + Sync {
    /// Which provider this is.
    fn kind(&self) -> ProviderKind;

    /// Free-text search.
    ///
    /// Ordering is provider-defined. Zero matches is an empty list, not an
    /// error.
    async fn search(&self, query: &str, limit: usize) -> ProviderResult<Vec<NormalizedPodcast>>;

    /// Exact lookup by provider-scoped ID; `None` when the ID is unknown.
    async fn get_by_id(&self, id: &str) -> ProviderResult<Option<NormalizedPodcast>>;

    /// Credits for the podcast identified by `id`.
    ///
    /// Providers without a credits graph return an empty list.
    async fn get_credits(&self, _id: &str) -> ProviderResult<Vec<Credit>> {
        Ok(Vec::new())
    }
}
