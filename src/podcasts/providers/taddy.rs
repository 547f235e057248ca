//! Taddy GraphQL API provider.
//!
//! Taddy owns a deep podcast index with episode-level metadata. Requests are
//! authenticated with two static headers (`X-USER-ID`, `X-API-KEY`); there is
//! no token exchange and no client-side rate limiting.

use std::time::Duration;

use async_trait::async_trait;
use podvault_common::{ProviderError, ProviderKind};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info, warn};

use super::graphql::GraphQlResponse;
use crate::config::TaddyConfig;
use crate::podcasts::provider::{NormalizedPodcast, PodcastProvider, ProviderResult};

const MAX_LIMIT: usize = 25;

const SEARCH_QUERY: &str = r#"
query SearchPodcasts($term: String!, $limitPerPage: Int) {
  getPodcastSeries(name: $term, limitPerPage: $limitPerPage) {
    podcastSeries {
      uuid name description imageUrl rssUrl itunesId episodeCount language rating
      categories { name }
      author { name }
    }
  }
}
"#;

const LOOKUP_QUERY: &str = r#"
query GetPodcast($uuid: ID!) {
  getPodcastSeries(uuid: $uuid) {
    podcastSeries {
      uuid name description imageUrl rssUrl itunesId episodeCount language rating
      categories { name }
      author { name }
    }
  }
}
"#;

// ---------------------------------------------------------------------------
// Taddy response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TaddyData {
    #[serde(rename = "getPodcastSeries")]
    get_podcast_series: Option<TaddySeriesList>,
}

#[derive(Debug, Deserialize)]
struct TaddySeriesList {
    #[serde(rename = "podcastSeries", default)]
    podcast_series: Option<Vec<TaddySeries>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaddySeries {
    uuid: Option<String>,
    name: Option<String>,
    description: Option<String>,
    image_url: Option<String>,
    rss_url: Option<String>,
    episode_count: Option<u32>,
    categories: Option<Vec<TaddyCategory>>,
    author: Option<TaddyAuthor>,
}

#[derive(Debug, Deserialize)]
struct TaddyCategory {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TaddyAuthor {
    name: Option<String>,
}

impl TaddyData {
    fn into_series(self) -> Vec<TaddySeries> {
        self.get_podcast_series
            .and_then(|list| list.podcast_series)
            .unwrap_or_default()
    }
}

impl TaddySeries {
    fn into_podcast(self) -> NormalizedPodcast {
        let genre = self
            .categories
            .and_then(|cats| cats.into_iter().next())
            .and_then(|cat| cat.name)
            .unwrap_or_default();

        NormalizedPodcast {
            provider: ProviderKind::Taddy,
            remote_id: self.uuid.unwrap_or_default(),
            title: self.name.unwrap_or_default(),
            author: self.author.and_then(|a| a.name).unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            cover_url: self.image_url.unwrap_or_default(),
            rss_feed: self.rss_url.unwrap_or_default(),
            genre,
            total_episodes: self.episode_count.unwrap_or(0),
            rating: None,
            credits: None,
            website: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Provider implementation
// ---------------------------------------------------------------------------

/// Taddy podcast provider.
pub struct TaddyProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    user_id: String,
}

impl TaddyProvider {
    pub fn new(config: &TaddyConfig) -> Self {
        if config.api_key.is_empty() || config.user_id.is_empty() {
            warn!(provider = "taddy", "API key or user ID not set, requests may fail");
        }
        Self {
            client: super::http_client(Duration::from_secs(config.timeout_secs)),
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            user_id: config.user_id.clone(),
        }
    }

    /// Execute a GraphQL request and return its `data` payload.
    async fn post(&self, payload: serde_json::Value) -> ProviderResult<TaddyData> {
        let resp = self
            .client
            .post(&self.endpoint)
            .header("X-USER-ID", &self.user_id)
            .header("X-API-KEY", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| unavailable(format!("Taddy request failed: {e}")))?;

        if resp.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::rate_limited(
                ProviderKind::Taddy,
                "Taddy returned 429 Too Many Requests.",
            ));
        }
        if !resp.status().is_success() {
            return Err(unavailable(format!(
                "Taddy request failed with HTTP {}",
                resp.status()
            )));
        }

        let body: GraphQlResponse<TaddyData> = resp
            .json()
            .await
            .map_err(|e| unavailable(format!("Failed to parse Taddy response: {e}")))?;

        if let Some(message) = body.first_error() {
            error!(provider = "taddy", message = %message, "GraphQL error");
            return Err(unavailable(format!("Taddy GraphQL error: {message}")));
        }

        body.data
            .ok_or_else(|| unavailable("Taddy response carried no data".to_string()))
    }
}

fn unavailable(message: String) -> ProviderError {
    ProviderError::unavailable(ProviderKind::Taddy, message)
}

#[async_trait]
impl PodcastProvider for TaddyProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Taddy
    }

    async fn search(&self, query: &str, limit: usize) -> ProviderResult<Vec<NormalizedPodcast>> {
        debug!(query = %query, limit, "Taddy search");
        let payload = json!({
            "query": SEARCH_QUERY,
            "variables": {"term": query, "limitPerPage": limit.min(MAX_LIMIT)},
        });

        let series = self.post(payload).await?.into_series();
        info!(provider = "taddy", query = %query, count = series.len(), "Search complete");

        Ok(series.into_iter().map(TaddySeries::into_podcast).collect())
    }

    async fn get_by_id(&self, id: &str) -> ProviderResult<Option<NormalizedPodcast>> {
        let payload = json!({
            "query": LOOKUP_QUERY,
            "variables": {"uuid": id},
        });

        let found = self.post(payload).await?.into_series().into_iter().next();
        if found.is_none() {
            warn!(provider = "taddy", id = %id, "Lookup returned no results");
        }
        Ok(found.map(TaddySeries::into_podcast))
    }
}
