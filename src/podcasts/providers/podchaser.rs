//! Podchaser GraphQL API provider: ratings, social data and guest credits.
//!
//! Authentication is OAuth2 client-credentials performed through the
//! `requestAccessToken` GraphQL mutation. Tokens live a year and are cached
//! per credential pair under `pc_token:<index>`, so the mutation fires at most
//! once per pair per cache TTL.
//!
//! Several `key:secret` pairs can be configured. When the current pair's
//! monthly quota is spent (HTTP 402/403, or a GraphQL error mentioning
//! "quota" or "limit") the same request is replayed under the next pair.
//! When every pair is spent the cursor goes back to where the call started
//! and [`ProviderError::QuotaExhausted`] is returned. HTTP 429 is surfaced
//! immediately with no rotation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use podvault_common::{Error, ProviderError, ProviderKind};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use super::credentials::{CredentialPair, CredentialRotator};
use super::graphql::{GraphQlResponse, Page};
use crate::config::PodchaserConfig;
use crate::podcasts::cache::CacheStore;
use crate::podcasts::provider::{
    Credit, CreditEpisode, CreditPerson, NormalizedPodcast, PodcastProvider, ProviderResult,
};

const MAX_LIMIT: usize = 50;

const AUTH_MUTATION: &str = r#"
mutation RequestToken($clientId: String!, $clientSecret: String!) {
  requestAccessToken(
    input: { grant_type: CLIENT_CREDENTIALS, client_id: $clientId, client_secret: $clientSecret }
  ) {
    access_token
    token_type
    expires_in
  }
}
"#;

const SEARCH_QUERY: &str = r#"
query SearchPodcasts($term: String!, $maxResults: Int) {
  podcasts(searchTerm: $term, first: $maxResults) {
    data {
      id title description imageUrl rssUrl htmlUrl author
      rating { averageRating reviewsCount }
      categories(first: 1) { data { title } }
      podcastEpisodes { paginatorInfo { total } }
    }
  }
}
"#;

const LOOKUP_QUERY: &str = r#"
query GetPodcast($id: ID!) {
  podcast(identifier: { id: $id, type: PODCHASER_ID }) {
    id title description imageUrl rssUrl htmlUrl author
    rating { averageRating reviewsCount }
    categories(first: 1) { data { title } }
    podcastEpisodes { paginatorInfo { total } }
    credits {
      data {
        person { id name imageUrl }
        role { title }
        episode { id title }
      }
    }
  }
}
"#;

const CREDITS_QUERY: &str = r#"
query GetCredits($id: ID!) {
  podcast(identifier: { id: $id, type: PODCHASER_ID }) {
    credits {
      data {
        person { id name imageUrl biography }
        role { title }
        episode { id title airDate }
      }
    }
  }
}
"#;

/// Cache key holding the access token of credential pair `index`.
pub fn token_cache_key(index: usize) -> String {
    format!("pc_token:{index}")
}

// ---------------------------------------------------------------------------
// Podchaser response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthData {
    request_access_token: Option<AccessToken>,
}

#[derive(Debug, Deserialize)]
struct AccessToken {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    podcasts: Option<Page<PcPodcast>>,
}

#[derive(Debug, Deserialize)]
struct LookupData {
    podcast: Option<PcPodcast>,
}

#[derive(Debug, Deserialize)]
struct CreditsData {
    podcast: Option<PcCreditsOnly>,
}

#[derive(Debug, Deserialize)]
struct PcCreditsOnly {
    credits: Option<Page<PcCredit>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PcPodcast {
    id: Option<Value>,
    title: Option<String>,
    description: Option<String>,
    image_url: Option<String>,
    rss_url: Option<String>,
    html_url: Option<String>,
    author: Option<String>,
    rating: Option<PcRating>,
    categories: Option<Page<PcCategory>>,
    podcast_episodes: Option<PcEpisodeCount>,
    credits: Option<Page<PcCredit>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PcRating {
    average_rating: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PcCategory {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PcEpisodeCount {
    paginator_info: Option<PcPaginator>,
}

#[derive(Debug, Deserialize)]
struct PcPaginator {
    total: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct PcCredit {
    person: Option<PcPerson>,
    role: Option<PcRole>,
    episode: Option<PcEpisode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PcPerson {
    id: Option<Value>,
    name: Option<String>,
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PcRole {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PcEpisode {
    id: Option<Value>,
    title: Option<String>,
    air_date: Option<String>,
}

/// Podchaser IDs arrive as strings or numbers depending on the field.
fn id_string(id: Option<Value>) -> String {
    match id {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

impl PcPodcast {
    fn into_podcast(self) -> NormalizedPodcast {
        let genre = self
            .categories
            .and_then(|page| page.data.into_iter().next())
            .and_then(|cat| cat.title)
            .unwrap_or_default();
        let total_episodes = self
            .podcast_episodes
            .and_then(|eps| eps.paginator_info)
            .and_then(|info| info.total)
            .unwrap_or(0);

        NormalizedPodcast {
            provider: ProviderKind::Podchaser,
            remote_id: id_string(self.id),
            title: self.title.unwrap_or_default(),
            author: self.author.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            cover_url: self.image_url.unwrap_or_default(),
            rss_feed: self.rss_url.unwrap_or_default(),
            genre,
            total_episodes,
            rating: self.rating.and_then(|r| r.average_rating),
            credits: self.credits.map(|page| convert_credits(page.data)),
            website: self.html_url,
        }
    }
}

fn convert_credits(raw: Vec<PcCredit>) -> Vec<Credit> {
    raw.into_iter()
        .filter_map(|credit| {
            let person = credit.person?;
            Some(Credit {
                person: CreditPerson {
                    id: id_string(person.id),
                    name: person.name.unwrap_or_default(),
                    image: person.image_url,
                },
                role: credit.role.and_then(|r| r.title).unwrap_or_default(),
                episode: credit.episode.map(|ep| CreditEpisode {
                    id: id_string(ep.id),
                    title: ep.title.unwrap_or_default(),
                    air_date: ep.air_date,
                }),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Provider implementation
// ---------------------------------------------------------------------------

/// Podchaser podcast provider with credential rotation.
pub struct PodchaserProvider {
    client: reqwest::Client,
    endpoint: String,
    rotator: CredentialRotator,
    cache: Arc<dyn CacheStore>,
    token_ttl: Duration,
}

impl PodchaserProvider {
    /// Create a provider whose tokens are cached in `cache`.
    pub fn new(config: &PodchaserConfig, cache: Arc<dyn CacheStore>) -> Self {
        let rotator = CredentialRotator::from_config_string(&config.credentials);
        if rotator.is_empty() {
            warn!(
                provider = "podchaser",
                "No credentials configured, all requests will fail. \
                 Set them as key1:secret1,key2:secret2"
            );
        }
        Self {
            client: super::http_client(Duration::from_secs(config.timeout_secs)),
            endpoint: config.endpoint.clone(),
            rotator,
            cache,
            token_ttl: Duration::from_secs(config.token_ttl_secs),
        }
    }

    /// Index of the credential pair the next request starts with.
    pub fn current_credential_index(&self) -> usize {
        self.rotator.current_index()
    }

    pub fn credential_count(&self) -> usize {
        self.rotator.len()
    }

    /// Exchange a key/secret pair for a bearer token.
    async fn exchange_token(&self, pair: &CredentialPair) -> ProviderResult<String> {
        let payload = json!({
            "query": AUTH_MUTATION,
            "variables": {"clientId": pair.key, "clientSecret": pair.secret},
        });

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| unavailable(format!("Podchaser token exchange failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(unavailable(format!(
                "Podchaser token exchange failed with HTTP {}",
                resp.status()
            )));
        }

        let body: GraphQlResponse<AuthData> = resp
            .json()
            .await
            .map_err(|e| unavailable(format!("Failed to parse Podchaser auth response: {e}")))?;

        if let Some(message) = body.first_error() {
            return Err(unavailable(format!("Podchaser auth mutation error: {message}")));
        }

        let token = body
            .data
            .and_then(|d| d.request_access_token)
            .and_then(|t| t.access_token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| unavailable("Podchaser returned empty access_token.".to_string()))?;

        info!(provider = "podchaser", key = %pair.key_hint(), "Exchanged credentials for a new token");
        Ok(token)
    }

    /// Access token for pair `index`, from the cache or a fresh exchange.
    async fn token(&self, index: usize) -> ProviderResult<String> {
        let pair = self
            .rotator
            .pair(index)
            .ok_or_else(|| unavailable(format!("No credential pair at index {index}")))?;
        let cache_key = token_cache_key(index);

        let lookup = self
            .cache
            .get_or_compute(
                &cache_key,
                self.token_ttl,
                Box::pin(async move {
                    self.exchange_token(pair)
                        .await
                        .map(Value::String)
                        .map_err(Error::from)
                }),
            )
            .await
            .map_err(|e| match e {
                Error::Provider(err) => err,
                other => unavailable(format!("Token cache failed: {other}")),
            })?;

        match lookup.into_inner() {
            Value::String(token) if !token.is_empty() => Ok(token),
            _ => {
                self.cache.delete(&cache_key).await;
                Err(unavailable("Cached Podchaser token is malformed".to_string()))
            }
        }
    }

    /// Single GraphQL POST under credential pair `index`.
    async fn post<T: DeserializeOwned>(&self, index: usize, payload: &Value) -> ProviderResult<T> {
        let token = self.token(index).await?;

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(payload)
            .send()
            .await
            .map_err(|e| unavailable(format!("Podchaser request failed: {e}")))?;

        let status = resp.status();
        if status == StatusCode::PAYMENT_REQUIRED || status == StatusCode::FORBIDDEN {
            return Err(ProviderError::quota_exhausted(
                ProviderKind::Podchaser,
                format!(
                    "Podchaser quota exceeded for current credential pair (HTTP {}).",
                    status.as_u16()
                ),
            ));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::rate_limited(
                ProviderKind::Podchaser,
                "Podchaser returned 429 Too Many Requests.",
            ));
        }
        if !status.is_success() {
            return Err(unavailable(format!("Podchaser request failed with HTTP {status}")));
        }

        let body: GraphQlResponse<T> = resp
            .json()
            .await
            .map_err(|e| unavailable(format!("Failed to parse Podchaser response: {e}")))?;

        if let Some(message) = body.first_error() {
            error!(provider = "podchaser", message = %message, "GraphQL error");
            let lower = message.to_lowercase();
            if lower.contains("quota") || lower.contains("limit") {
                return Err(ProviderError::quota_exhausted(ProviderKind::Podchaser, message));
            }
            return Err(unavailable(message.to_string()));
        }

        body.data
            .ok_or_else(|| unavailable("Podchaser response carried no data".to_string()))
    }

    /// POST `payload`, sweeping forward through credential pairs on quota errors.
    async fn post_with_rotation<T: DeserializeOwned>(&self, payload: &Value) -> ProviderResult<T> {
        if self.rotator.is_empty() {
            return Err(ProviderError::quota_exhausted(
                ProviderKind::Podchaser,
                "No Podchaser credentials configured.",
            ));
        }

        let start = self.rotator.current_index().min(self.rotator.len() - 1);
        let mut index = start;

        loop {
            match self.post(index, payload).await {
                Err(e) if e.is_quota_exhausted() => match self.rotator.advance(index) {
                    Some(next) => {
                        warn!(
                            provider = "podchaser",
                            pair = next + 1,
                            total = self.rotator.len(),
                            "Credential rotated"
                        );
                        index = next;
                    }
                    None => {
                        error!(provider = "podchaser", "All credential pairs exhausted");
                        self.rotator.reset(start);
                        return Err(ProviderError::quota_exhausted(
                            ProviderKind::Podchaser,
                            "All Podchaser credential pairs have reached their monthly quota.",
                        ));
                    }
                },
                other => return other,
            }
        }
    }
}

fn unavailable(message: String) -> ProviderError {
    ProviderError::unavailable(ProviderKind::Podchaser, message)
}

#[async_trait]
impl PodcastProvider for PodchaserProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Podchaser
    }

    async fn search(&self, query: &str, limit: usize) -> ProviderResult<Vec<NormalizedPodcast>> {
        debug!(query = %query, limit, "Podchaser search");
        let payload = json!({
            "query": SEARCH_QUERY,
            "variables": {"term": query, "maxResults": limit.min(MAX_LIMIT)},
        });

        let data: SearchData = self.post_with_rotation(&payload).await?;
        let items = data.podcasts.map(|page| page.data).unwrap_or_default();
        info!(provider = "podchaser", query = %query, count = items.len(), "Search complete");

        Ok(items.into_iter().map(PcPodcast::into_podcast).collect())
    }

    async fn get_by_id(&self, id: &str) -> ProviderResult<Option<NormalizedPodcast>> {
        let payload = json!({
            "query": LOOKUP_QUERY,
            "variables": {"id": id},
        });

        let data: LookupData = self.post_with_rotation(&payload).await?;
        if data.podcast.is_none() {
            warn!(provider = "podchaser", id = %id, "Lookup returned no results");
        }
        Ok(data.podcast.map(PcPodcast::into_podcast))
    }

    async fn get_credits(&self, id: &str) -> ProviderResult<Vec<Credit>> {
        let payload = json!({
            "query": CREDITS_QUERY,
            "variables": {"id": id},
        });

        let data: CreditsData = self.post_with_rotation(&payload).await?;
        let raw = data
            .podcast
            .and_then(|p| p.credits)
            .map(|page| page.data)
            .unwrap_or_default();
        Ok(convert_credits(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::podcasts::cache::MemoryCache;
    use wiremock::matchers::{body_partial_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DAY: Duration = Duration::from_secs(86_400);

    fn config(server: &MockServer, credentials: &str) -> PodchaserConfig {
        PodchaserConfig {
            endpoint: server.uri(),
            credentials: credentials.to_string(),
            timeout_secs: 5,
            ..PodchaserConfig::default()
        }
    }

    async fn seeded_cache(tokens: &[&str]) -> Arc<MemoryCache> {
        let cache = Arc::new(MemoryCache::new(100));
        for (i, token) in tokens.iter().enumerate() {
            cache.set(&token_cache_key(i), json!(token), DAY).await;
        }
        cache
    }

    fn search_body() -> Value {
        json!({
            "data": {
                "podcasts": {
                    "data": [{
                        "id": "778899",
                        "title": "Vault Cast",
                        "author": "Vault Media",
                        "imageUrl": "https://img.example.com/pc.jpg",
                        "rssUrl": "https://rss.example.com/feed",
                        "htmlUrl": "https://vaultcast.example.com",
                        "rating": {"averageRating": 4.6, "reviewsCount": 12},
                        "categories": {"data": [{"title": "Technology"}]},
                        "podcastEpisodes": {"paginatorInfo": {"total": 55}}
                    }]
                }
            }
        })
    }

    #[tokio::test]
    async fn search_normalizes_and_uses_cached_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("Authorization", "Bearer tok-a"))
            .and(body_partial_json(json!({"variables": {"term": "vault", "maxResults": 50}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
            .expect(1)
            .mount(&server)
            .await;

        let cache = seeded_cache(&["tok-a"]).await;
        let provider = PodchaserProvider::new(&config(&server, "key1:secret1"), cache);

        let results = provider.search("vault", 500).await.unwrap();
        assert_eq!(results.len(), 1);
        let pod = &results[0];
        assert_eq!(pod.provider, ProviderKind::Podchaser);
        assert_eq!(pod.remote_id, "778899");
        assert_eq!(pod.rating, Some(4.6));
        assert_eq!(pod.genre, "Technology");
        assert_eq!(pod.total_episodes, 55);
        assert_eq!(pod.website.as_deref(), Some("https://vaultcast.example.com"));
        // Search results carry no credits field.
        assert!(pod.credits.is_none());
    }

    #[tokio::test]
    async fn quota_error_rotates_to_next_pair() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("Authorization", "Bearer tok-a"))
            .respond_with(ResponseTemplate::new(402))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(header("Authorization", "Bearer tok-b"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
            .expect(1)
            .mount(&server)
            .await;

        let cache = seeded_cache(&["tok-a", "tok-b"]).await;
        let provider = PodchaserProvider::new(&config(&server, "k1:s1,k2:s2"), cache);

        let results = provider.search("vault", 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(provider.current_credential_index(), 1);
    }

    #[tokio::test]
    async fn single_exhausted_pair_raises_quota_exhausted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(402))
            .expect(1)
            .mount(&server)
            .await;

        let cache = seeded_cache(&["tok-a"]).await;
        let provider = PodchaserProvider::new(&config(&server, "k1:s1"), cache);

        let err = provider.search("vault", 10).await.unwrap_err();
        assert!(err.is_quota_exhausted());
        assert_eq!(provider.current_credential_index(), 0);
    }

    #[tokio::test]
    async fn exhausting_every_pair_resets_cursor_to_start() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .expect(3)
            .mount(&server)
            .await;

        let cache = seeded_cache(&["t0", "t1", "t2"]).await;
        let provider = PodchaserProvider::new(&config(&server, "a:1,b:2,c:3"), cache);

        let err = provider.search("vault", 10).await.unwrap_err();
        assert!(err.message().contains("All Podchaser credential pairs"));
        assert_eq!(provider.current_credential_index(), 0);
    }

    #[tokio::test]
    async fn graphql_quota_message_counts_as_exhaustion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("Authorization", "Bearer tok-a"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errors": [{"message": "Monthly Query LIMIT reached"}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(header("Authorization", "Bearer tok-b"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
            .expect(1)
            .mount(&server)
            .await;

        let cache = seeded_cache(&["tok-a", "tok-b"]).await;
        let provider = PodchaserProvider::new(&config(&server, "k1:s1,k2:s2"), cache);

        assert_eq!(provider.search("vault", 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn other_graphql_errors_are_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errors": [{"message": "Syntax error"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let cache = seeded_cache(&["tok-a", "tok-b"]).await;
        let provider = PodchaserProvider::new(&config(&server, "k1:s1,k2:s2"), cache);

        let err = provider.search("vault", 10).await.unwrap_err();
        assert!(matches!(err, ProviderError::ProviderUnavailable { .. }));
        assert_eq!(provider.current_credential_index(), 0);
    }

    #[tokio::test]
    async fn http_429_does_not_rotate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&server)
            .await;

        let cache = seeded_cache(&["tok-a", "tok-b"]).await;
        let provider = PodchaserProvider::new(&config(&server, "k1:s1,k2:s2"), cache);

        let err = provider.search("vault", 10).await.unwrap_err();
        assert!(matches!(err, ProviderError::RateLimitExceeded { .. }));
        assert_eq!(provider.current_credential_index(), 0);
    }

    #[tokio::test]
    async fn no_credentials_is_quota_exhausted_without_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider =
            PodchaserProvider::new(&config(&server, ""), Arc::new(MemoryCache::new(10)));
        let err = provider.search("vault", 10).await.unwrap_err();
        assert!(err.is_quota_exhausted());
    }

    #[tokio::test]
    async fn token_is_exchanged_once_and_cached() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"variables": {"clientId": "key1", "clientSecret": "secret1"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"requestAccessToken": {"access_token": "fresh-token", "token_type": "Bearer", "expires_in": 31536000}}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(header("Authorization", "Bearer fresh-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
            .expect(2)
            .mount(&server)
            .await;

        let cache = Arc::new(MemoryCache::new(10));
        let provider = PodchaserProvider::new(&config(&server, "key1:secret1"), cache.clone());

        provider.search("vault", 10).await.unwrap();
        provider.search("vault", 10).await.unwrap();

        assert_eq!(cache.get(&token_cache_key(0)).await, Some(json!("fresh-token")));
    }

    #[tokio::test]
    async fn empty_access_token_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"requestAccessToken": {"access_token": ""}}
            })))
            .mount(&server)
            .await;

        let cache = Arc::new(MemoryCache::new(10));
        let provider = PodchaserProvider::new(&config(&server, "key1:secret1"), cache.clone());

        let err = provider.search("vault", 10).await.unwrap_err();
        assert!(matches!(err, ProviderError::ProviderUnavailable { .. }));
        assert!(cache.get(&token_cache_key(0)).await.is_none());
    }

    #[tokio::test]
    async fn credits_are_normalized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"variables": {"id": "778899"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"podcast": {"credits": {"data": [
                    {
                        "person": {"id": 1, "name": "Alice", "imageUrl": "https://img.example.com/a.jpg"},
                        "role": {"title": "Host"},
                        "episode": null
                    },
                    {
                        "person": {"id": "2", "name": "Bob"},
                        "role": {"title": "Guest"},
                        "episode": {"id": 90, "title": "Ep 9", "airDate": "2024-01-02"}
                    },
                    {"role": {"title": "Orphan"}}
                ]}}}
            })))
            .mount(&server)
            .await;

        let cache = seeded_cache(&["tok-a"]).await;
        let provider = PodchaserProvider::new(&config(&server, "k1:s1"), cache);

        let credits = provider.get_credits("778899").await.unwrap();
        assert_eq!(credits.len(), 2);
        assert_eq!(credits[0].person.id, "1");
        assert_eq!(credits[0].role, "Host");
        assert!(credits[0].episode.is_none());
        let episode = credits[1].episode.as_ref().unwrap();
        assert_eq!(episode.id, "90");
        assert_eq!(episode.air_date.as_deref(), Some("2024-01-02"));
    }

    #[tokio::test]
    async fn lookup_carries_credits_when_present() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"podcast": {
                    "id": "5", "title": "Looked Up",
                    "credits": {"data": []}
                }}
            })))
            .mount(&server)
            .await;

        let cache = seeded_cache(&["tok-a"]).await;
        let provider = PodchaserProvider::new(&config(&server, "k1:s1"), cache);

        let pod = provider.get_by_id("5").await.unwrap().unwrap();
        assert_eq!(pod.credits, Some(Vec::new()));
        assert_eq!(pod.author, "");
    }
}
