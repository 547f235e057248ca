//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which starts one wiremock server per provider and
//! a [`Config`] pointing every provider at its mock. Catalogs built from the
//! harness run the real HTTP providers, cache and refresh queue.

#![allow(dead_code)]

use std::time::Duration;

use podvault::config::{
    CacheConfig, Config, ItunesConfig, PodchaserConfig, RefreshConfig, TaddyConfig,
};
use podvault::podcasts::PodcastCatalog;
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct TestHarness {
    pub itunes: MockServer,
    pub taddy: MockServer,
    pub podchaser: MockServer,
    pub config: Config,
}

impl TestHarness {
    pub async fn new() -> Self {
        let itunes = MockServer::start().await;
        let taddy = MockServer::start().await;
        let podchaser = MockServer::start().await;

        let config = Config {
            cache: CacheConfig {
                main_ttl_secs: 60,
                fresh_ttl_secs: 1,
                search_ttl_secs: 60,
                max_entries: 1_000,
            },
            itunes: ItunesConfig {
                search_url: format!("{}/search", itunes.uri()),
                lookup_url: format!("{}/lookup", itunes.uri()),
                backoff_base_ms: 1,
                timeout_secs: 5,
                ..ItunesConfig::default()
            },
            taddy: TaddyConfig {
                endpoint: taddy.uri(),
                api_key: "taddy-key".into(),
                user_id: "42".into(),
                timeout_secs: 5,
            },
            podchaser: PodchaserConfig {
                endpoint: podchaser.uri(),
                credentials: "pc-key:pc-secret".into(),
                timeout_secs: 5,
                ..PodchaserConfig::default()
            },
            refresh: RefreshConfig {
                detail_retry_delay_secs: 1,
                credits_retry_delay_secs: 1,
                pace_ms: 0,
                ..RefreshConfig::default()
            },
        };

        Self {
            itunes,
            taddy,
            podchaser,
            config,
        }
    }

    pub fn catalog(&self) -> PodcastCatalog {
        PodcastCatalog::from_config(&self.config)
    }

    /// iTunes answers every search with `items`.
    pub async fn mount_itunes_search(&self, items: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "resultCount": items.len(),
                "results": items,
            })))
            .mount(&self.itunes)
            .await;
    }

    /// Podchaser hands out `tok` for every token exchange.
    pub async fn mount_podchaser_token(&self) {
        Mock::given(method("POST"))
            .and(body_string_contains("requestAccessToken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"requestAccessToken": {
                    "access_token": "tok",
                    "token_type": "Bearer",
                    "expires_in": 31_536_000
                }}
            })))
            .mount(&self.podchaser)
            .await;
    }

    pub async fn mount_podchaser_search(&self, items: Vec<Value>) {
        Mock::given(method("POST"))
            .and(body_string_contains("SearchPodcasts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"podcasts": {"data": items}}
            })))
            .mount(&self.podchaser)
            .await;
    }

    pub async fn mount_podchaser_credits(&self, credits: Vec<Value>) {
        Mock::given(method("POST"))
            .and(body_string_contains("GetCredits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"podcast": {"credits": {"data": credits}}}
            })))
            .mount(&self.podchaser)
            .await;
    }

    /// Number of iTunes search requests carrying `term`.
    pub async fn itunes_requests_for(&self, term: &str) -> usize {
        self.itunes
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|req| req.url.query_pairs().any(|(k, v)| k == "term" && v == term))
            .count()
    }
}

pub fn itunes_item(id: u64, title: &str) -> Value {
    json!({
        "collectionId": id,
        "trackName": title,
        "artistName": "Vault Media",
        "artworkUrl600": "https://img.example.com/600.jpg",
        "feedUrl": format!("https://rss.example.com/{id}"),
        "primaryGenreName": "Technology",
        "trackCount": 55,
        "collectionViewUrl": format!("https://podcasts.apple.com/{id}")
    })
}

pub fn podchaser_item(id: &str, title: &str, rating: f64) -> Value {
    json!({
        "id": id,
        "title": title,
        "author": "Vault Media",
        "imageUrl": "https://img.example.com/pc.jpg",
        "rssUrl": "https://rss.example.com/pc",
        "rating": {"averageRating": rating, "reviewsCount": 10},
        "categories": {"data": [{"title": "Technology"}]},
        "podcastEpisodes": {"paginatorInfo": {"total": 55}}
    })
}

pub fn podchaser_credit(person: &str, role: &str) -> Value {
    json!({
        "person": {"id": person.to_lowercase(), "name": person, "imageUrl": null},
        "role": {"title": role},
        "episode": null
    })
}

/// Matcher for an iTunes search on `term`.
pub fn itunes_term(term: &str) -> wiremock::MockBuilder {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("term", term))
}

/// Poll `check` every 100ms for up to five seconds.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..50 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    false
}
