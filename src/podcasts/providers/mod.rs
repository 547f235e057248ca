//! Concrete podcast provider implementations.
//!
//! Each submodule wraps a single external API and implements the
//! [`PodcastProvider`](super::PodcastProvider) trait.

pub mod credentials;
mod graphql;
pub mod itunes;
pub mod podchaser;
pub mod taddy;

pub use credentials::{parse_credentials, CredentialPair, CredentialRotator};
pub use itunes::ItunesProvider;
pub use podchaser::PodchaserProvider;
pub use taddy::TaddyProvider;

use std::time::Duration;

/// Build an HTTP client with a fixed per-request timeout.
///
/// Falls back to a default client if the TLS backend fails to initialise;
/// the fallback has no timeout but keeps the provider usable.
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("podvault/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to build HTTP client, using defaults");
            reqwest::Client::new()
        })
}
