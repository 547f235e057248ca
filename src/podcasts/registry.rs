//! Name → provider lookup over the fixed provider set.
//!
//! The registry holds exactly one provider per [`ProviderKind`]; lookups by
//! kind are an exhaustive `match`, so adding a provider kind without wiring
//! it here fails to compile.

use std::sync::Arc;

use podvault_common::{ProviderKind, Result};

use super::cache::CacheStore;
use super::provider::PodcastProvider;
use super::providers::{ItunesProvider, PodchaserProvider, TaddyProvider};
use super::rate_limiter::RateLimiter;
use crate::config::Config;

/// Holds one shared instance of each podcast provider.
#[derive(Clone)]
pub struct ProviderRegistry {
    itunes: Arc<dyn PodcastProvider>,
    taddy: Arc<dyn PodcastProvider>,
    podchaser: Arc<dyn PodcastProvider>,
}

impl ProviderRegistry {
    /// Assemble a registry from already-built providers.
    pub fn new(
        itunes: Arc<dyn PodcastProvider>,
        taddy: Arc<dyn PodcastProvider>,
        podchaser: Arc<dyn PodcastProvider>,
    ) -> Self {
        debug_assert_eq!(itunes.kind(), ProviderKind::Itunes);
        debug_assert_eq!(taddy.kind(), ProviderKind::Taddy);
        debug_assert_eq!(podchaser.kind(), ProviderKind::Podchaser);
        Self {
            itunes,
            taddy,
            podchaser,
        }
    }

    /// Build the HTTP-backed providers from configuration.
    ///
    /// `itunes_limiter` must be the process-wide iTunes limiter; `cache` holds
    /// Podchaser access tokens.
    pub fn from_config(
        config: &Config,
        cache: Arc<dyn CacheStore>,
        itunes_limiter: Arc<RateLimiter>,
    ) -> Self {
        Self::new(
            Arc::new(ItunesProvider::new(&config.itunes, itunes_limiter)),
            Arc::new(TaddyProvider::new(&config.taddy)),
            Arc::new(PodchaserProvider::new(&config.podchaser, cache)),
        )
    }

    /// Provider for `kind`.
    pub fn get(&self, kind: ProviderKind) -> Arc<dyn PodcastProvider> {
        match kind {
            ProviderKind::Itunes => Arc::clone(&self.itunes),
            ProviderKind::Taddy => Arc::clone(&self.taddy),
            ProviderKind::Podchaser => Arc::clone(&self.podchaser),
        }
    }

    /// Names accepted by [`validate_name`](Self::validate_name).
    pub fn available_names() -> Vec<&'static str> {
        ProviderKind::names()
    }

    /// Ensure `name` is known without touching any provider.
    pub fn validate_name(name: &str) -> Result<ProviderKind> {
        name.parse()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &Self::available_names())
            .finish()
    }
}
