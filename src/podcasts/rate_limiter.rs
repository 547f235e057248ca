//! Token-bucket rate limiting for outbound provider calls.
//!
//! [`RateLimiter`] wraps a [`governor`] GCRA limiter configured as a bucket of
//! `max_calls` tokens refilled at `max_calls / period`: a full bucket admits
//! `max_calls` back-to-back calls, after which each call waits roughly
//! `period / max_calls` for the next token.
//!
//! The iTunes limiter must be one instance per process. Construct it once and
//! hand the same `Arc<RateLimiter>` to every client that talks to iTunes.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota,
};
use tracing::debug;

type Gcra = governor::RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Token-bucket limiter keyed by `(max_calls, period)`.
pub struct RateLimiter {
    inner: Option<Gcra>,
    max_calls: u32,
    period: Duration,
}

impl RateLimiter {
    /// Create a limiter admitting `max_calls` per `period`.
    ///
    /// Zero values are clamped to one call / one millisecond so the limiter
    /// always makes progress.
    pub fn new(max_calls: u32, period: Duration) -> Self {
        let burst = NonZeroU32::new(max_calls).unwrap_or(NonZeroU32::MIN);
        let period = period.max(Duration::from_millis(1));
        let per_token = (period / burst.get()).max(Duration::from_nanos(1));

        let quota = Quota::with_period(per_token)
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN))
            .allow_burst(burst);

        Self {
            inner: Some(governor::RateLimiter::direct(quota)),
            max_calls: burst.get(),
            period,
        }
    }

    /// A limiter that never waits. Intended for tests and local tooling.
    pub fn unlimited() -> Self {
        Self {
            inner: None,
            max_calls: u32::MAX,
            period: Duration::ZERO,
        }
    }

    /// Wait until a token is available, then consume it.
    ///
    /// Concurrent callers are serialized by the limiter's atomic state; there
    /// is no fairness guarantee. No cancellation is exposed: race this future
    /// against a timeout if the caller needs one.
    pub async fn acquire(&self) {
        let Some(limiter) = &self.inner else {
            return;
        };

        if limiter.check().is_ok() {
            return;
        }

        debug!(
            wait_ms = self.seconds_per_token().as_millis() as u64,
            "Token pool empty, waiting for refill"
        );
        limiter.until_ready().await;
    }

    /// Time it takes to earn one token at the configured refill rate.
    pub fn seconds_per_token(&self) -> Duration {
        if self.inner.is_none() {
            return Duration::ZERO;
        }
        self.period / self.max_calls
    }

    pub fn max_calls(&self) -> u32 {
        self.max_calls
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("max_calls", &self.max_calls)
            .field("period", &self.period)
            .field("unlimited", &self.inner.is_none())
            .finish()
    }
}
