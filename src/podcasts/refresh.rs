//! Background refresh of stale detail and credits payloads.
//!
//! The request path only *dispatches* [`RefreshTask`]s through a
//! [`RefreshDispatcher`]; the work itself is done by
//! [`BackgroundRefresher::run`], which reports a [`RefreshOutcome`] telling
//! the queue whether to retry.

use std::fmt;

use podvault_common::ProviderError;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::detail::{CreditsPayload, Hydrator, SwrCache, SwrResource};

/// A unit of background work.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "task", content = "id", rename_all = "snake_case")]
pub enum RefreshTask {
    /// Re-fetch and re-hydrate the detail payload for an id.
    Detail(String),
    /// Re-fetch the credits payload for an id.
    Credits(String),
}

impl RefreshTask {
    /// Task name as seen by the queue.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Detail(_) => "refresh_podcast_detail",
            Self::Credits(_) => "refresh_podcast_credits",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Detail(id) | Self::Credits(id) => id,
        }
    }
}

impl fmt::Display for RefreshTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.id())
    }
}

/// Non-blocking hand-off of refresh work to a task queue.
pub trait RefreshDispatcher: Send + Sync {
    /// Enqueue `task`. Must not wait for the task to run.
    fn dispatch(&self, task: RefreshTask) -> anyhow::Result<()>;
}

/// What happened to a refresh attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// Both keys were rewritten.
    Refreshed,
    /// The provider had nothing; the stale payload stays in place.
    KeptStale,
    /// A transient provider failure; the task should be retried.
    Retry(ProviderError),
    /// A terminal failure; stale data stays in place.
    GaveUp(String),
}

/// Re-runs the request-path fetch logic and overwrites both keys.
#[derive(Clone)]
pub struct BackgroundRefresher {
    swr: SwrCache,
    hydrator: Hydrator,
}

impl BackgroundRefresher {
    pub fn new(swr: SwrCache, hydrator: Hydrator) -> Self {
        Self { swr, hydrator }
    }

    pub async fn run(&self, task: &RefreshTask) -> RefreshOutcome {
        info!(task = %task, "Starting background refresh");
        let outcome = match task {
            RefreshTask::Detail(id) => self.refresh_detail(id).await,
            RefreshTask::Credits(id) => self.refresh_credits(id).await,
        };

        match &outcome {
            RefreshOutcome::Refreshed => info!(task = %task, "Refreshed"),
            RefreshOutcome::KeptStale => {
                warn!(task = %task, "Provider returned nothing, keeping stale data")
            }
            RefreshOutcome::Retry(e) => warn!(task = %task, error = %e, "Provider error, will retry"),
            RefreshOutcome::GaveUp(reason) => {
                error!(task = %task, reason = %reason, "Giving up, stale data preserved")
            }
        }
        outcome
    }

    async fn refresh_detail(&self, id: &str) -> RefreshOutcome {
        match self.hydrator.fetch_detail(id).await {
            Ok(Some(payload)) => self.write(SwrResource::Detail, id, &payload).await,
            Ok(None) => RefreshOutcome::KeptStale,
            Err(e) => classify(e),
        }
    }

    async fn refresh_credits(&self, id: &str) -> RefreshOutcome {
        match self.hydrator.fetch_credits(id).await {
            Ok(Some(credits)) => {
                let payload = CreditsPayload::new(id, credits);
                self.write(SwrResource::Credits, id, &payload).await
            }
            Ok(None) => RefreshOutcome::KeptStale,
            Err(e) => classify(e),
        }
    }

    async fn write<T: Serialize>(&self, resource: SwrResource, id: &str, payload: &T) -> RefreshOutcome {
        match self.swr.write(resource, id, payload).await {
            Ok(()) => RefreshOutcome::Refreshed,
            Err(e) => RefreshOutcome::GaveUp(e.to_string()),
        }
    }
}

/// Quota exhaustion is terminal; every other provider failure is retryable.
fn classify(error: ProviderError) -> RefreshOutcome {
    if error.is_quota_exhausted() {
        RefreshOutcome::GaveUp(error.to_string())
    } else {
        RefreshOutcome::Retry(error)
    }
}
