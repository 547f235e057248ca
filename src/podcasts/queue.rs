//! In-process task queue feeding the [`BackgroundRefresher`].
//!
//! [`RefreshQueue`] implements [`RefreshDispatcher`]: dispatch is a
//! non-blocking `try_send` onto a bounded channel drained by a spawned worker.
//! The worker runs tasks one at a time, pausing between jobs, and re-enqueues
//! retryable failures after a fixed per-task delay. A task that is already
//! queued, running or waiting for a retry is not enqueued again.
//!
//! The worker runs until every [`RefreshQueue`] handle is dropped. Pending
//! retries hold only a weak sender, so they do not keep the worker alive.

use std::sync::Arc;

use anyhow::Result;
use dashmap::DashSet;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};

use super::refresh::{BackgroundRefresher, RefreshDispatcher, RefreshOutcome, RefreshTask};
use crate::config::RefreshConfig;

/// Retry policy applied by the worker.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub detail_delay: Duration,
    pub credits_delay: Duration,
    /// Pause between consecutive jobs.
    pub pace: Duration,
}

impl RetryPolicy {
    fn delay_for(&self, task: &RefreshTask) -> Duration {
        match task {
            RefreshTask::Detail(_) => self.detail_delay,
            RefreshTask::Credits(_) => self.credits_delay,
        }
    }
}

impl From<&RefreshConfig> for RetryPolicy {
    fn from(config: &RefreshConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            detail_delay: Duration::from_secs(config.detail_retry_delay_secs),
            credits_delay: Duration::from_secs(config.credits_retry_delay_secs),
            pace: Duration::from_millis(config.pace_ms),
        }
    }
}

#[derive(Debug)]
struct QueuedTask {
    task: RefreshTask,
    /// Number of retries already spent.
    attempt: u32,
}

/// Handle to the background refresh queue.
pub struct RefreshQueue {
    sender: mpsc::Sender<QueuedTask>,
    pending: Arc<DashSet<RefreshTask>>,
}

impl RefreshQueue {
    /// Create a queue and spawn its worker on the current runtime.
    pub fn new(refresher: Arc<BackgroundRefresher>, config: &RefreshConfig) -> Self {
        Self::start(refresher, config.queue_capacity, RetryPolicy::from(config)).0
    }

    /// Like [`new`](Self::new) but with an explicit policy, also returning the
    /// worker's handle.
    pub fn start(
        refresher: Arc<BackgroundRefresher>,
        capacity: usize,
        policy: RetryPolicy,
    ) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let pending = Arc::new(DashSet::new());

        let worker = tokio::spawn(process_tasks(
            receiver,
            sender.downgrade(),
            refresher,
            Arc::clone(&pending),
            policy,
        ));

        (Self { sender, pending }, worker)
    }

    /// Tasks queued, running or waiting for a retry.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

impl RefreshDispatcher for RefreshQueue {
    fn dispatch(&self, task: RefreshTask) -> Result<()> {
        if !self.pending.insert(task.clone()) {
            debug!(task = %task, "Refresh already pending, skipping");
            return Ok(());
        }

        match self.sender.try_send(QueuedTask {
            task: task.clone(),
            attempt: 0,
        }) {
            Ok(()) => {
                info!(task = %task, "Dispatched refresh task");
                Ok(())
            }
            Err(e) => {
                self.pending.remove(&task);
                match e {
                    TrySendError::Full(_) => anyhow::bail!("Refresh queue is full"),
                    TrySendError::Closed(_) => anyhow::bail!("Refresh queue is closed"),
                }
            }
        }
    }
}

/// Background loop draining the channel until every sender is dropped.
async fn process_tasks(
    mut receiver: mpsc::Receiver<QueuedTask>,
    retry_sender: mpsc::WeakSender<QueuedTask>,
    refresher: Arc<BackgroundRefresher>,
    pending: Arc<DashSet<RefreshTask>>,
    policy: RetryPolicy,
) {
    info!("Refresh queue worker started");

    while let Some(job) = receiver.recv().await {
        match refresher.run(&job.task).await {
            RefreshOutcome::Refreshed | RefreshOutcome::KeptStale | RefreshOutcome::GaveUp(_) => {
                pending.remove(&job.task);
            }
            RefreshOutcome::Retry(err) if job.attempt < policy.max_retries => {
                let delay = policy.delay_for(&job.task);
                warn!(
                    task = %job.task,
                    attempt = job.attempt + 1,
                    max_retries = policy.max_retries,
                    delay_secs = delay.as_secs(),
                    error = %err,
                    "Scheduling retry"
                );
                schedule_retry(job, delay, retry_sender.clone(), Arc::clone(&pending));
            }
            RefreshOutcome::Retry(err) => {
                error!(
                    task = %job.task,
                    retries = policy.max_retries,
                    error = %err,
                    "Retries exhausted, giving up"
                );
                pending.remove(&job.task);
            }
        }

        if !policy.pace.is_zero() {
            sleep(policy.pace).await;
        }
    }

    info!("Refresh queue worker stopped (channel closed)");
}

fn schedule_retry(
    job: QueuedTask,
    delay: Duration,
    sender: mpsc::WeakSender<QueuedTask>,
    pending: Arc<DashSet<RefreshTask>>,
) {
    tokio::spawn(async move {
        sleep(delay).await;

        let task = job.task.clone();
        let retry = QueuedTask {
            task: job.task,
            attempt: job.attempt + 1,
        };
        let sent = match sender.upgrade() {
            Some(sender) => sender.try_send(retry).is_ok(),
            None => false,
        };
        if !sent {
            warn!(task = %task, "Could not re-enqueue refresh task, dropping it");
            pending.remove(&task);
        }
    });
}
