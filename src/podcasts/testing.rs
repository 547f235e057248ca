//! In-process fakes shared by the unit tests of this module.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use podvault_common::ProviderKind;

use super::provider::{Credit, CreditPerson, NormalizedPodcast, PodcastProvider, ProviderResult};
use super::refresh::{RefreshDispatcher, RefreshTask};
use super::registry::ProviderRegistry;

pub(crate) fn podcast(kind: ProviderKind, id: &str, title: &str) -> NormalizedPodcast {
    let mut pod = NormalizedPodcast::new(kind, id, title);
    pod.rss_feed = format!("https://rss.example.com/{id}");
    pod
}

pub(crate) fn credit(name: &str, role: &str) -> Credit {
    Credit {
        person: CreditPerson {
            id: name.to_lowercase(),
            name: name.to_string(),
            image: None,
        },
        role: role.to_string(),
        episode: None,
    }
}

/// Provider returning canned results and counting calls.
pub(crate) struct StubProvider {
    kind: ProviderKind,
    search: Mutex<ProviderResult<Vec<NormalizedPodcast>>>,
    credits: Mutex<ProviderResult<Vec<Credit>>>,
    queries: Mutex<Vec<String>>,
    search_calls: AtomicUsize,
    credits_calls: AtomicUsize,
}

impl StubProvider {
    pub(crate) fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            search: Mutex::new(Ok(Vec::new())),
            credits: Mutex::new(Ok(Vec::new())),
            queries: Mutex::new(Vec::new()),
            search_calls: AtomicUsize::new(0),
            credits_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_results(self, results: Vec<NormalizedPodcast>) -> Self {
        *self.search.lock() = Ok(results);
        self
    }

    pub(crate) fn set_search(&self, result: ProviderResult<Vec<NormalizedPodcast>>) {
        *self.search.lock() = result;
    }

    pub(crate) fn set_credits(&self, result: ProviderResult<Vec<Credit>>) {
        *self.credits.lock() = result;
    }

    pub(crate) fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn credits_calls(&self) -> usize {
        self.credits_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl PodcastProvider for StubProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn search(&self, query: &str, limit: usize) -> ProviderResult<Vec<NormalizedPodcast>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().push(query.to_string());
        let result = self.search.lock().clone();
        result.map(|mut items| {
            items.truncate(limit);
            items
        })
    }

    async fn get_by_id(&self, id: &str) -> ProviderResult<Option<NormalizedPodcast>> {
        let result = self.search.lock().clone();
        Ok(result?.into_iter().find(|p| p.remote_id == id))
    }

    async fn get_credits(&self, _id: &str) -> ProviderResult<Vec<Credit>> {
        self.credits_calls.fetch_add(1, Ordering::SeqCst);
        self.credits.lock().clone()
    }
}

/// Registry over stubs; missing slots get an empty stub of the right kind.
pub(crate) fn registry_with(
    itunes: Arc<StubProvider>,
    taddy: Option<Arc<StubProvider>>,
    podchaser: Option<Arc<StubProvider>>,
) -> ProviderRegistry {
    let taddy = taddy.unwrap_or_else(|| Arc::new(StubProvider::new(ProviderKind::Taddy)));
    let podchaser =
        podchaser.unwrap_or_else(|| Arc::new(StubProvider::new(ProviderKind::Podchaser)));
    ProviderRegistry::new(itunes, taddy, podchaser)
}

/// Dispatcher that records tasks instead of running them.
#[derive(Default)]
pub(crate) struct RecordingDispatcher {
    tasks: Mutex<Vec<RefreshTask>>,
    fail: bool,
}

impl RecordingDispatcher {
    pub(crate) fn failing() -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub(crate) fn tasks(&self) -> Vec<RefreshTask> {
        self.tasks.lock().clone()
    }
}

impl RefreshDispatcher for RecordingDispatcher {
    fn dispatch(&self, task: RefreshTask) -> anyhow::Result<()> {
        self.tasks.lock().push(task);
        if self.fail {
            anyhow::bail!("task queue is not running");
        }
        Ok(())
    }
}
