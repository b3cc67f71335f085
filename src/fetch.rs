//! Headline fetching with last-request-wins semantics.
//!
//! The [`FetchCoordinator`] owns the current source selection and at most one
//! in-flight request.  Selecting a source aborts whatever request is still
//! running, spawns a new one on the Tokio runtime, and publishes its ordered
//! result when (and only if) it is still the latest request at completion.
//!
//! ```text
//! select_source(A) ──► task A ──╳ aborted
//! select_source(B) ──► task B ──► order_headlines ──► watch channel ──► UI
//! ```
//!
//! Failed fetches are logged and dropped: the previously published articles
//! stay in place and nothing is retried.  The outcome of the latest request is
//! visible separately through [`FetchCoordinator::status`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::ordering::order_headlines;
use crate::source::{Article, HeadlineSource, SourceKey};

/// Outcome of the most recent request, alongside the published articles.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FetchStatus {
    /// No source has been selected yet.
    Idle,
    /// A request for `source` is in flight.
    Loading { source: SourceKey },
    /// The latest request for `source` published `count` articles.
    Ready { source: SourceKey, count: usize },
    /// The latest request for `source` failed; the articles on display are
    /// whatever was published before it.
    Failed { source: SourceKey, reason: String },
}

/// Mutable coordinator state.  Guarded by one mutex so that replacing the
/// active request and publishing a result can never interleave.
struct FetchState {
    current_source: SourceKey,
    /// Bumped on every selection; a task may publish only if its generation
    /// is still the current one.
    generation: u64,
    active: Option<AbortHandle>,
    status: FetchStatus,
}

struct Shared {
    state: Mutex<FetchState>,
    published: watch::Sender<Arc<[Article]>>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, FetchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fetches headlines for the selected source and publishes the latest result.
///
/// The coordinator is scoped to the screen that owns it: dropping it aborts
/// any request still in flight.
pub struct FetchCoordinator {
    source: Arc<dyn HeadlineSource>,
    shared: Arc<Shared>,
}

impl FetchCoordinator {
    /// Create a coordinator around an injected headline source.
    ///
    /// Nothing is fetched until [`select_source`](Self::select_source) is
    /// called; `initial` only seeds [`current_source`](Self::current_source).
    pub fn new(source: Arc<dyn HeadlineSource>, initial: SourceKey) -> Self {
        let (published, _) = watch::channel(Arc::<[Article]>::from(Vec::new()));
        let state = FetchState {
            current_source: initial,
            generation: 0,
            active: None,
            status: FetchStatus::Idle,
        };
        Self {
            source,
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                published,
            }),
        }
    }

    /// Make `key` the current source and start fetching it.
    ///
    /// Any request still in flight, for this or another source, is aborted
    /// before the new one is spawned; should it complete anyway, its result is
    /// discarded.  Must be called from within a Tokio runtime.
    pub fn select_source(&self, key: SourceKey) {
        let mut state = self.shared.lock();

        if let Some(previous) = state.active.take() {
            previous.abort();
            debug!(previous = %state.current_source, next = %key, "superseding in-flight fetch");
        }

        state.generation += 1;
        state.current_source = key.clone();
        state.status = FetchStatus::Loading { source: key.clone() };

        let task = tokio::spawn(run_fetch(
            Arc::clone(&self.source),
            Arc::clone(&self.shared),
            key,
            state.generation,
        ));
        state.active = Some(task.abort_handle());
    }

    /// Snapshot of the most recently published, ordered articles.
    pub fn current_headlines(&self) -> Arc<[Article]> {
        Arc::clone(&self.shared.published.borrow())
    }

    /// The source most recently passed to `select_source` (or the initial one).
    pub fn current_source(&self) -> SourceKey {
        self.shared.lock().current_source.clone()
    }

    pub fn status(&self) -> FetchStatus {
        self.shared.lock().status.clone()
    }

    /// Receiver that is notified every time a new article set is published.
    pub fn subscribe(&self) -> watch::Receiver<Arc<[Article]>> {
        self.shared.published.subscribe()
    }
}

impl Drop for FetchCoordinator {
    fn drop(&mut self) {
        if let Some(active) = self.shared.lock().active.take() {
            active.abort();
        }
    }
}

/// Body of one spawned fetch.  Aborting the task at the `.await` is the
/// normal cancellation path; the generation check catches a request that
/// completed while being superseded.
async fn run_fetch(
    source: Arc<dyn HeadlineSource>,
    shared: Arc<Shared>,
    key: SourceKey,
    generation: u64,
) {
    let result = source
        .top_headlines(&key)
        .await
        .map(|articles| order_headlines(&articles));

    let mut state = shared.lock();
    if state.generation != generation {
        debug!(source = %key, "discarding result of superseded fetch");
        return;
    }
    state.active = None;

    match result {
        Ok(ordered) => {
            let count = ordered.len();
            shared.published.send_replace(Arc::from(ordered));
            state.status = FetchStatus::Ready { source: key.clone(), count };
            info!(source = %key, count, "published headlines");
        }
        Err(err) => {
            warn!(source = %key, error = %err, "headline fetch failed; keeping previous articles");
            state.status = FetchStatus::Failed {
                source: key,
                reason: err.to_string(),
            };
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
