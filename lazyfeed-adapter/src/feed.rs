use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lazyfeed::{
    FetchError, LoadOutcome, LoadState, LoaderOptions, LoaderSnapshot, PageLoader, PageRequest,
};
use tokio::sync::watch;
use tokio::task::AbortHandle;

use crate::{FeedError, PageFetcher};

type Loader<F> = PageLoader<<F as PageFetcher>::Item, FeedError<<F as PageFetcher>::Error>>;

struct Shared<F: PageFetcher> {
    fetcher: Arc<F>,
    loader: Mutex<Loader<F>>,
    state: watch::Sender<LoaderSnapshot>,
}

impl<F: PageFetcher> Shared<F> {
    fn lock(&self) -> MutexGuard<'_, Loader<F>> {
        self.loader.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, snapshot: LoaderSnapshot) {
        self.state.send_replace(snapshot);
    }

    fn finish(
        &self,
        request: PageRequest,
        result: Result<Vec<F::Item>, FeedError<F::Error>>,
    ) -> LoadOutcome {
        let (outcome, snapshot) = {
            let mut loader = self.lock();
            let outcome = loader.finish(request, result);
            (outcome, loader.snapshot())
        };
        if outcome != LoadOutcome::Stale {
            self.publish(snapshot);
        }
        outcome
    }
}

/// An async infinite feed: a [`PageLoader`] driven by a [`PageFetcher`].
///
/// Cloning is cheap; clones share the same loader. Each fetch runs on its own tokio task while
/// the loader lock is released, so the UI can read items during a fetch.
///
/// Guarantees carried over from the loader:
/// - `load_more` while a fetch is in flight (or after exhaustion) returns `None` and does not
///   call the fetcher.
/// - A response that arrives after `reset` is dropped.
/// - Fetch failures are stored (see [`Self::error`]); nothing is propagated as a panic.
pub struct InfiniteFeed<F: PageFetcher> {
    shared: Arc<Shared<F>>,
}

impl<F: PageFetcher> Clone for InfiniteFeed<F> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<F: PageFetcher> InfiniteFeed<F> {
    pub fn new(fetcher: F, options: LoaderOptions) -> Self {
        let loader = PageLoader::new(options);
        let (state, _) = watch::channel(loader.snapshot());
        Self {
            shared: Arc::new(Shared {
                fetcher: Arc::new(fetcher),
                loader: Mutex::new(loader),
                state,
            }),
        }
    }

    /// Fetches the next page and appends it.
    ///
    /// Returns `None` when the call was ignored (already loading or exhausted). Dropping the
    /// returned future cancels the fetch and returns the loader to a retryable state.
    pub async fn load_more(&self) -> Option<LoadOutcome> {
        let (request, page_size, snapshot) = {
            let mut loader = self.shared.lock();
            let request = loader.begin_load()?;
            (request, loader.page_size(), loader.snapshot())
        };
        self.shared.publish(snapshot);
        fdebug!(page = request.page, "InfiniteFeed::load_more");

        let fetcher = Arc::clone(&self.shared.fetcher);
        let page = request.page;
        let handle = tokio::spawn(async move { fetcher.fetch_page(page, page_size).await });

        let mut guard = InFlight {
            shared: &self.shared,
            request: Some(request),
            abort: handle.abort_handle(),
        };

        let result = match handle.await {
            Ok(result) => result.map_err(FeedError::Fetch),
            Err(e) if e.is_panic() => {
                fwarn!(page, "page fetch task panicked");
                Err(FeedError::Panicked)
            }
            Err(_) => Err(FeedError::Cancelled),
        };

        guard.request = None;
        let outcome = self.shared.finish(request, result);
        if outcome == LoadOutcome::Stale {
            fdebug!(page, "InfiniteFeed: dropped response from before reset");
        }
        Some(outcome)
    }

    /// Clears all items and errors and rewinds the cursor.
    ///
    /// A fetch still in flight keeps running but its response is discarded.
    pub fn reset(&self) {
        let snapshot = {
            let mut loader = self.shared.lock();
            loader.reset();
            loader.snapshot()
        };
        fdebug!("InfiniteFeed::reset");
        self.shared.publish(snapshot);
    }

    /// Subscribes to progress updates. The current snapshot is marked as seen.
    pub fn subscribe(&self) -> watch::Receiver<LoaderSnapshot> {
        self.shared.state.subscribe()
    }

    pub fn snapshot(&self) -> LoaderSnapshot {
        self.shared.lock().snapshot()
    }

    pub fn state(&self) -> LoadState {
        self.shared.lock().state()
    }

    pub fn len(&self) -> usize {
        self.shared.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.lock().is_empty()
    }

    pub fn has_more(&self) -> bool {
        self.shared.lock().has_more()
    }

    /// Runs `f` with the loaded items, under the loader lock.
    pub fn with_items<R>(&self, f: impl FnOnce(&[F::Item]) -> R) -> R {
        f(self.shared.lock().items())
    }

    /// Like [`Self::with_items`], also passing the generation the items belong to.
    pub fn with_generation_and_items<R>(&self, f: impl FnOnce(u64, &[F::Item]) -> R) -> R {
        let loader = self.shared.lock();
        f(loader.generation(), loader.items())
    }

    /// Bumped by every [`Self::reset`].
    pub fn generation(&self) -> u64 {
        self.shared.lock().generation()
    }

    pub fn items(&self) -> Vec<F::Item>
    where
        F::Item: Clone,
    {
        self.with_items(|items| items.to_vec())
    }

    /// Runs `f` with the stored error of the last failed fetch, if any.
    pub fn with_error<R>(
        &self,
        f: impl FnOnce(Option<&FetchError<FeedError<F::Error>>>) -> R,
    ) -> R {
        f(self.shared.lock().error())
    }

    /// Removes the stored error; an errored feed returns to `Idle`.
    pub fn take_error(&self) -> Option<FetchError<FeedError<F::Error>>> {
        let (error, snapshot) = {
            let mut loader = self.shared.lock();
            let error = loader.take_error();
            (error, loader.snapshot())
        };
        self.shared.publish(snapshot);
        error
    }

    pub fn fetcher(&self) -> &F {
        &self.shared.fetcher
    }
}

impl<F: PageFetcher> std::fmt::Debug for InfiniteFeed<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfiniteFeed")
            .field("snapshot", &self.snapshot())
            .finish_non_exhaustive()
    }
}

/// Returns the loader to a retryable state if `load_more` is dropped mid-fetch.
struct InFlight<'a, F: PageFetcher> {
    shared: &'a Shared<F>,
    request: Option<PageRequest>,
    abort: AbortHandle,
}

impl<F: PageFetcher> Drop for InFlight<'_, F> {
    fn drop(&mut self) {
        let Some(request) = self.request.take() else {
            return;
        };
        self.abort.abort();
        fwarn!(page = request.page, "InfiniteFeed: load_more dropped mid-fetch");
        self.shared.finish(request, Err(FeedError::Cancelled));
    }
}
