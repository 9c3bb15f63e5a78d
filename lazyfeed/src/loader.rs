use alloc::vec::Vec;

use crate::{FetchError, LoadState, LoaderOptions};

/// A ticket for one in-flight page fetch, handed out by [`PageLoader::begin_load`].
///
/// The ticket must be passed back to [`PageLoader::finish`]. Tickets issued before a
/// [`PageLoader::reset`] are rejected, so late responses never land in a fresh collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    generation: u64,
}

impl PageRequest {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What [`PageLoader::finish`] did with a completed fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A full page was appended; more may follow.
    Appended { count: usize },
    /// A short (possibly empty) page was appended and the loader is now exhausted.
    Exhausted { count: usize },
    /// The fetch failed; the error is stored and loading may be retried.
    Failed,
    /// The ticket belongs to a previous generation or is not the one in flight. Nothing changed.
    Stale,
}

/// A lightweight, serializable view of a loader's progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoaderSnapshot {
    pub state: LoadState,
    pub next_page: u32,
    pub pages_loaded: u32,
    pub len: usize,
    pub has_error: bool,
    /// Bumped by every reset. Mirrors of the items must start over when it changes.
    pub generation: u64,
}

/// A headless paginated loader.
///
/// The loader never performs I/O. Fetching is split into two phases so any runtime (or none)
/// can drive it:
///
/// 1. [`Self::begin_load`] applies the `load_more` guard and returns the page to fetch.
/// 2. [`Self::finish`] applies the fetch result.
///
/// Invariants:
/// - At most one fetch is in flight; `begin_load` returns `None` while loading or exhausted.
/// - The item collection only grows between resets, in arrival order.
/// - The loader becomes exhausted only when a page returns fewer than `page_size` items.
///
/// For an async driver, see `lazyfeed-adapter`.
#[derive(Clone, Debug)]
pub struct PageLoader<T, E> {
    options: LoaderOptions,
    items: Vec<T>,
    state: LoadState,
    next_page: u32,
    pages_loaded: u32,
    error: Option<FetchError<E>>,
    generation: u64,
    in_flight: Option<PageRequest>,
}

impl<T, E> PageLoader<T, E> {
    pub fn new(options: LoaderOptions) -> Self {
        fdebug!(
            page_size = options.page_size,
            initial_page = options.initial_page,
            "PageLoader::new"
        );
        Self {
            items: Vec::new(),
            state: LoadState::Idle,
            next_page: options.initial_page,
            pages_loaded: 0,
            error: None,
            generation: 0,
            in_flight: None,
            options,
        }
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    pub fn page_size(&self) -> usize {
        self.options.page_size.max(1)
    }

    /// Starts loading the next page, or returns `None` when loading or exhausted.
    ///
    /// A loader in the `Error` state may be retried; the stored error stays visible until the
    /// retry completes.
    pub fn begin_load(&mut self) -> Option<PageRequest> {
        if !self.state.can_load() {
            ftrace!(state = ?self.state, "begin_load ignored");
            return None;
        }
        let request = PageRequest {
            page: self.next_page,
            generation: self.generation,
        };
        self.state = LoadState::Loading;
        self.in_flight = Some(request);
        fdebug!(page = request.page, generation = request.generation, "begin_load");
        Some(request)
    }

    /// Applies the result of the fetch started by `request`.
    pub fn finish(&mut self, request: PageRequest, result: Result<Vec<T>, E>) -> LoadOutcome {
        if self.in_flight != Some(request) {
            fwarn!(
                page = request.page,
                generation = request.generation,
                current_generation = self.generation,
                "finish: dropping stale page"
            );
            return LoadOutcome::Stale;
        }
        self.in_flight = None;

        match result {
            Ok(page_items) => {
                let count = page_items.len();
                self.items.extend(page_items);
                self.next_page = self.next_page.saturating_add(1);
                self.pages_loaded = self.pages_loaded.saturating_add(1);
                self.error = None;
                if count < self.page_size() {
                    self.state = LoadState::Exhausted;
                    fdebug!(page = request.page, count, total = self.items.len(), "exhausted");
                    LoadOutcome::Exhausted { count }
                } else {
                    self.state = LoadState::Idle;
                    fdebug!(page = request.page, count, total = self.items.len(), "appended");
                    LoadOutcome::Appended { count }
                }
            }
            Err(source) => {
                fwarn!(page = request.page, "page fetch failed");
                self.error = Some(FetchError::new(request.page, source));
                self.state = LoadState::Error;
                LoadOutcome::Failed
            }
        }
    }

    /// Runs one `load_more` step with a synchronous fetch function.
    ///
    /// Returns `None` when the guard rejected the call (loading or exhausted).
    pub fn load_more_with(
        &mut self,
        fetch: impl FnOnce(u32) -> Result<Vec<T>, E>,
    ) -> Option<LoadOutcome> {
        let request = self.begin_load()?;
        let result = fetch(request.page);
        Some(self.finish(request, result))
    }

    /// Clears all items and errors and rewinds the cursor.
    ///
    /// Any fetch still in flight is invalidated: its ticket will be reported as
    /// [`LoadOutcome::Stale`].
    pub fn reset(&mut self) {
        fdebug!(
            dropped = self.items.len(),
            in_flight = self.in_flight.is_some(),
            "reset"
        );
        self.items.clear();
        self.state = LoadState::Idle;
        self.next_page = self.options.initial_page;
        self.pages_loaded = 0;
        self.error = None;
        self.in_flight = None;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Replaces the options and resets the loader.
    pub fn set_options(&mut self, options: LoaderOptions) {
        self.options = options;
        self.reset();
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == LoadState::Exhausted
    }

    pub fn has_more(&self) -> bool {
        self.state != LoadState::Exhausted
    }

    pub fn in_flight(&self) -> Option<PageRequest> {
        self.in_flight
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// The page index the next `begin_load` will request.
    pub fn next_page(&self) -> u32 {
        self.next_page
    }

    pub fn pages_loaded(&self) -> u32 {
        self.pages_loaded
    }

    pub fn error(&self) -> Option<&FetchError<E>> {
        self.error.as_ref()
    }

    /// Removes the stored error. An `Error` state becomes `Idle`.
    pub fn take_error(&mut self) -> Option<FetchError<E>> {
        if self.state == LoadState::Error {
            self.state = LoadState::Idle;
        }
        self.error.take()
    }

    pub fn clear_error(&mut self) {
        let _ = self.take_error();
    }

    pub fn snapshot(&self) -> LoaderSnapshot {
        LoaderSnapshot {
            state: self.state,
            next_page: self.next_page,
            pages_loaded: self.pages_loaded,
            len: self.items.len(),
            has_error: self.error.is_some(),
            generation: self.generation,
        }
    }
}

impl<T, E> Default for PageLoader<T, E> {
    fn default() -> Self {
        Self::new(LoaderOptions::default())
    }
}
