/// Errors stored by [`crate::InfiniteFeed`] for a failed page.
#[derive(Debug, thiserror::Error)]
pub enum FeedError<E> {
    /// The fetcher returned an error.
    #[error(transparent)]
    Fetch(E),
    /// The fetch task panicked.
    #[error("page fetch panicked")]
    Panicked,
    /// The fetch was dropped before it completed (e.g. the awaiting task was cancelled).
    #[error("page fetch was cancelled")]
    Cancelled,
}

impl<E> FeedError<E> {
    pub fn fetch_error(&self) -> Option<&E> {
        match self {
            Self::Fetch(e) => Some(e),
            Self::Panicked | Self::Cancelled => None,
        }
    }
}
