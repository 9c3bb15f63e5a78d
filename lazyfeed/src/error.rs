/// A failed page fetch, as stored by [`crate::PageLoader`].
///
/// `source` is whatever error the caller's fetch function produced.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("failed to fetch page {page}")]
pub struct FetchError<E> {
    pub page: u32,
    #[source]
    pub source: E,
}

impl<E> FetchError<E> {
    pub fn new(page: u32, source: E) -> Self {
        Self { page, source }
    }

    pub fn into_source(self) -> E {
        self.source
    }
}
