use std::future::Future;

use async_trait::async_trait;

/// The page source behind an [`crate::InfiniteFeed`].
///
/// `page` counts from the loader's `initial_page`; `page_size` is the loader's configured page
/// size, handy for range queries. Returning fewer than `page_size` items ends the feed.
///
/// Retry and caching policy belong here, not in the loader.
#[async_trait]
pub trait PageFetcher: Send + Sync + 'static {
    type Item: Send + 'static;
    type Error: Send + 'static;

    async fn fetch_page(
        &self,
        page: u32,
        page_size: usize,
    ) -> Result<Vec<Self::Item>, Self::Error>;
}

/// A [`PageFetcher`] backed by an async closure. See [`fetch_fn`].
#[derive(Clone)]
pub struct FnFetcher<F> {
    f: F,
}

/// Wraps `f(page, page_size)` as a [`PageFetcher`].
pub fn fetch_fn<F, Fut, T, E>(f: F) -> FnFetcher<F>
where
    F: Fn(u32, usize) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<T>, E>> + Send + 'static,
{
    FnFetcher { f }
}

#[async_trait]
impl<F, Fut, T, E> PageFetcher for FnFetcher<F>
where
    F: Fn(u32, usize) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<T>, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    type Item = T;
    type Error = E;

    async fn fetch_page(&self, page: u32, page_size: usize) -> Result<Vec<T>, E> {
        (self.f)(page, page_size).await
    }
}

impl<F> std::fmt::Debug for FnFetcher<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FnFetcher(..)")
    }
}
