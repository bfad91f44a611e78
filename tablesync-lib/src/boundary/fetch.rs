//! Data-fetching seam.

use std::future::Future;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::state::TableState;

/// One page of rows along with the total page count.
///
/// # Example
///
/// ```
/// use tablesync_lib::boundary::FetchResult;
///
/// let page = FetchResult::new(vec!["r1", "r2"], 3);
/// assert_eq!(page.len(), 2);
/// assert_eq!(page.page_count(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult<R> {
    rows: Vec<R>,
    page_count: usize,
}

impl<R> FetchResult<R> {
    pub fn new(rows: Vec<R>, page_count: usize) -> Self {
        Self { rows, page_count }
    }

    /// A result with no rows and no pages.
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }

    /// Returns the rows on this page.
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// Consumes the result and returns the rows.
    pub fn into_rows(self) -> Vec<R> {
        self.rows
    }

    /// Returns the total number of pages for the query.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Turns a table state into a page of rows.
///
/// Implementations own retries and caching. A returned future must either
/// resolve or fail; the session adds a timeout on top.
#[async_trait]
pub trait PageFetcher<R>: Send + Sync {
    async fn get_page(&self, state: &TableState) -> Result<FetchResult<R>, FetchError>;
}

/// A [`PageFetcher`] backed by an async closure. See [`fetch_fn`].
#[derive(Debug, Clone)]
pub struct FnFetcher<F>(F);

/// Wraps an async closure as a [`PageFetcher`].
///
/// # Example
///
/// ```
/// use tablesync_lib::boundary::{FetchResult, fetch_fn};
/// use tablesync_lib::error::FetchError;
/// use tablesync_lib::state::TableState;
///
/// let fetcher = fetch_fn(|state: TableState| async move {
///     Ok::<_, FetchError>(FetchResult::new(vec![state.page_index()], 1))
/// });
/// ```
pub fn fetch_fn<F>(f: F) -> FnFetcher<F> {
    FnFetcher(f)
}

#[async_trait]
impl<R, F, Fut> PageFetcher<R> for FnFetcher<F>
where
    R: Send + 'static,
    F: Fn(TableState) -> Fut + Send + Sync,
    Fut: Future<Output = Result<FetchResult<R>, FetchError>> + Send,
{
    async fn get_page(&self, state: &TableState) -> Result<FetchResult<R>, FetchError> {
        (self.0)(state.clone()).await
    }
}
