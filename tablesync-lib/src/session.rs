//! A mounted table: controller, data boundary and search input wired together.
//!
//! [`TableSession`] runs the loop that keeps the table in sync with its URL:
//! every query change re-renders the search input and starts a fetch into
//! the boundary; every resolved fetch clears the pending flag for the state
//! it was fetched with. The loop stops when its [`SyncTask`] is dropped.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::boundary::{BodyView, DataBoundary, FetchKey, FetchResult, PageFetcher, SkeletonConfig};
use crate::controller::{PaginationControls, TableController};
use crate::error::FetchError;
use crate::input::{ControlledInput, EditKey};
use crate::state::TableState;

/// Session configuration.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use tablesync_lib::session::SessionConfig;
///
/// let config = SessionConfig::default()
///     .with_fetch_timeout(Duration::from_secs(5))
///     .with_clamp_page_index(false);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Placeholder shape while loading.
    pub skeleton: SkeletonConfig,

    /// How long a fetch may take before it fails with
    /// [`FetchError::Timeout`]. `None` waits forever.
    ///
    /// Default: 30 seconds
    pub fetch_timeout: Option<Duration>,

    /// Rewrite a page index past the last page once the page count is known.
    ///
    /// Default: true
    pub clamp_page_index: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            skeleton: SkeletonConfig::default(),
            fetch_timeout: Some(Duration::from_secs(30)),
            clamp_page_index: true,
        }
    }
}

impl SessionConfig {
    pub fn with_skeleton(mut self, skeleton: SkeletonConfig) -> Self {
        self.skeleton = skeleton;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    pub fn without_fetch_timeout(mut self) -> Self {
        self.fetch_timeout = None;
        self
    }

    pub fn with_clamp_page_index(mut self, clamp: bool) -> Self {
        self.clamp_page_index = clamp;
        self
    }
}

/// The URL sync loop started by [`TableSession::spawn_sync`].
///
/// Aborts the loop when dropped.
#[derive(Debug)]
pub struct SyncTask {
    handle: JoinHandle<()>,
}

impl SyncTask {
    /// Whether the loop has stopped.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for SyncTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A table mounted over a router and a data source.
///
/// Cheap to clone; clones share the same state.
pub struct TableSession<R> {
    controller: TableController,
    boundary: DataBoundary<R>,
    search: ControlledInput,
    fetcher: Arc<dyn PageFetcher<R>>,
    config: SessionConfig,
}

impl<R> TableSession<R>
where
    R: Send + Sync + 'static,
{
    /// Mounts the table and starts fetching the first page.
    ///
    /// Call [`spawn_sync`](Self::spawn_sync) to follow later URL changes.
    /// Must be called from within a Tokio runtime.
    pub fn mount(
        controller: TableController,
        fetcher: Arc<dyn PageFetcher<R>>,
        config: SessionConfig,
    ) -> Self {
        let session = Self::new(controller, fetcher, config);
        session.refresh();
        session
    }

    /// Mounts the table with a first page that is already being fetched,
    /// e.g. one started alongside the server render.
    ///
    /// `initial` must produce the page for the controller's current
    /// location. Later pages come from `fetcher`.
    pub fn mount_with_initial<F>(
        controller: TableController,
        fetcher: Arc<dyn PageFetcher<R>>,
        initial: F,
        config: SessionConfig,
    ) -> Self
    where
        F: Future<Output = Result<FetchResult<R>, FetchError>> + Send + 'static,
    {
        let session = Self::new(controller, fetcher, config);
        session.spawn_resolve(session.controller.location_state(), initial);
        session
    }

    fn new(
        controller: TableController,
        fetcher: Arc<dyn PageFetcher<R>>,
        config: SessionConfig,
    ) -> Self {
        let search = ControlledInput::with_value(controller.location_state().global_filter);
        Self {
            boundary: DataBoundary::new(config.skeleton.clone()),
            search,
            controller,
            fetcher,
            config,
        }
    }

    pub fn controller(&self) -> &TableController {
        &self.controller
    }

    pub fn boundary(&self) -> &DataBoundary<R> {
        &self.boundary
    }

    /// The global filter input.
    pub fn search(&self) -> &ControlledInput {
        &self.search
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Refetches the page for the current URL.
    pub fn refresh(&self) -> FetchKey {
        self.spawn_fetch(self.controller.location_state())
    }

    /// Follows URL changes until the returned [`SyncTask`] is dropped.
    ///
    /// Each change re-renders the search input from the controller state and
    /// refetches with the state decoded from the new URL.
    pub fn spawn_sync(&self) -> SyncTask {
        let session = self.clone();
        let mut query = self.controller.router().subscribe();
        let handle = tokio::spawn(async move {
            while query.changed().await.is_ok() {
                let location = query.borrow_and_update().clone();
                log::debug!("Location changed to ?{}", location);

                session
                    .search
                    .render(&session.controller.state().global_filter);
                session.refresh();
            }
            log::debug!("Router closed, session sync stopped");
        });
        SyncTask { handle }
    }

    /// Feeds a key press to the search input.
    ///
    /// Returns `true` if the text changed and a global filter commit was made.
    pub fn on_search_key(&self, key: EditKey) -> bool {
        match self.search.on_key(key) {
            Some(change) => {
                self.controller.on_global_filter_change(change.value);
                true
            }
            None => false,
        }
    }

    /// Pagination button state, using the page count of the resolved fetch.
    pub fn controls(&self) -> PaginationControls {
        self.controller
            .pagination_controls(self.boundary.page_count())
    }

    /// What the table body should render.
    pub fn body(&self, column_count: usize) -> BodyView<R> {
        self.boundary.body(column_count)
    }

    /// Waits until commits are written, the pending flag is clear and the
    /// current fetch has settled.
    pub async fn wait_idle(&self) {
        self.controller.settled().await;
        self.controller.pending().wait_idle().await;
        self.boundary.wait_settled().await;
    }

    fn spawn_fetch(&self, state: TableState) -> FetchKey {
        let fetcher = Arc::clone(&self.fetcher);
        let request = state.clone();
        self.spawn_resolve(state, async move { fetcher.get_page(&request).await })
    }

    /// Starts a fetch in the boundary and finishes the transition for
    /// `state` once it resolves.
    fn spawn_resolve<F>(&self, state: TableState, fetch: F) -> FetchKey
    where
        F: Future<Output = Result<FetchResult<R>, FetchError>> + Send + 'static,
    {
        let key = self.boundary.begin();
        log::debug!(
            "Fetching page {} ({} rows) as {}",
            state.page_index(),
            state.page_size(),
            key
        );

        let session = self.clone();
        tokio::spawn(async move {
            let result = match session.config.fetch_timeout {
                Some(limit) => tokio::time::timeout(limit, fetch)
                    .await
                    .unwrap_or(Err(FetchError::Timeout(limit))),
                None => fetch.await,
            };
            let page_count = result.as_ref().ok().map(|page| page.page_count());

            if !session.boundary.resolve(key, result) {
                return;
            }
            if session.config.clamp_page_index
                && let Some(page_count) = page_count
            {
                session.controller.clamp_to_page_count(page_count);
            }
            session.controller.finish_fetch(&state);
        });
        key
    }
}

impl<R> Clone for TableSession<R> {
    fn clone(&self) -> Self {
        Self {
            controller: self.controller.clone(),
            boundary: self.boundary.clone(),
            search: self.search.clone(),
            fetcher: Arc::clone(&self.fetcher),
            config: self.config.clone(),
        }
    }
}

impl<R> std::fmt::Debug for TableSession<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableSession")
            .field("controller", &self.controller)
            .field("key", &self.boundary.key())
            .field("search", &self.search.value())
            .finish()
    }
}
