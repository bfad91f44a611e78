//! Async data boundary for the table body.
//!
//! The boundary tracks one fetch at a time. Each fetch gets a fresh
//! [`FetchKey`]; starting a new fetch throws away whatever the previous one
//! showed, and a late result for an old key is ignored. While a fetch is
//! pending the body renders skeleton rows, the header and pagination
//! controls are unaffected.

mod fetch;

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

pub use fetch::{FetchResult, FnFetcher, PageFetcher, fetch_fn};

use crate::error::FetchError;

/// Identifies one fetch. Strictly increasing per boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchKey(u64);

impl fmt::Display for FetchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fetch-{}", self.0)
    }
}

/// State of the current fetch.
#[derive(Debug)]
pub enum BoundaryState<R> {
    /// Waiting for rows.
    Pending { key: FetchKey },
    /// Rows arrived.
    Resolved {
        key: FetchKey,
        result: Arc<FetchResult<R>>,
    },
    /// The fetch failed. Rendered by the host's error boundary.
    Failed { key: FetchKey, error: FetchError },
}

impl<R> BoundaryState<R> {
    pub fn key(&self) -> FetchKey {
        match self {
            Self::Pending { key } | Self::Resolved { key, .. } | Self::Failed { key, .. } => *key,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Get the resolved result, if any
    pub fn result(&self) -> Option<&Arc<FetchResult<R>>> {
        match self {
            Self::Resolved { result, .. } => Some(result),
            _ => None,
        }
    }

    /// Get the error, if the fetch failed
    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl<R> Clone for BoundaryState<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Pending { key } => Self::Pending { key: *key },
            Self::Resolved { key, result } => Self::Resolved {
                key: *key,
                result: Arc::clone(result),
            },
            Self::Failed { key, error } => Self::Failed {
                key: *key,
                error: error.clone(),
            },
        }
    }
}

/// Placeholder configuration for the table body.
///
/// # Example
///
/// ```
/// use tablesync_lib::boundary::SkeletonConfig;
///
/// let skeleton = SkeletonConfig::default()
///     .with_rows(5)
///     .with_no_results("Nothing here");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkeletonConfig {
    /// Placeholder rows shown while pending.
    ///
    /// Default: 10
    pub rows: usize,

    /// Placeholder columns shown while pending.
    ///
    /// Default: 5
    pub columns: usize,

    /// Text of the row shown for an empty result.
    ///
    /// Default: "No results."
    pub no_results: String,
}

impl Default for SkeletonConfig {
    fn default() -> Self {
        Self {
            rows: 10,
            columns: 5,
            no_results: "No results.".to_string(),
        }
    }
}

impl SkeletonConfig {
    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = rows;
        self
    }

    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_no_results(mut self, text: impl Into<String>) -> Self {
        self.no_results = text.into();
        self
    }
}

/// What the table body should show.
#[derive(Debug)]
pub enum BodyView<R> {
    /// Placeholder grid while rows are loading.
    Skeleton { rows: usize, columns: usize },
    /// Data rows.
    Rows(Arc<FetchResult<R>>),
    /// A single row spanning every column for an empty result.
    NoResults { colspan: usize, message: String },
    /// The fetch failed.
    Failed(FetchError),
}

impl<R> BodyView<R> {
    /// Number of data rows shown. Placeholder rows do not count.
    pub fn row_count(&self) -> usize {
        match self {
            Self::Rows(result) => result.len(),
            _ => 0,
        }
    }

    /// Data rows shown, empty for every other view.
    pub fn rows(&self) -> &[R] {
        match self {
            Self::Rows(result) => result.rows(),
            _ => &[],
        }
    }

    pub fn is_skeleton(&self) -> bool {
        matches!(self, Self::Skeleton { .. })
    }
}

/// Suspends the table body on the current fetch.
///
/// Cheap to clone; clones share the same state.
#[derive(Debug)]
pub struct DataBoundary<R> {
    state: Arc<watch::Sender<BoundaryState<R>>>,
    next_key: Arc<AtomicU64>,
    skeleton: SkeletonConfig,
}

impl<R> DataBoundary<R> {
    /// Creates a boundary waiting for its first fetch.
    pub fn new(skeleton: SkeletonConfig) -> Self {
        let (state, _) = watch::channel(BoundaryState::Pending { key: FetchKey(0) });
        Self {
            state: Arc::new(state),
            next_key: Arc::new(AtomicU64::new(1)),
            skeleton,
        }
    }

    pub fn skeleton(&self) -> &SkeletonConfig {
        &self.skeleton
    }

    /// Starts a new fetch and returns its key.
    ///
    /// Whatever was shown before is dropped; the body renders the skeleton
    /// until [`resolve`](Self::resolve) is called with the returned key.
    pub fn begin(&self) -> FetchKey {
        let key = FetchKey(self.next_key.fetch_add(1, Ordering::SeqCst));
        self.state.send_replace(BoundaryState::Pending { key });
        log::debug!("Boundary started {}", key);
        key
    }

    /// Delivers the outcome of a fetch.
    ///
    /// Returns `false` and changes nothing if `key` has been superseded.
    pub fn resolve(&self, key: FetchKey, result: Result<FetchResult<R>, FetchError>) -> bool {
        let mut result = Some(result);
        let applied = self.state.send_if_modified(|state| {
            if state.key() != key || !state.is_pending() {
                return false;
            }
            let Some(result) = result.take() else {
                return false;
            };
            *state = match result {
                Ok(result) => BoundaryState::Resolved {
                    key,
                    result: Arc::new(result),
                },
                Err(error) => {
                    log::warn!("Fetch {} failed: {}", key, error);
                    BoundaryState::Failed { key, error }
                }
            };
            true
        });

        if applied {
            log::debug!("Boundary resolved {}", key);
        } else {
            log::debug!("Dropping result of superseded {}", key);
        }
        applied
    }

    /// Starts a fetch and resolves it when the future completes.
    pub fn track<F>(&self, fetch: F) -> FetchKey
    where
        R: Send + Sync + 'static,
        F: Future<Output = Result<FetchResult<R>, FetchError>> + Send + 'static,
    {
        let key = self.begin();
        let boundary = self.clone();
        tokio::spawn(async move {
            let result = fetch.await;
            boundary.resolve(key, result);
        });
        key
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> BoundaryState<R> {
        self.state.borrow().clone()
    }

    pub fn key(&self) -> FetchKey {
        self.state.borrow().key()
    }

    pub fn is_pending(&self) -> bool {
        self.state.borrow().is_pending()
    }

    /// Page count of the resolved fetch, unknown while pending or failed.
    pub fn page_count(&self) -> Option<usize> {
        self.state.borrow().result().map(|result| result.page_count())
    }

    /// What the body should render, given the table's column count.
    pub fn body(&self, column_count: usize) -> BodyView<R> {
        match self.state() {
            BoundaryState::Pending { .. } => BodyView::Skeleton {
                rows: self.skeleton.rows,
                columns: self.skeleton.columns,
            },
            BoundaryState::Resolved { result, .. } if result.is_empty() => BodyView::NoResults {
                colspan: column_count,
                message: self.skeleton.no_results.clone(),
            },
            BoundaryState::Resolved { result, .. } => BodyView::Rows(result),
            BoundaryState::Failed { error, .. } => BodyView::Failed(error),
        }
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<BoundaryState<R>> {
        self.state.subscribe()
    }

    /// Waits until the current fetch is no longer pending.
    pub async fn wait_settled(&self) -> BoundaryState<R> {
        let mut state = self.state.subscribe();
        let settled = state
            .wait_for(|state| !state.is_pending())
            .await
            .map(|state| state.clone());
        settled.unwrap_or_else(|_| self.state())
    }
}

impl<R> Clone for DataBoundary<R> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            next_key: Arc::clone(&self.next_key),
            skeleton: self.skeleton.clone(),
        }
    }
}

impl<R> Default for DataBoundary<R> {
    fn default() -> Self {
        Self::new(SkeletonConfig::default())
    }
}
