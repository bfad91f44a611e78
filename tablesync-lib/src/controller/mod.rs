//! Table state controller.
//!
//! [`TableController`] is the single owner of a table's state. The grid reads
//! state through it and reports every user change through one of the four
//! `on_*_change` entry points. Each change is encoded into the URL inside a
//! non-blocking transition; the resulting URL change is what triggers the
//! refetch.

mod config;
mod controls;
mod transition;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

pub use config::ControllerConfig;
pub use controls::PaginationControls;
pub use transition::PendingTransition;

use crate::codec::UrlStateCodec;
use crate::router::Router;
use crate::state::{ColumnFilters, PaginationState, Sorting, TableState, Updater};
use transition::Transitions;

struct ControllerInner {
    router: Arc<dyn Router>,
    codec: UrlStateCodec,
    initial_state: TableState,
    transitions: Transitions,
    pending: PendingTransition,
}

/// Owns a table's state and keeps it in sync with the URL.
///
/// Cheap to clone; clones share the same state.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use tablesync_lib::controller::{ControllerConfig, TableController};
/// use tablesync_lib::router::{MemoryRouter, Router};
/// use tablesync_lib::state::TableState;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let router = MemoryRouter::new("pageIndex=4");
/// let controller = TableController::new(
///     Arc::new(router.clone()),
///     TableState::default(),
///     ControllerConfig::default(),
/// );
///
/// controller.on_global_filter_change("invoice");
/// controller.settled().await;
///
/// let state = controller.state();
/// assert_eq!(state.global_filter, "invoice");
/// assert_eq!(state.page_index(), 0);
/// assert!(router.query().contains("globalFilter=invoice"));
/// # }
/// ```
#[derive(Clone)]
pub struct TableController {
    inner: Arc<ControllerInner>,
}

impl TableController {
    /// Creates a controller over a router.
    ///
    /// `initial_state` is the state the first page was rendered with. Fields
    /// missing from the URL fall back to it.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(router: Arc<dyn Router>, initial_state: TableState, config: ControllerConfig) -> Self {
        let codec = UrlStateCodec::new(config.codec);
        let pending = PendingTransition::new();
        let transitions = Transitions::spawn(
            Arc::clone(&router),
            codec.clone(),
            config.history,
            pending.clone(),
        );
        Self {
            inner: Arc::new(ControllerInner {
                router,
                codec,
                initial_state,
                transitions,
                pending,
            }),
        }
    }

    // -------------------------------------------------------------------------
    // Read methods
    // -------------------------------------------------------------------------

    /// The state the grid should display.
    ///
    /// While a commit is still queued this is the committed state, so that
    /// rapid updates build on each other. Otherwise it is
    /// [`location_state`](Self::location_state).
    pub fn state(&self) -> TableState {
        self.inner
            .transitions
            .in_flight()
            .unwrap_or_else(|| self.location_state())
    }

    /// The state decoded from the current URL, each missing field taken from
    /// the initial state.
    pub fn location_state(&self) -> TableState {
        self.inner
            .codec
            .decode_partial(&self.inner.router.query())
            .or(&self.inner.initial_state)
    }

    pub fn initial_state(&self) -> &TableState {
        &self.inner.initial_state
    }

    pub fn codec(&self) -> &UrlStateCodec {
        &self.inner.codec
    }

    pub fn router(&self) -> &Arc<dyn Router> {
        &self.inner.router
    }

    pub fn pending(&self) -> &PendingTransition {
        &self.inner.pending
    }

    /// Whether a committed change is still waiting for its data.
    pub fn is_pending(&self) -> bool {
        self.inner.pending.is_pending()
    }

    /// Button state for the pagination controls.
    pub fn pagination_controls(&self, page_count: Option<usize>) -> PaginationControls {
        let pagination = self.state().pagination;
        PaginationControls {
            page_index: pagination.page_index,
            page_count,
            can_previous: pagination.can_previous(),
            can_next: pagination.can_next(page_count),
            pending: self.is_pending(),
        }
    }

    // -------------------------------------------------------------------------
    // Grid callbacks
    // -------------------------------------------------------------------------

    /// The sort specification changed.
    pub fn on_sorting_change(&self, update: impl Into<Updater<Sorting>>) {
        let update = update.into();
        self.commit("sorting", |state| {
            state.sorting = update.apply(&state.sorting);
        });
    }

    /// The column filters changed.
    pub fn on_column_filters_change(&self, update: impl Into<Updater<ColumnFilters>>) {
        let update = update.into();
        self.commit("columnFilters", |state| {
            state.column_filters = update.apply(&state.column_filters);
        });
    }

    /// The search text changed. Always returns to the first page.
    pub fn on_global_filter_change(&self, value: impl Into<String>) {
        let value = value.into();
        self.commit("globalFilter", |state| {
            state.global_filter = value;
            state.pagination.page_index = 0;
        });
    }

    /// The page index or page size changed.
    pub fn on_pagination_change(&self, update: impl Into<Updater<PaginationState>>) {
        let update = update.into();
        self.commit("pagination", |state| {
            let next = update.apply(&state.pagination);
            state.pagination = PaginationState::new(next.page_index, next.page_size);
        });
    }

    // -------------------------------------------------------------------------
    // Grid conveniences
    // -------------------------------------------------------------------------

    /// Cycles a column through ascending, descending and unsorted.
    pub fn toggle_sorting(&self, column: impl Into<String>, multi: bool) {
        let column = column.into();
        self.on_sorting_change(Updater::func(move |sorting: &Sorting| {
            sorting.toggled(&column, multi)
        }));
    }

    /// Sets one column's filter. A blank value removes it.
    pub fn set_column_filter(&self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        self.on_column_filters_change(Updater::func(move |filters: &ColumnFilters| {
            filters.clone().with(column, value)
        }));
    }

    /// Moves to a page, clamped to `page_count` when known.
    pub fn set_page_index(&self, page_index: usize, page_count: Option<usize>) {
        self.on_pagination_change(Updater::func(move |pagination: &PaginationState| {
            pagination.with_page_index(page_index, page_count)
        }));
    }

    pub fn next_page(&self, page_count: Option<usize>) {
        self.on_pagination_change(Updater::func(move |pagination: &PaginationState| {
            pagination.with_page_index(pagination.page_index.saturating_add(1), page_count)
        }));
    }

    pub fn previous_page(&self) {
        self.on_pagination_change(Updater::func(|pagination: &PaginationState| {
            pagination.with_page_index(pagination.page_index.saturating_sub(1), None)
        }));
    }

    /// Changes the page size, keeping the first visible row on screen.
    pub fn set_page_size(&self, page_size: usize) {
        self.on_pagination_change(Updater::func(move |pagination: &PaginationState| {
            pagination.with_page_size(page_size)
        }));
    }

    /// Moves an out-of-range page index back inside `0..page_count`.
    ///
    /// A link shared before the data shrank can point past the last page.
    /// Such an index is rewritten to the last page (or the first when there
    /// are no pages) through a regular pagination commit. Returns `true` if a
    /// commit was made.
    pub fn clamp_to_page_count(&self, page_count: usize) -> bool {
        let pagination = self.state().pagination;
        let clamped = pagination.clamped(page_count);
        if clamped == pagination {
            return false;
        }
        log::debug!(
            "Clamping page index {} to {} ({} pages)",
            pagination.page_index,
            clamped.page_index,
            page_count
        );
        self.on_pagination_change(clamped);
        true
    }

    /// Waits until every commit made so far has been written to the URL.
    pub async fn settled(&self) {
        self.inner.transitions.settled().await;
    }

    /// Records that the data fetched for `state` is on screen.
    ///
    /// When no commit is queued and the URL already decodes to `state`, the
    /// location moved without one of our commits (back/forward, a host
    /// write) and the transition ends here.
    pub(crate) fn finish_fetch(&self, state: &TableState) {
        let pending = &self.inner.pending;
        if self.inner.transitions.in_flight().is_none() && *state == self.location_state() {
            pending.settle(state);
        } else {
            pending.resolve(state);
        }
    }

    fn commit(&self, field: &str, change: impl FnOnce(&mut TableState)) {
        let mut next = self.state();
        change(&mut next);
        log::debug!("Committing {} change", field);
        self.inner.transitions.start(next);
    }
}

impl fmt::Debug for TableController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableController")
            .field("state", &self.state())
            .field("pending", &self.is_pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use tokio::sync::watch;

    use super::*;
    use crate::error::RouterError;
    use crate::router::MemoryRouter;

    /// Rejects the first write, accepts the rest.
    struct RejectFirst {
        inner: MemoryRouter,
        rejected: AtomicBool,
    }

    impl RejectFirst {
        fn check(&self) -> Result<(), RouterError> {
            if self.rejected.swap(true, Ordering::SeqCst) {
                Ok(())
            } else {
                Err(RouterError::Rejected("busy".to_string()))
            }
        }
    }

    impl Router for RejectFirst {
        fn query(&self) -> String {
            self.inner.query()
        }

        fn replace(&self, query: &str) -> Result<(), RouterError> {
            self.check()?;
            self.inner.replace(query)
        }

        fn push(&self, query: &str) -> Result<(), RouterError> {
            self.check()?;
            self.inner.push(query)
        }

        fn subscribe(&self) -> watch::Receiver<String> {
            self.inner.subscribe()
        }
    }

    fn controller(query: &str, initial: TableState) -> (MemoryRouter, TableController) {
        let router = MemoryRouter::new(query);
        let controller =
            TableController::new(Arc::new(router.clone()), initial, ControllerConfig::default());
        (router, controller)
    }

    #[tokio::test]
    async fn test_location_falls_back_to_initial_state() {
        let initial = TableState::with_page_size(20).global_filter("server");
        let (_, controller) = controller("pageIndex=2", initial);

        let state = controller.state();
        assert_eq!(state.page_index(), 2);
        assert_eq!(state.page_size(), 20);
        assert_eq!(state.global_filter, "server");
    }

    #[tokio::test]
    async fn test_global_filter_resets_page_index() {
        let (router, controller) = controller("pageIndex=5&pageSize=10", TableState::default());
        controller.on_global_filter_change("x");
        assert_eq!(controller.state().page_index(), 0);

        controller.settled().await;
        let decoded = controller.codec().decode(&router.query());
        assert_eq!(decoded.global_filter, "x");
        assert_eq!(decoded.page_index(), 0);
    }

    #[tokio::test]
    async fn test_sorting_change_leaves_other_fields() {
        let (_, controller) = controller("globalFilter=abc&pageIndex=3", TableState::default());
        controller.toggle_sorting("title", false);
        controller.settled().await;

        let state = controller.state();
        assert_eq!(state.sorting, Sorting::asc("title"));
        assert_eq!(state.global_filter, "abc");
        assert_eq!(state.page_index(), 3);
    }

    #[tokio::test]
    async fn test_column_filter_helpers() {
        let (_, controller) = controller("", TableState::default());
        controller.set_column_filter("status", "todo");
        controller.set_column_filter("priority", "high");
        controller.set_column_filter("status", "");
        controller.settled().await;

        let filters = controller.state().column_filters;
        assert_eq!(filters.len(), 1);
        assert_eq!(filters.get("priority"), Some(&Value::from("high")));
    }

    #[tokio::test]
    async fn test_page_navigation() {
        let (_, controller) = controller("", TableState::default());
        controller.next_page(Some(2));
        controller.next_page(Some(2));
        assert_eq!(controller.state().page_index(), 1);

        controller.previous_page();
        controller.previous_page();
        assert_eq!(controller.state().page_index(), 0);

        controller.set_page_index(3, None);
        controller.set_page_size(20);
        controller.settled().await;
        assert_eq!(controller.state().pagination, PaginationState::new(1, 20));
    }

    #[tokio::test]
    async fn test_clamp_to_page_count() {
        let (router, controller) = controller("pageIndex=9", TableState::default());
        assert!(controller.clamp_to_page_count(4));
        controller.settled().await;
        assert_eq!(controller.state().page_index(), 3);
        assert!(router.query().contains("pageIndex=3"));

        assert!(!controller.clamp_to_page_count(4));
    }

    #[tokio::test]
    async fn test_pagination_controls() {
        let (_, controller) = controller("pageIndex=1", TableState::default());
        let controls = controller.pagination_controls(Some(2));
        assert!(controls.previous_enabled());
        assert!(!controls.next_enabled());

        let controls = controller.pagination_controls(None);
        assert!(controls.next_enabled());
    }

    #[tokio::test]
    async fn test_failed_write_releases_pending() {
        let (router, controller) = controller("", TableState::default());
        router.close();
        controller.on_global_filter_change("x");
        assert!(controller.is_pending());

        controller.settled().await;
        assert!(!controller.is_pending());
        assert_eq!(controller.state().global_filter, "");
    }

    #[tokio::test]
    async fn test_failed_write_keeps_newer_commit_pending() {
        let router = MemoryRouter::new("");
        let flaky = RejectFirst {
            inner: router.clone(),
            rejected: AtomicBool::new(false),
        };
        let controller =
            TableController::new(Arc::new(flaky), TableState::default(), ControllerConfig::default());

        controller.on_global_filter_change("a");
        controller.on_global_filter_change("ab");
        controller.settled().await;

        assert!(router.query().contains("globalFilter=ab"));
        assert!(controller.is_pending());

        controller.finish_fetch(&controller.state());
        assert!(!controller.is_pending());
    }

    #[tokio::test]
    async fn test_navigation_without_commit_ends_transition() {
        let (router, controller) = controller("", TableState::default());
        controller.on_global_filter_change("x");
        controller.settled().await;

        // The host moves elsewhere before the committed data arrives.
        router.replace("pageIndex=3").unwrap();
        let location = controller.location_state();
        controller.finish_fetch(&location);
        assert!(!controller.is_pending());
    }

    #[tokio::test]
    async fn test_stale_fetch_does_not_end_transition() {
        let (_, controller) = controller("", TableState::default());
        controller.on_global_filter_change("x");
        controller.settled().await;

        controller.finish_fetch(&TableState::default());
        assert!(controller.is_pending());
    }
}
