//! End-to-end flows through a mounted table session.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use tablesync_lib::boundary::{BodyView, FetchResult, PageFetcher, SkeletonConfig, fetch_fn};
use tablesync_lib::controller::{ControllerConfig, TableController};
use tablesync_lib::error::FetchError;
use tablesync_lib::input::EditKey;
use tablesync_lib::router::{HistoryMode, MemoryRouter, Router};
use tablesync_lib::session::{SessionConfig, TableSession};
use tablesync_lib::state::{PaginationState, Sorting, TableState, Updater};

fn mount<R>(
    router: &MemoryRouter,
    history: HistoryMode,
    fetcher: impl PageFetcher<R> + 'static,
    config: SessionConfig,
) -> TableSession<R>
where
    R: Send + Sync + 'static,
{
    let controller = TableController::new(
        Arc::new(router.clone()),
        TableState::default(),
        ControllerConfig::default().with_history(history),
    );
    let fetcher: Arc<dyn PageFetcher<R>> = Arc::new(fetcher);
    TableSession::mount(controller, fetcher, config)
}

/// Each page holds a single row: its own index.
fn page_numbers(page_count: usize) -> impl PageFetcher<usize> {
    fetch_fn(move |state: TableState| async move {
        Ok::<_, FetchError>(FetchResult::new(vec![state.page_index()], page_count))
    })
}

/// Waits until the boundary shows exactly `rows`.
async fn wait_for_rows<R>(session: &TableSession<R>, rows: &[R])
where
    R: PartialEq + Send + Sync + 'static,
{
    let mut state = session.boundary().subscribe();
    let shown = tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|state| state.result().is_some_and(|result| result.rows() == rows)),
    )
    .await
    .is_ok_and(|shown| shown.is_ok());
    assert!(shown, "rows never appeared");
}

// =============================================================================
// Pagination
// =============================================================================

#[tokio::test]
async fn test_pagination_writes_url_and_updates_controls() {
    let router = MemoryRouter::new("");
    let session = mount(&router, HistoryMode::Replace, page_numbers(2), SessionConfig::default());
    let _sync = session.spawn_sync();
    session.wait_idle().await;

    let controls = session.controls();
    assert!(!controls.previous_enabled());
    assert!(controls.next_enabled());

    session
        .controller()
        .on_pagination_change(PaginationState::new(1, 10));
    assert!(session.controller().is_pending());
    session.wait_idle().await;

    assert!(router.query().contains("pageIndex=1"));
    let controls = session.controls();
    assert!(controls.previous_enabled());
    assert!(!controls.next_enabled());
    assert_eq!(session.body(3).rows(), &[1]);
}

#[tokio::test]
async fn test_rapid_updates_land_in_order() {
    let router = MemoryRouter::new("");
    let session = mount(&router, HistoryMode::Push, page_numbers(10), SessionConfig::default());
    let _sync = session.spawn_sync();

    let controller = session.controller();
    let step = |pagination: &PaginationState| PaginationState::new(pagination.page_index + 1, 10);
    controller.on_pagination_change(Updater::func(step));
    controller.on_pagination_change(Updater::func(step));
    session.wait_idle().await;

    let codec = controller.codec();
    let pages: Vec<usize> = router
        .history()
        .iter()
        .map(|query| codec.decode(query).page_index())
        .collect();
    assert_eq!(pages, vec![0, 1, 2]);
    assert_eq!(session.body(1).rows(), &[2]);
}

#[tokio::test]
async fn test_global_filter_returns_to_first_page() {
    let router = MemoryRouter::new("pageIndex=4&pageSize=20");
    let session = mount(&router, HistoryMode::Replace, page_numbers(10), SessionConfig::default());
    let _sync = session.spawn_sync();
    session.wait_idle().await;

    session.controller().on_global_filter_change("overdue");
    session.wait_idle().await;

    let state = session.controller().state();
    assert_eq!(state.global_filter, "overdue");
    assert_eq!(state.pagination, PaginationState::new(0, 20));
    assert_eq!(session.body(1).rows(), &[0]);
}

#[tokio::test]
async fn test_foreign_params_survive_commit() {
    let router = MemoryRouter::new("?tab=open&pageIndex=0");
    let session = mount(&router, HistoryMode::Replace, page_numbers(1), SessionConfig::default());
    let _sync = session.spawn_sync();
    session.controller().on_sorting_change(Sorting::desc("due"));
    session.wait_idle().await;

    let query = router.query();
    assert!(query.starts_with("tab=open&"), "got {}", query);
    assert_eq!(session.controller().state().sorting, Sorting::desc("due"));
}

#[tokio::test]
async fn test_back_and_forward_refetch() {
    let router = MemoryRouter::new("");
    let session = mount(&router, HistoryMode::Push, page_numbers(5), SessionConfig::default());
    let _sync = session.spawn_sync();
    session.wait_idle().await;

    session.controller().next_page(Some(5));
    session.wait_idle().await;
    assert_eq!(session.body(1).rows(), &[1]);

    assert!(router.back());
    wait_for_rows(&session, &[0]).await;
    assert_eq!(session.controller().state().page_index(), 0);

    assert!(router.forward());
    wait_for_rows(&session, &[1]).await;
    assert!(!session.controller().is_pending());
}

#[tokio::test]
async fn test_back_after_commit_clears_pending() {
    let router = MemoryRouter::new("");
    let session = mount(&router, HistoryMode::Push, page_numbers(5), SessionConfig::default());
    let _sync = session.spawn_sync();
    session.wait_idle().await;

    session.controller().next_page(Some(5));
    session.wait_idle().await;

    assert!(router.back());
    wait_for_rows(&session, &[0]).await;
    assert!(!session.controller().is_pending());
    let controls = session.controls();
    assert!(!controls.previous_enabled());
    assert!(controls.next_enabled());

    let idle = tokio::time::timeout(Duration::from_secs(2), session.wait_idle()).await;
    assert!(idle.is_ok(), "session never went idle after back()");
}

// =============================================================================
// Data boundary
// =============================================================================

#[tokio::test]
async fn test_skeleton_until_rows_resolve() {
    let gate = Arc::new(Notify::new());
    let fetcher = {
        let gate = Arc::clone(&gate);
        fetch_fn(move |_state: TableState| {
            let gate = Arc::clone(&gate);
            async move {
                gate.notified().await;
                Ok::<_, FetchError>(FetchResult::new(vec!["r1", "r2"], 3))
            }
        })
    };
    let config = SessionConfig::default()
        .with_skeleton(SkeletonConfig::default().with_rows(7).with_columns(4));

    let router = MemoryRouter::new("");
    let session = mount(&router, HistoryMode::Replace, fetcher, config);

    match session.body(4) {
        BodyView::Skeleton { rows, columns } => {
            assert_eq!(rows, 7);
            assert_eq!(columns, 4);
        }
        other => panic!("expected skeleton, got {:?}", other),
    }

    gate.notify_one();
    session.wait_idle().await;

    let body = session.body(4);
    assert!(!body.is_skeleton());
    assert_eq!(body.row_count(), 2);
    assert_eq!(body.rows(), &["r1", "r2"]);
    assert_eq!(session.boundary().page_count(), Some(3));
}

#[tokio::test(start_paused = true)]
async fn test_stale_fetch_is_ignored() {
    let fetcher = fetch_fn(|state: TableState| async move {
        let delay = if state.page_index() == 0 { 500 } else { 10 };
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok::<_, FetchError>(FetchResult::new(vec![state.page_index()], 5))
    });
    let router = MemoryRouter::new("");
    let session = mount(&router, HistoryMode::Replace, fetcher, SessionConfig::default());
    let _sync = session.spawn_sync();
    let first = session.boundary().key();

    session.controller().next_page(None);
    session.wait_idle().await;
    assert!(session.boundary().key() > first);
    assert_eq!(session.body(1).rows(), &[1]);

    // The first page's fetch finishes late and must not replace the newer page.
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(session.body(1).rows(), &[1]);
}

#[tokio::test]
async fn test_empty_result_shows_single_row() {
    let fetcher = fetch_fn(|_state: TableState| async {
        Ok::<_, FetchError>(FetchResult::<String>::empty())
    });
    let router = MemoryRouter::new("globalFilter=nothing");
    let session = mount(&router, HistoryMode::Replace, fetcher, SessionConfig::default());
    session.wait_idle().await;

    match session.body(6) {
        BodyView::NoResults { colspan, message } => {
            assert_eq!(colspan, 6);
            assert_eq!(message, "No results.");
        }
        other => panic!("expected no-results row, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_failure_reaches_error_boundary() {
    let fetcher = fetch_fn(|_state: TableState| async {
        Err::<FetchResult<usize>, _>(FetchError::backend("service unavailable"))
    });
    let router = MemoryRouter::new("");
    let session = mount(&router, HistoryMode::Replace, fetcher, SessionConfig::default());
    let _sync = session.spawn_sync();

    session.controller().on_global_filter_change("x");
    session.wait_idle().await;

    assert!(session.boundary().state().is_failed());
    assert!(matches!(session.body(2), BodyView::Failed(FetchError::Backend(_))));
    assert!(!session.controller().is_pending());
}

#[tokio::test(start_paused = true)]
async fn test_hung_fetch_times_out() {
    let fetcher = fetch_fn(|_state: TableState| async {
        std::future::pending::<Result<FetchResult<usize>, FetchError>>().await
    });
    let router = MemoryRouter::new("");
    let config = SessionConfig::default().with_fetch_timeout(Duration::from_secs(5));
    let session = mount(&router, HistoryMode::Replace, fetcher, config);
    session.wait_idle().await;

    let error = session.boundary().state().error().cloned();
    assert_eq!(error, Some(FetchError::Timeout(Duration::from_secs(5))));
}

// =============================================================================
// Search input
// =============================================================================

#[tokio::test]
async fn test_search_caret_survives_url_round_trip() {
    let fetcher = fetch_fn(|state: TableState| async move {
        Ok::<_, FetchError>(FetchResult::new(vec![state.global_filter], 5))
    });
    let router = MemoryRouter::new("globalFilter=helo&pageIndex=3");
    let session = mount(&router, HistoryMode::Replace, fetcher, SessionConfig::default());
    let _sync = session.spawn_sync();
    session.wait_idle().await;

    let search = session.search();
    assert_eq!(search.value(), "helo");
    assert_eq!(search.caret(), 4);

    assert!(!session.on_search_key(EditKey::Left));
    assert!(session.on_search_key(EditKey::Char('l')));
    session.wait_idle().await;

    assert_eq!(search.value(), "hello");
    assert_eq!(search.caret(), 4);
    assert_eq!(session.controller().state().page_index(), 0);
    assert!(router.query().contains("globalFilter=hello"));

    // A shorter value from elsewhere clamps the caret.
    router.replace("globalFilter=he").unwrap();
    wait_for_rows(&session, &["he".to_string()]).await;
    assert_eq!(search.value(), "he");
    assert_eq!(search.caret(), 2);
    assert!(!session.controller().is_pending());
}
