mod cli;
mod error;
mod paths;
mod render;
mod tasks;

use std::fs::{self, File};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use serde_json::Value;
use simplelog::{Config, LevelFilter, WriteLogger};

use tablesync_lib::boundary::{BodyView, PageFetcher};
use tablesync_lib::codec::CodecConfig;
use tablesync_lib::controller::{ControllerConfig, TableController};
use tablesync_lib::input::EditKey;
use tablesync_lib::router::{HistoryMode, MemoryRouter, Router};
use tablesync_lib::session::{SessionConfig, TableSession};
use tablesync_lib::state::TableState;

use cli::Cli;
use error::CliError;
use tasks::{COLUMNS, Task, TaskStore};

/// Upper bound on how long one action may take to settle.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    paths::rotate_logs();
    let Some(path) = paths::log_file() else { return };
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    if let Ok(file) = File::create(&path) {
        let _ = WriteLogger::init(level, Config::default(), file);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    if cli.default_page_size == 0 || cli.page_size == Some(0) {
        return Err(CliError::InvalidPageSize);
    }

    let router = MemoryRouter::new(cli.query.clone());
    let controller = TableController::new(
        Arc::new(router.clone()),
        TableState::with_page_size(cli.default_page_size),
        ControllerConfig::default()
            .with_history(HistoryMode::Push)
            .with_codec(CodecConfig::default().with_default_page_size(cli.default_page_size)),
    );
    let store = TaskStore::seeded(cli.tasks).with_latency(Duration::from_millis(cli.latency_ms));
    if store.is_empty() {
        log::warn!("Task list is empty, every page will show no results");
    }
    log::info!("Mounting table over {} tasks at ?{}", store.len(), router.query());

    let fetcher: Arc<dyn PageFetcher<Task>> = Arc::new(store);
    let session = TableSession::mount(
        controller,
        fetcher,
        SessionConfig::default().with_fetch_timeout(Duration::from_secs(cli.timeout_secs)),
    );
    let _sync = session.spawn_sync();
    settle(&session).await?;

    if let Some(text) = &cli.search {
        type_search(&session, text);
        settle(&session).await?;
    }

    let controller = session.controller();
    for column in &cli.sort {
        controller.toggle_sorting(column.as_str(), cli.sort_multi);
    }
    for (column, raw) in &cli.filter {
        controller.set_column_filter(column.as_str(), filter_value(raw));
    }
    if let Some(page_size) = cli.page_size {
        controller.set_page_size(page_size);
    }
    settle(&session).await?;

    if let Some(page) = cli.page {
        let index = page.checked_sub(1).ok_or(CliError::InvalidPage)?;
        controller.set_page_index(index, session.boundary().page_count());
        settle(&session).await?;
    }
    for _ in 0..cli.next {
        controller.next_page(session.boundary().page_count());
        settle(&session).await?;
    }
    for _ in 0..cli.previous {
        controller.previous_page();
        settle(&session).await?;
    }
    for _ in 0..cli.back {
        go_back(&router, &session).await?;
    }

    print(&cli, &router, &session)
}

/// Replaces the search box contents key by key.
fn type_search(session: &TableSession<Task>, text: &str) {
    let search = session.search();
    session.on_search_key(EditKey::End);
    for _ in 0..search.len() {
        session.on_search_key(EditKey::Backspace);
    }
    for c in text.chars() {
        session.on_search_key(EditKey::Char(c));
    }
}

/// A filter value given on the command line: JSON if it parses, else text.
fn filter_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

async fn settle(session: &TableSession<Task>) -> Result<(), CliError> {
    tokio::time::timeout(SETTLE_TIMEOUT, session.wait_idle())
        .await
        .map_err(|_| CliError::Stalled)
}

/// Steps back one history entry and waits for its page.
async fn go_back(router: &MemoryRouter, session: &TableSession<Task>) -> Result<(), CliError> {
    let before = router.query();
    let key = session.boundary().key();
    if !router.back() || router.query() == before {
        log::info!("No earlier history entry");
        return Ok(());
    }

    let mut state = session.boundary().subscribe();
    let refetched = tokio::time::timeout(
        SETTLE_TIMEOUT,
        state.wait_for(|state| state.key() != key && !state.is_pending()),
    )
    .await
    .is_ok_and(|settled| settled.is_ok());
    if refetched { Ok(()) } else { Err(CliError::Stalled) }
}

fn print(cli: &Cli, router: &MemoryRouter, session: &TableSession<Task>) -> Result<(), CliError> {
    let body = session.body(COLUMNS.len());
    if let BodyView::Failed(error) = &body {
        return Err(error.clone().into());
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(body.rows())?);
        return Ok(());
    }

    render::print_location(&router.query());
    render::print_state(&session.controller().state());
    render::print_body(&body);
    render::print_controls(&session.controls());
    Ok(())
}
