//! In-process router.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use super::Router;
use crate::error::RouterError;

#[derive(Debug)]
struct History {
    entries: Vec<String>,
    cursor: usize,
}

/// A [`Router`] that keeps its location in memory.
///
/// Supports back/forward navigation over pushed entries. Clones share the
/// same location.
///
/// # Example
///
/// ```
/// use tablesync_lib::router::{MemoryRouter, Router};
///
/// let router = MemoryRouter::new("?pageIndex=1");
/// router.push("pageIndex=2").unwrap();
/// assert!(router.back());
/// assert_eq!(router.query(), "pageIndex=1");
/// ```
#[derive(Debug, Clone)]
pub struct MemoryRouter {
    history: Arc<Mutex<History>>,
    current: Arc<watch::Sender<String>>,
    closed: Arc<AtomicBool>,
}

impl MemoryRouter {
    /// Creates a router at the given query. A leading `?` is dropped.
    pub fn new(query: impl Into<String>) -> Self {
        let query = normalize(query.into());
        let (current, _) = watch::channel(query.clone());
        Self {
            history: Arc::new(Mutex::new(History {
                entries: vec![query],
                cursor: 0,
            })),
            current: Arc::new(current),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Goes back one history entry. Returns `false` at the oldest entry.
    pub fn back(&self) -> bool {
        self.step(|cursor, _| cursor.checked_sub(1))
    }

    /// Goes forward one history entry. Returns `false` at the newest entry.
    pub fn forward(&self) -> bool {
        self.step(|cursor, len| (cursor + 1 < len).then_some(cursor + 1))
    }

    /// All history entries, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .map(|guard| guard.entries.clone())
            .unwrap_or_default()
    }

    /// Number of live [`subscribe`](Router::subscribe) receivers.
    pub fn subscriber_count(&self) -> usize {
        self.current.receiver_count()
    }

    /// Rejects all further writes with [`RouterError::Closed`].
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn step(&self, next: impl FnOnce(usize, usize) -> Option<usize>) -> bool {
        let Ok(mut guard) = self.history.lock() else {
            return false;
        };
        let Some(cursor) = next(guard.cursor, guard.entries.len()) else {
            return false;
        };
        guard.cursor = cursor;
        let query = guard.entries[cursor].clone();
        drop(guard);
        self.publish(query);
        true
    }

    fn publish(&self, query: String) {
        self.current.send_if_modified(|current| {
            if *current == query {
                return false;
            }
            *current = query;
            true
        });
    }

    fn check_open(&self) -> Result<(), RouterError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(RouterError::Closed);
        }
        Ok(())
    }
}

impl Router for MemoryRouter {
    fn query(&self) -> String {
        self.current.borrow().clone()
    }

    fn replace(&self, query: &str) -> Result<(), RouterError> {
        self.check_open()?;
        let query = normalize(query.to_string());
        if let Ok(mut guard) = self.history.lock() {
            let cursor = guard.cursor;
            guard.entries[cursor] = query.clone();
        }
        self.publish(query);
        Ok(())
    }

    fn push(&self, query: &str) -> Result<(), RouterError> {
        self.check_open()?;
        let query = normalize(query.to_string());
        if *self.current.borrow() == query {
            return Ok(());
        }
        if let Ok(mut guard) = self.history.lock() {
            let cursor = guard.cursor + 1;
            guard.entries.truncate(cursor);
            guard.entries.push(query.clone());
            guard.cursor = cursor;
        }
        self.publish(query);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<String> {
        self.current.subscribe()
    }
}

fn normalize(query: String) -> String {
    match query.strip_prefix('?') {
        Some(rest) => rest.to_string(),
        None => query,
    }
}
