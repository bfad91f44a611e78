//! Routing seam: where the table reads and writes its query string.
//!
//! - [`Router`] - the trait a host navigation primitive implements
//! - [`MemoryRouter`] - an in-process router with a history stack

mod memory;

pub use memory::MemoryRouter;

use tokio::sync::watch;

use crate::error::RouterError;

/// How a URL write is recorded in history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryMode {
    /// Overwrite the current history entry.
    #[default]
    Replace,
    /// Add a new history entry.
    Push,
}

/// Reads and writes the query string of the current location.
///
/// Writes must not reload the page. Subscribers are notified only when the
/// query actually changes.
pub trait Router: Send + Sync {
    /// Current query string, without a leading `?`.
    fn query(&self) -> String;

    /// Replaces the current history entry's query.
    fn replace(&self, query: &str) -> Result<(), RouterError>;

    /// Pushes a new history entry with the given query.
    fn push(&self, query: &str) -> Result<(), RouterError>;

    /// Subscribes to query changes.
    fn subscribe(&self) -> watch::Receiver<String>;

    /// Writes a query using the given history mode.
    fn navigate(&self, mode: HistoryMode, query: &str) -> Result<(), RouterError> {
        match mode {
            HistoryMode::Replace => self.replace(query),
            HistoryMode::Push => self.push(query),
        }
    }
}
