//! Router error types

/// Errors returned by a [`Router`](crate::router::Router) when a URL write fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    /// The router no longer accepts navigation.
    #[error("Router is closed")]
    Closed,

    /// The host rejected the navigation.
    #[error("Navigation rejected: {0}")]
    Rejected(String),
}
