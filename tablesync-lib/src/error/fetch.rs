//! Data fetch error types

use std::time::Duration;

/// Errors produced while fetching a page of rows.
///
/// The boundary holds on to the error so the host can render it, which is why
/// this type is `Clone`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The data source reported a failure.
    #[error("Backend error: {0}")]
    Backend(String),

    /// The fetch did not complete in time.
    #[error("Timeout after {0:?}")]
    Timeout(Duration),
}

impl FetchError {
    /// Creates a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// Returns `true` if this is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<String> for FetchError {
    fn from(message: String) -> Self {
        Self::Backend(message)
    }
}

impl From<&str> for FetchError {
    fn from(message: &str) -> Self {
        Self::Backend(message.to_string())
    }
}
