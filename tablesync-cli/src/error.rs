//! CLI errors.

use thiserror::Error;

use tablesync_lib::error::FetchError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid filter `{0}`, expected COLUMN=VALUE")]
    InvalidFilter(String),

    #[error("page numbers start at 1")]
    InvalidPage,

    #[error("page size must be at least 1")]
    InvalidPageSize,

    #[error("failed to load tasks: {0}")]
    Fetch(#[from] FetchError),

    #[error("failed to serialize rows: {0}")]
    Json(#[from] serde_json::Error),

    #[error("timed out waiting for the table to settle")]
    Stalled,
}
