//! Pagination button state.

/// Whether the previous/next page buttons can be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationControls {
    /// Current zero-based page index.
    pub page_index: usize,
    /// Page count of the last resolved fetch, if known.
    pub page_count: Option<usize>,
    /// A previous page exists.
    pub can_previous: bool,
    /// A next page exists (always true while the page count is unknown).
    pub can_next: bool,
    /// A transition is still waiting for its data.
    pub pending: bool,
}

impl PaginationControls {
    /// The "previous page" button is enabled.
    pub fn previous_enabled(&self) -> bool {
        self.can_previous && !self.pending
    }

    /// The "next page" button is enabled.
    pub fn next_enabled(&self) -> bool {
        self.can_next && !self.pending
    }
}
