//! Pagination state.

/// Page size used when neither the URL nor the configuration provide one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Zero-based page index and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaginationState {
    /// Zero-based index of the current page.
    pub page_index: usize,
    /// Rows per page. Always at least 1.
    pub page_size: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationState {
    /// Creates a pagination state. A zero page size is raised to 1.
    pub fn new(page_index: usize, page_size: usize) -> Self {
        Self {
            page_index,
            page_size: page_size.max(1),
        }
    }

    /// Index of the first row on the current page.
    pub fn first_row(&self) -> usize {
        self.page_index.saturating_mul(self.page_size)
    }

    /// Whether a previous page exists.
    pub fn can_previous(&self) -> bool {
        self.page_index > 0
    }

    /// Whether a next page exists.
    ///
    /// An unknown page count never blocks navigation; a known count of zero
    /// always does.
    pub fn can_next(&self, page_count: Option<usize>) -> bool {
        match page_count {
            None => true,
            Some(count) => self.page_index.saturating_add(1) < count,
        }
    }

    /// Moves to a page, clamped to `page_count` when it is known.
    pub fn with_page_index(self, page_index: usize, page_count: Option<usize>) -> Self {
        let page_index = match page_count {
            Some(count) => page_index.min(count.saturating_sub(1)),
            None => page_index,
        };
        Self { page_index, ..self }
    }

    /// Changes the page size while keeping the current first row visible.
    pub fn with_page_size(self, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            page_index: self.first_row() / page_size,
            page_size,
        }
    }

    /// Returns this state with the page index moved inside `0..page_count`.
    ///
    /// With no pages at all the index becomes 0.
    pub fn clamped(self, page_count: usize) -> Self {
        self.with_page_index(self.page_index, Some(page_count))
    }

    /// Number of pages needed for `row_count` rows.
    pub fn page_count_for(&self, row_count: usize) -> usize {
        row_count.div_ceil(self.page_size)
    }
}
