//! Table state types.
//!
//! - [`TableState`] - the full sort/filter/search/pagination record
//! - [`PartialTableState`] - the fields a query string actually carried
//! - [`Updater`] - value-or-function updates used by the grid callbacks

mod filters;
mod pagination;
mod sorting;
mod updater;

pub use filters::ColumnFilter;
pub use filters::ColumnFilters;
pub use pagination::DEFAULT_PAGE_SIZE;
pub use pagination::PaginationState;
pub use sorting::ColumnSort;
pub use sorting::Sorting;
pub use updater::Updater;

/// Sort, filter, search and pagination state of one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableState {
    /// Sorted columns in priority order.
    pub sorting: Sorting,
    /// Per-column filter values.
    pub column_filters: ColumnFilters,
    /// Free-text search across all columns.
    pub global_filter: String,
    /// Current page.
    pub pagination: PaginationState,
}

impl TableState {
    /// Creates a default state with the given page size.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            pagination: PaginationState::new(0, page_size),
            ..Self::default()
        }
    }

    pub fn sorting(mut self, sorting: Sorting) -> Self {
        self.sorting = sorting;
        self
    }

    pub fn column_filters(mut self, column_filters: ColumnFilters) -> Self {
        self.column_filters = column_filters;
        self
    }

    pub fn global_filter(mut self, global_filter: impl Into<String>) -> Self {
        self.global_filter = global_filter.into();
        self
    }

    pub fn pagination(mut self, pagination: PaginationState) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn page_index(&self) -> usize {
        self.pagination.page_index
    }

    pub fn page_size(&self) -> usize {
        self.pagination.page_size
    }
}

/// The fields of a [`TableState`] that were present and well-formed in a
/// query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialTableState {
    pub sorting: Option<Sorting>,
    pub column_filters: Option<ColumnFilters>,
    pub global_filter: Option<String>,
    pub page_index: Option<usize>,
    pub page_size: Option<usize>,
}

impl PartialTableState {
    /// Fills every missing field from `fallback`.
    pub fn or(self, fallback: &TableState) -> TableState {
        TableState {
            sorting: self.sorting.unwrap_or_else(|| fallback.sorting.clone()),
            column_filters: self
                .column_filters
                .unwrap_or_else(|| fallback.column_filters.clone()),
            global_filter: self
                .global_filter
                .unwrap_or_else(|| fallback.global_filter.clone()),
            pagination: PaginationState::new(
                self.page_index.unwrap_or(fallback.pagination.page_index),
                self.page_size.unwrap_or(fallback.pagination.page_size),
            ),
        }
    }

    /// Returns `true` if no field was present.
    pub fn is_empty(&self) -> bool {
        self.sorting.is_none()
            && self.column_filters.is_none()
            && self.global_filter.is_none()
            && self.page_index.is_none()
            && self.page_size.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_falls_back_per_field() {
        let initial = TableState::with_page_size(20)
            .global_filter("server")
            .sorting(Sorting::asc("title"))
            .pagination(PaginationState::new(2, 20));

        let partial = PartialTableState {
            global_filter: Some(String::new()),
            page_index: Some(0),
            ..Default::default()
        };

        let state = partial.or(&initial);
        assert_eq!(state.global_filter, "");
        assert_eq!(state.page_index(), 0);
        assert_eq!(state.page_size(), 20);
        assert_eq!(state.sorting, Sorting::asc("title"));
    }

    #[test]
    fn test_empty_partial_is_fallback() {
        let initial = TableState::with_page_size(50).global_filter("x");
        assert!(PartialTableState::default().is_empty());
        assert_eq!(PartialTableState::default().or(&initial), initial);
    }
}
