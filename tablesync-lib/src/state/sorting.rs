//! Sorting state.

use serde::{Deserialize, Serialize};

/// Sort specification for a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSort {
    /// Column identifier.
    pub id: String,
    /// `true` for descending order.
    pub desc: bool,
}

impl ColumnSort {
    /// Ascending sort on a column.
    pub fn asc(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            desc: false,
        }
    }

    /// Descending sort on a column.
    pub fn desc(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            desc: true,
        }
    }
}

/// Ordered sort specification for the table.
///
/// The first entry is the primary sort, later entries break ties.
///
/// # Example
///
/// ```
/// use tablesync_lib::state::Sorting;
///
/// let sorting = Sorting::desc("priority").then_asc("title");
/// assert_eq!(sorting.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sorting(Vec<ColumnSort>);

impl Sorting {
    /// Creates an empty sort specification.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorts ascending on a column.
    pub fn asc(id: impl Into<String>) -> Self {
        Self(vec![ColumnSort::asc(id)])
    }

    /// Sorts descending on a column.
    pub fn desc(id: impl Into<String>) -> Self {
        Self(vec![ColumnSort::desc(id)])
    }

    /// Adds a secondary ascending sort.
    pub fn then_asc(mut self, id: impl Into<String>) -> Self {
        self.0.push(ColumnSort::asc(id));
        self
    }

    /// Adds a secondary descending sort.
    pub fn then_desc(mut self, id: impl Into<String>) -> Self {
        self.0.push(ColumnSort::desc(id));
        self
    }

    /// Returns the sorted columns in priority order.
    pub fn columns(&self) -> &[ColumnSort] {
        &self.0
    }

    /// Returns the sort entry for a column, if it is sorted.
    pub fn get(&self, id: &str) -> Option<&ColumnSort> {
        self.0.iter().find(|sort| sort.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Cycles a column through ascending, descending and unsorted.
    ///
    /// Without `multi` the result only ever contains the toggled column.
    /// With `multi` the other sorted columns are kept and the toggled column
    /// is appended, flipped in place, or removed.
    pub fn toggled(&self, id: &str, multi: bool) -> Sorting {
        let next = match self.get(id) {
            None => Some(ColumnSort::asc(id)),
            Some(current) if !current.desc => Some(ColumnSort::desc(id)),
            Some(_) => None,
        };

        if !multi {
            return Sorting(next.into_iter().collect());
        }

        let mut columns = self.0.clone();
        match (columns.iter().position(|sort| sort.id == id), next) {
            (Some(pos), Some(next)) => columns[pos] = next,
            (Some(pos), None) => {
                columns.remove(pos);
            }
            (None, Some(next)) => columns.push(next),
            (None, None) => {}
        }
        Sorting(columns)
    }
}

impl From<Vec<ColumnSort>> for Sorting {
    fn from(columns: Vec<ColumnSort>) -> Self {
        Self(columns)
    }
}

impl FromIterator<ColumnSort> for Sorting {
    fn from_iter<I: IntoIterator<Item = ColumnSort>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
