//! Column filter state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single column filter as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFilter {
    /// Column identifier.
    pub id: String,
    /// Filter value. Its meaning is up to the data source.
    pub value: Value,
}

/// Filter values keyed by column id.
///
/// Entries are kept in column-id order, so two equal filter sets always
/// serialize the same way. On the wire the filters are an array of
/// `{"id": ..., "value": ...}` objects; if an id repeats, the last entry wins.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use tablesync_lib::state::ColumnFilters;
///
/// let filters = ColumnFilters::new()
///     .with("status", "todo")
///     .with("priority", "high");
/// assert_eq!(filters.get("status"), Some(&json!("todo")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ColumnFilter>", into = "Vec<ColumnFilter>")]
pub struct ColumnFilters(BTreeMap<String, Value>);

impl ColumnFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a filter, removing it when the value is blank.
    pub fn with(mut self, id: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(id, value);
        self
    }

    /// Sets a filter value. Blank values (`null`, `""`, `[]`) clear the filter.
    pub fn set(&mut self, id: impl Into<String>, value: impl Into<Value>) {
        let id = id.into();
        let value = value.into();
        if is_blank(&value) {
            self.0.remove(&id);
        } else {
            self.0.insert(id, value);
        }
    }

    /// Removes the filter on a column, returning its value.
    pub fn remove(&mut self, id: &str) -> Option<Value> {
        self.0.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.0.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates filters in column-id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(id, value)| (id.as_str(), value))
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

impl From<Vec<ColumnFilter>> for ColumnFilters {
    fn from(filters: Vec<ColumnFilter>) -> Self {
        filters
            .into_iter()
            .map(|filter| (filter.id, filter.value))
            .collect()
    }
}

impl From<ColumnFilters> for Vec<ColumnFilter> {
    fn from(filters: ColumnFilters) -> Self {
        filters
            .0
            .into_iter()
            .map(|(id, value)| ColumnFilter { id, value })
            .collect()
    }
}

impl FromIterator<(String, Value)> for ColumnFilters {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
