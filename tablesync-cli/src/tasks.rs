//! In-memory task list served page by page.

use std::cmp::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use serde::Serialize;
use serde_json::Value;

use tablesync_lib::boundary::{FetchResult, PageFetcher};
use tablesync_lib::error::FetchError;
use tablesync_lib::state::{ColumnSort, TableState};

/// Column ids, in display order.
pub const COLUMNS: [&str; 5] = ["id", "title", "status", "priority", "due"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Todo,
    InProgress,
    Done,
    Canceled,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Done => "done",
            Self::Canceled => "canceled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: u32,
    pub title: String,
    pub status: Status,
    pub priority: Priority,
    pub due: NaiveDate,
}

impl Task {
    /// Display text of a column, `None` for unknown columns.
    pub fn field(&self, column: &str) -> Option<String> {
        match column {
            "id" => Some(self.id.to_string()),
            "title" => Some(self.title.clone()),
            "status" => Some(self.status.as_str().to_string()),
            "priority" => Some(self.priority.as_str().to_string()),
            "due" => Some(self.due.to_string()),
            _ => None,
        }
    }

    fn matches_search(&self, needle: &str) -> bool {
        COLUMNS
            .iter()
            .filter_map(|column| self.field(column))
            .any(|text| text.to_lowercase().contains(needle))
    }

    fn matches_filter(&self, column: &str, value: &Value) -> bool {
        let Some(field) = self.field(column) else {
            log::debug!("Ignoring filter on unknown column `{}`", column);
            return true;
        };
        match value {
            Value::String(expected) if column == "title" => {
                field.to_lowercase().contains(&expected.to_lowercase())
            }
            Value::String(expected) => field.eq_ignore_ascii_case(expected),
            Value::Array(options) => options.iter().any(|option| self.matches_filter(column, option)),
            Value::Number(n) => field == n.to_string(),
            Value::Bool(b) => field == b.to_string(),
            Value::Null | Value::Object(_) => true,
        }
    }

    fn compare(&self, other: &Self, sort: &ColumnSort) -> Ordering {
        let ordering = match sort.id.as_str() {
            "id" => self.id.cmp(&other.id),
            "title" => self.title.cmp(&other.title),
            "status" => self.status.cmp(&other.status),
            "priority" => self.priority.cmp(&other.priority),
            "due" => self.due.cmp(&other.due),
            _ => Ordering::Equal,
        };
        if sort.desc { ordering.reverse() } else { ordering }
    }
}

const VERBS: [&str; 7] = ["Draft", "Review", "Fix", "Ship", "Plan", "Test", "Document"];
const SUBJECTS: [&str; 6] = [
    "release notes",
    "login flow",
    "invoice export",
    "search index",
    "onboarding email",
    "billing page",
];
const STATUSES: [Status; 4] = [Status::Todo, Status::InProgress, Status::Done, Status::Canceled];
const PRIORITIES: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

/// A fixed task list answering table queries.
#[derive(Debug, Clone)]
pub struct TaskStore {
    tasks: Vec<Task>,
    latency: Duration,
}

impl TaskStore {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            latency: Duration::ZERO,
        }
    }

    /// A deterministic list of `count` tasks.
    pub fn seeded(count: usize) -> Self {
        let start = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap_or_default();
        let tasks = (0..count)
            .map(|i| Task {
                id: u32::try_from(i + 1).unwrap_or(u32::MAX),
                title: format!(
                    "{} {}",
                    VERBS[i % VERBS.len()],
                    SUBJECTS[(i * 3 + i / 6) % SUBJECTS.len()]
                ),
                status: STATUSES[i % STATUSES.len()],
                priority: PRIORITIES[(i * 7) % PRIORITIES.len()],
                due: start
                    .checked_add_days(Days::new(((i * 5) % 60) as u64))
                    .unwrap_or(start),
            })
            .collect();
        Self::new(tasks)
    }

    /// Delay every fetch by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Runs a query against the list.
    pub fn query(&self, state: &TableState) -> FetchResult<Task> {
        let needle = state.global_filter.trim().to_lowercase();
        let mut matching: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|task| needle.is_empty() || task.matches_search(&needle))
            .filter(|task| {
                state
                    .column_filters
                    .iter()
                    .all(|(column, value)| task.matches_filter(column, value))
            })
            .collect();

        matching.sort_by(|a, b| {
            state
                .sorting
                .columns()
                .iter()
                .map(|sort| a.compare(b, sort))
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        });

        let pagination = state.pagination;
        let page_count = pagination.page_count_for(matching.len());
        let rows = matching
            .into_iter()
            .skip(pagination.first_row())
            .take(pagination.page_size)
            .cloned()
            .collect();
        FetchResult::new(rows, page_count)
    }
}

#[async_trait]
impl PageFetcher<Task> for TaskStore {
    async fn get_page(&self, state: &TableState) -> Result<FetchResult<Task>, FetchError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let page = self.query(state);
        log::debug!(
            "Served {} tasks for page {} of {}",
            page.len(),
            state.page_index() + 1,
            page.page_count()
        );
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tablesync_lib::state::{ColumnFilters, PaginationState, Sorting};

    use super::*;

    #[test]
    fn test_pages_cover_all_tasks() {
        let store = TaskStore::seeded(23);
        let state = TableState::with_page_size(10);
        let first = store.query(&state);
        assert_eq!(first.len(), 10);
        assert_eq!(first.page_count(), 3);

        let last = store.query(&state.pagination(PaginationState::new(2, 10)));
        assert_eq!(last.len(), 3);
        assert_eq!(last.rows()[0].id, 21);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let store = TaskStore::seeded(5);
        let state = TableState::default().pagination(PaginationState::new(4, 10));
        let page = store.query(&state);
        assert!(page.is_empty());
        assert_eq!(page.page_count(), 1);
    }

    #[test]
    fn test_search_and_filters() {
        let store = TaskStore::seeded(40);
        let state = TableState::with_page_size(100)
            .global_filter("INVOICE")
            .column_filters(ColumnFilters::new().with("status", json!(["todo", "done"])));
        let page = store.query(&state);
        assert!(!page.is_empty());
        assert!(page.rows().iter().all(|task| {
            task.title.contains("invoice") && matches!(task.status, Status::Todo | Status::Done)
        }));
    }

    #[test]
    fn test_sorting_by_priority_then_id() {
        let store = TaskStore::seeded(12);
        let state = TableState::with_page_size(100).sorting(Sorting::desc("priority").then_asc("id"));
        let rows = store.query(&state).into_rows();
        assert_eq!(rows[0].priority, Priority::High);
        assert!(rows.windows(2).all(|pair| {
            pair[0].priority > pair[1].priority
                || (pair[0].priority == pair[1].priority && pair[0].id < pair[1].id)
        }));
    }

    #[test]
    fn test_unknown_filter_column_is_ignored() {
        let store = TaskStore::seeded(3);
        let state = TableState::default().column_filters(ColumnFilters::new().with("owner", "me"));
        assert_eq!(store.query(&state).len(), 3);
    }
}
