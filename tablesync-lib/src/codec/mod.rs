//! URL query codec for table state.
//!
//! Each [`TableState`] field maps to one query parameter:
//!
//! | field | parameter | value |
//! |---|---|---|
//! | sorting | `sorting` | JSON `[{"id":"title","desc":true}]` |
//! | column filters | `columnFilters` | JSON `[{"id":"status","value":"todo"}]` |
//! | global filter | `globalFilter` | plain text |
//! | page index | `pageIndex` | decimal integer |
//! | page size | `pageSize` | decimal integer, at least 1 |
//!
//! Decoding never fails. Missing or malformed parameters are treated as
//! absent and fall back to defaults.

mod config;
pub mod params;

use std::collections::HashMap;

use url::form_urlencoded;

pub use config::CodecConfig;

use crate::error::DecodeError;
use crate::state::{PartialTableState, TableState};

/// Encodes [`TableState`] to query strings and back.
///
/// # Example
///
/// ```
/// use tablesync_lib::codec::UrlStateCodec;
/// use tablesync_lib::state::{PaginationState, TableState};
///
/// let codec = UrlStateCodec::default();
/// let state = TableState::default().pagination(PaginationState::new(1, 10));
///
/// let query = codec.encode(&state);
/// assert!(query.contains("pageIndex=1"));
/// assert_eq!(codec.decode(&query), state);
/// ```
#[derive(Debug, Clone, Default)]
pub struct UrlStateCodec {
    config: CodecConfig,
}

impl UrlStateCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// The state an empty query decodes to.
    pub fn defaults(&self) -> TableState {
        TableState::with_page_size(self.config.default_page_size)
    }

    /// Decodes a query string, filling absent fields with defaults.
    pub fn decode(&self, query: &str) -> TableState {
        self.decode_partial(query).or(&self.defaults())
    }

    /// Decodes only the fields present and well-formed in the query.
    ///
    /// A leading `?` is ignored and the first occurrence of a repeated
    /// parameter wins.
    pub fn decode_partial(&self, query: &str) -> PartialTableState {
        let mut values: HashMap<String, String> = HashMap::new();
        for (key, value) in form_urlencoded::parse(strip_question_mark(query).as_bytes()) {
            values.entry(key.into_owned()).or_insert_with(|| value.into_owned());
        }

        let field = |name: &str| {
            let param = self.config.param(name);
            values.get(&param).map(|raw| (param, raw.as_str()))
        };

        PartialTableState {
            sorting: field(params::SORTING)
                .and_then(|(param, raw)| accept(params::parse_sorting(&param, raw))),
            column_filters: field(params::COLUMN_FILTERS)
                .and_then(|(param, raw)| accept(params::parse_column_filters(&param, raw))),
            global_filter: field(params::GLOBAL_FILTER).map(|(_, raw)| raw.to_string()),
            page_index: field(params::PAGE_INDEX)
                .and_then(|(param, raw)| accept(params::parse_page_index(&param, raw))),
            page_size: field(params::PAGE_SIZE)
                .and_then(|(param, raw)| accept(params::parse_page_size(&param, raw))),
        }
    }

    /// Encodes a state as a query string without a leading `?`.
    ///
    /// All five parameters are always written, including those at their
    /// default value.
    pub fn encode(&self, state: &TableState) -> String {
        self.merge("", state)
    }

    /// Writes a state into an existing query string.
    ///
    /// Parameters the codec does not own are kept in their original order,
    /// followed by the table parameters.
    pub fn merge(&self, existing: &str, state: &TableState) -> String {
        let owned: Vec<String> = params::ALL
            .iter()
            .map(|name| self.config.param(name))
            .collect();

        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in form_urlencoded::parse(strip_question_mark(existing).as_bytes()) {
            if !owned.iter().any(|param| *param == key) {
                serializer.append_pair(&key, &value);
            }
        }

        let sorting = params::format_json(params::SORTING, &state.sorting);
        let column_filters = params::format_json(params::COLUMN_FILTERS, &state.column_filters);
        serializer
            .append_pair(&self.config.param(params::SORTING), &sorting)
            .append_pair(&self.config.param(params::COLUMN_FILTERS), &column_filters)
            .append_pair(&self.config.param(params::GLOBAL_FILTER), &state.global_filter)
            .append_pair(
                &self.config.param(params::PAGE_INDEX),
                &state.pagination.page_index.to_string(),
            )
            .append_pair(
                &self.config.param(params::PAGE_SIZE),
                &state.pagination.page_size.to_string(),
            );
        serializer.finish()
    }
}

fn strip_question_mark(query: &str) -> &str {
    query.strip_prefix('?').unwrap_or(query)
}

fn accept<T>(result: Result<T, DecodeError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::debug!("Ignoring malformed query parameter: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::state::{ColumnFilters, PaginationState, Sorting};

    fn sample() -> TableState {
        TableState::default()
            .sorting(Sorting::desc("priority").then_asc("title"))
            .column_filters(ColumnFilters::new().with("status", json!(["todo", "done"])))
            .global_filter("fix bug & ship")
            .pagination(PaginationState::new(3, 20))
    }

    #[test]
    fn test_decode_empty_is_defaults() {
        let codec = UrlStateCodec::default();
        let state = codec.decode("");
        assert!(state.sorting.is_empty());
        assert!(state.column_filters.is_empty());
        assert_eq!(state.global_filter, "");
        assert_eq!(state.pagination, PaginationState::new(0, 10));
        assert_eq!(codec.decode("?"), state);
    }

    #[test]
    fn test_configured_default_page_size() {
        let codec = UrlStateCodec::new(CodecConfig::default().with_default_page_size(25));
        assert_eq!(codec.decode("").page_size(), 25);
        assert_eq!(codec.decode("pageSize=0").page_size(), 25);
    }

    #[test]
    fn test_round_trip() {
        let codec = UrlStateCodec::default();
        let state = sample();
        assert_eq!(codec.decode(&codec.encode(&state)), state);
    }

    #[test]
    fn test_float_filter_survives_round_trip() {
        let codec = UrlStateCodec::default();
        let decoded = codec.decode(r#"columnFilters=[{"id":"a","value":1.0715660391465826e-75}]"#);
        assert_eq!(
            decoded.column_filters.get("a"),
            Some(&json!(1.0715660391465826e-75))
        );
        assert_eq!(codec.decode(&codec.encode(&decoded)), decoded);
    }

    #[test]
    fn test_encode_defaults() {
        let codec = UrlStateCodec::default();
        assert_eq!(
            codec.encode(&codec.defaults()),
            "sorting=%5B%5D&columnFilters=%5B%5D&globalFilter=&pageIndex=0&pageSize=10"
        );
    }

    #[test]
    fn test_malformed_fields_fall_back_independently() {
        let codec = UrlStateCodec::default();
        let state = codec.decode("sorting=oops&pageIndex=two&pageSize=30&globalFilter=abc");
        assert!(state.sorting.is_empty());
        assert_eq!(state.page_index(), 0);
        assert_eq!(state.page_size(), 30);
        assert_eq!(state.global_filter, "abc");
    }

    #[test]
    fn test_first_occurrence_wins() {
        let codec = UrlStateCodec::default();
        assert_eq!(codec.decode("pageIndex=2&pageIndex=5").page_index(), 2);
    }

    #[test]
    fn test_plus_decodes_to_space() {
        let codec = UrlStateCodec::default();
        assert_eq!(codec.decode("globalFilter=hello+world").global_filter, "hello world");
    }

    #[test]
    fn test_partial_reports_only_present_fields() {
        let codec = UrlStateCodec::default();
        let partial = codec.decode_partial("globalFilter=&pageSize=abc");
        assert_eq!(partial.global_filter.as_deref(), Some(""));
        assert_eq!(partial.page_size, None);
        assert_eq!(partial.page_index, None);
        assert_eq!(partial.sorting, None);
    }

    #[test]
    fn test_merge_keeps_foreign_params() {
        let codec = UrlStateCodec::default();
        let query = codec.merge("?tab=tasks&pageIndex=9&view=grid", &sample());
        assert!(query.starts_with("tab=tasks&view=grid&sorting="));
        assert_eq!(query.matches("pageIndex=").count(), 1);
        assert_eq!(codec.decode(&query), sample());
    }

    #[test]
    fn test_prefixed_params() {
        let codec = UrlStateCodec::new(CodecConfig::default().with_prefix("t."));
        let query = codec.encode(&sample());
        assert!(query.contains("t.pageIndex=3"));
        assert_eq!(codec.decode(&query), sample());
        assert_eq!(codec.decode("pageIndex=3").page_index(), 0);
    }
}
