//! Per-parameter parsing and formatting.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::DecodeError;
use crate::state::{ColumnFilters, Sorting};

pub const SORTING: &str = "sorting";
pub const COLUMN_FILTERS: &str = "columnFilters";
pub const GLOBAL_FILTER: &str = "globalFilter";
pub const PAGE_INDEX: &str = "pageIndex";
pub const PAGE_SIZE: &str = "pageSize";

/// Every parameter the codec owns, in the order they are written.
pub const ALL: [&str; 5] = [SORTING, COLUMN_FILTERS, GLOBAL_FILTER, PAGE_INDEX, PAGE_SIZE];

pub fn parse_sorting(param: &str, raw: &str) -> Result<Sorting, DecodeError> {
    parse_json(param, raw)
}

pub fn parse_column_filters(param: &str, raw: &str) -> Result<ColumnFilters, DecodeError> {
    parse_json(param, raw)
}

pub fn parse_page_index(param: &str, raw: &str) -> Result<usize, DecodeError> {
    parse_integer(param, raw)
}

pub fn parse_page_size(param: &str, raw: &str) -> Result<usize, DecodeError> {
    match parse_integer(param, raw)? {
        0 => Err(DecodeError::OutOfRange {
            param: param.to_string(),
            value: 0,
        }),
        size => Ok(size),
    }
}

/// Serializes an array-valued field. Table state types always serialize.
pub fn format_json<T: Serialize>(param: &str, value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::warn!("Failed to serialize query parameter `{}`: {}", param, e);
        "[]".to_string()
    })
}

fn parse_json<T: DeserializeOwned>(param: &str, raw: &str) -> Result<T, DecodeError> {
    serde_json::from_str(raw).map_err(|e| DecodeError::json(param, &e))
}

fn parse_integer(param: &str, raw: &str) -> Result<usize, DecodeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeError::integer(param, raw));
    }
    trimmed
        .parse()
        .map_err(|_| DecodeError::integer(param, raw))
}
