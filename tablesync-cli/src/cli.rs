//! Command line arguments.

use clap::Parser;

use crate::error::CliError;

#[derive(Parser, Debug)]
#[command(
    name = "tablesync",
    version,
    about = "Browse a task table whose state lives in a URL query string",
    long_about = "Mounts a table over an in-memory task list at the given query string,\n\
                  applies the requested actions in order (search, sort, filter, page\n\
                  size, page, next/previous, back) and prints the resulting URL and page."
)]
pub struct Cli {
    /// Starting query string, e.g. "pageIndex=1&globalFilter=report".
    #[arg(long, short = 'q', default_value = "")]
    pub query: String,

    /// Page size used when the query does not carry one.
    #[arg(long = "default-page-size", default_value_t = 10)]
    pub default_page_size: usize,

    /// Number of tasks in the demo data set.
    #[arg(long, default_value_t = 42)]
    pub tasks: usize,

    /// Simulated backend latency in milliseconds.
    #[arg(long = "latency-ms", default_value_t = 0)]
    pub latency_ms: u64,

    /// Fetch timeout in seconds.
    #[arg(long = "timeout", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Type this text into the search box, replacing what is there.
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Toggle sorting on a column (repeatable).
    #[arg(long = "sort", value_name = "COLUMN")]
    pub sort: Vec<String>,

    /// Keep existing sorted columns when toggling.
    #[arg(long = "sort-multi")]
    pub sort_multi: bool,

    /// Set a column filter (repeatable). An empty value clears it.
    /// The value is parsed as JSON when possible, e.g. status=["todo","done"].
    #[arg(long = "filter", value_name = "COLUMN=VALUE", value_parser = parse_filter)]
    pub filter: Vec<(String, String)>,

    /// Change the page size.
    #[arg(long = "page-size")]
    pub page_size: Option<usize>,

    /// Jump to a page (1-based).
    #[arg(long)]
    pub page: Option<usize>,

    /// Go forward this many pages.
    #[arg(long, default_value_t = 0)]
    pub next: usize,

    /// Go back this many pages.
    #[arg(long, default_value_t = 0)]
    pub previous: usize,

    /// Navigate back in history this many times after the other actions.
    #[arg(long, default_value_t = 0)]
    pub back: usize,

    /// Print the rows as JSON instead of a table.
    #[arg(long)]
    pub json: bool,

    /// Log at debug level.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

fn parse_filter(raw: &str) -> Result<(String, String), CliError> {
    match raw.split_once('=') {
        Some((column, value)) if !column.trim().is_empty() => {
            Ok((column.trim().to_string(), value.to_string()))
        }
        _ => Err(CliError::InvalidFilter(raw.to_string())),
    }
}
