//! Codec configuration

use crate::state::DEFAULT_PAGE_SIZE;

/// Configuration for [`UrlStateCodec`](super::UrlStateCodec).
///
/// # Example
///
/// ```
/// use tablesync_lib::codec::CodecConfig;
///
/// // Two tables on one page, each with its own parameters.
/// let users = CodecConfig::default().with_prefix("users.");
/// let tasks = CodecConfig::default()
///     .with_prefix("tasks.")
///     .with_default_page_size(25);
/// assert_eq!(tasks.param("pageSize"), "tasks.pageSize");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Page size used when the query carries none.
    ///
    /// Default: 10
    pub default_page_size: usize,

    /// Prefix prepended to every parameter name.
    ///
    /// Default: none
    pub prefix: Option<String>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            prefix: None,
        }
    }
}

impl CodecConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default page size. Zero is raised to 1.
    pub fn with_default_page_size(mut self, page_size: usize) -> Self {
        self.default_page_size = page_size.max(1);
        self
    }

    /// Sets the parameter name prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Returns the full query parameter name for a field.
    pub fn param(&self, name: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, name),
            None => name.to_string(),
        }
    }
}
