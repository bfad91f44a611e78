//! Controller configuration

use crate::codec::CodecConfig;
use crate::router::HistoryMode;

/// Configuration for [`TableController`](super::TableController).
///
/// # Example
///
/// ```
/// use tablesync_lib::codec::CodecConfig;
/// use tablesync_lib::controller::ControllerConfig;
/// use tablesync_lib::router::HistoryMode;
///
/// let config = ControllerConfig::default()
///     .with_history(HistoryMode::Push)
///     .with_codec(CodecConfig::default().with_default_page_size(20));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ControllerConfig {
    /// Query parameter encoding.
    pub codec: CodecConfig,

    /// Whether commits replace the current history entry or push a new one.
    ///
    /// Default: [`HistoryMode::Replace`]
    pub history: HistoryMode,
}

impl ControllerConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the codec configuration.
    pub fn with_codec(mut self, codec: CodecConfig) -> Self {
        self.codec = codec;
        self
    }

    /// Sets the history mode.
    pub fn with_history(mut self, history: HistoryMode) -> Self {
        self.history = history;
        self
    }
}
