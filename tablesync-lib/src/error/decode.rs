//! Query decode error types

/// Reasons a single query parameter could not be decoded.
///
/// These never reach callers of the codec. The offending field is treated as
/// absent and falls back to its default.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The value is not JSON of the expected shape.
    #[error("Parameter `{param}` is not valid JSON: {message}")]
    Json {
        /// Name of the query parameter.
        param: String,
        /// Parser message.
        message: String,
    },

    /// The value is not a non-negative integer.
    #[error("Parameter `{param}` is not a non-negative integer: {value:?}")]
    Integer {
        /// Name of the query parameter.
        param: String,
        /// Raw parameter value.
        value: String,
    },

    /// The value parsed but is outside the allowed range.
    #[error("Parameter `{param}` is out of range: {value}")]
    OutOfRange {
        /// Name of the query parameter.
        param: String,
        /// Parsed value.
        value: usize,
    },
}

impl DecodeError {
    /// Creates a JSON decode error.
    pub fn json(param: impl Into<String>, err: &serde_json::Error) -> Self {
        Self::Json {
            param: param.into(),
            message: err.to_string(),
        }
    }

    /// Creates an integer decode error.
    pub fn integer(param: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Integer {
            param: param.into(),
            value: value.into(),
        }
    }

    /// Returns the name of the parameter that failed to decode.
    pub fn param(&self) -> &str {
        match self {
            Self::Json { param, .. } | Self::Integer { param, .. } | Self::OutOfRange { param, .. } => {
                param
            }
        }
    }
}
