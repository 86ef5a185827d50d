//! Error types for Palaver.

use thiserror::Error;

/// Primary error type for all Palaver operations.
#[derive(Error, Debug)]
pub enum PalaverError {
    #[error("Request error: {0}")]
    Request(String),

    #[error("Response error: {0}")]
    Response(String),

    #[error("Tool error: {tool_name}: {message}")]
    Tool { tool_name: String, message: String },

    #[error("Run loop limit reached after {limit} iterations")]
    RunLimit { limit: usize },

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Canceled")]
    Canceled,
}

/// Failure to pull a structured tool result out of a finished run.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("missing message")]
    MissingMessage,

    #[error("missing tool calls")]
    MissingToolCalls,

    #[error("missing tool call '{name}'")]
    MissingToolCall { name: String },

    #[error("failed to decode tool call '{name}': {source}")]
    Decode {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Request,
    Response,
    Tool,
    RunLimit,
    Extraction,
    Configuration,
    Serialization,
    Network,
    Canceled,
    Unknown,
}

impl PalaverError {
    /// Create a tool error.
    pub fn tool(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Request(_) => ErrorCategory::Request,
            Self::Response(_) => ErrorCategory::Response,
            Self::Tool { .. } => ErrorCategory::Tool,
            Self::RunLimit { .. } => ErrorCategory::RunLimit,
            Self::Extraction(_) => ErrorCategory::Extraction,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Io(_) | Self::Stream(_) => ErrorCategory::Network,
            Self::Canceled => ErrorCategory::Canceled,
            Self::UnsupportedOperation(_) => ErrorCategory::Unknown,
        }
    }

    /// Whether the run ended because it ran out of iterations.
    pub fn is_run_limit(&self) -> bool {
        matches!(self, Self::RunLimit { .. })
    }

    /// Whether this error is potentially retryable by the caller.
    ///
    /// The run loop itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self.category(), ErrorCategory::Network)
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, PalaverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_errors_convert_into_palaver_error() {
        let err: PalaverError = ExtractionError::MissingToolCall {
            name: "lookup".into(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Extraction);
        assert_eq!(
            err.to_string(),
            "Extraction error: missing tool call 'lookup'"
        );
    }

    #[test]
    fn run_limit_is_distinct_from_backend_failures() {
        assert!(PalaverError::RunLimit { limit: 3 }.is_run_limit());
        assert!(!PalaverError::Response("empty".into()).is_run_limit());
        assert!(PalaverError::Stream("reset".into()).is_retryable());
        assert!(!PalaverError::RunLimit { limit: 3 }.is_retryable());
    }
}
