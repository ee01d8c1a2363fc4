//! Error types for the search layer.

/// Result type for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors raised while building or querying a search index.
///
/// Everything here is a configuration-class failure: surfaced immediately,
/// never retried. Callers recover by fixing the backend tag, the input
/// vectors, or the query dimensionality and building a fresh index.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Unrecognized backend tag, empty build input, or other invalid setup
    #[error("invalid search configuration: {message}")]
    Config { message: String },

    /// Vector dimensionality disagrees with the index
    #[error("dimension mismatch: index expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl SearchError {
    /// Create a configuration error with a custom message.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
