//! Error types for retrieval orchestration.

/// Result type for retriever operations.
pub type Result<T> = std::result::Result<T, RetrieverError>;

/// Errors surfaced by the passage pipeline and the retriever.
///
/// Configuration failures are fatal and surfaced immediately. `NotReady`
/// is fatal to the call that raised it but recoverable: the caller fixes it
/// by invoking `prepare`. Collaborator failures (`Encoding`, `Reader`) are
/// propagated unmodified and never retried; a failed encoder batch fails
/// the whole `prepare` or `ask` call.
#[derive(Debug, thiserror::Error)]
pub enum RetrieverError {
    /// Invalid configuration, including snapshot/encoder dimension mismatch
    #[error("invalid retriever configuration: {message}")]
    Config { message: String },

    /// `ask` was called before `prepare` built an index
    #[error("no index built yet: call prepare before ask")]
    NotReady,

    /// The external encoder failed
    #[error("encoder failed: {source}")]
    Encoding { source: anyhow::Error },

    /// The external reader failed
    #[error("reader failed: {source}")]
    Reader { source: anyhow::Error },

    /// Index build or ranking failed
    #[error("search error: {source}")]
    Search {
        #[from]
        source: obqa_search::SearchError,
    },

    /// Snapshot file access failed
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Snapshot (de)serialization failed
    #[error("snapshot serialization failed: {source}")]
    Snapshot {
        #[from]
        source: serde_json::Error,
    },

    /// A combine worker panicked or was cancelled
    #[error("async task failed: {source}")]
    AsyncTask {
        #[from]
        source: tokio::task::JoinError,
    },
}

impl RetrieverError {
    /// Create a configuration error with a custom message.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Wrap an encoder failure.
    pub fn encoding(source: anyhow::Error) -> Self {
        Self::Encoding { source }
    }

    /// Wrap a reader failure.
    pub fn reader(source: anyhow::Error) -> Self {
        Self::Reader { source }
    }
}
