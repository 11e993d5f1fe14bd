//! Error types for the snippet-attribution crate.
//!
//! All errors use stable string messages suitable for display to users
//! and programmatic handling. Snippet text never appears in error messages.

/// Error reported by a search backend adapter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// The query could not be parsed or validated.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The backend could not be reached or failed while streaming.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The backend observed cancellation and stopped streaming.
    #[error("search cancelled")]
    Cancelled,
}

/// Errors that can occur while resolving snippet attributions.
#[derive(Debug, thiserror::Error)]
pub enum AttributionError {
    /// The backend rejected or failed to build the search plan.
    #[error("failed to create search plan: {0}")]
    Plan(#[source] BackendError),

    /// The backend failed while streaming match events.
    #[error("failed to execute search: {0}")]
    Execute(#[source] BackendError),

    /// The request's cancellation scope fired before the resolver finished.
    #[error("attribution cancelled")]
    Cancelled,

    /// A resolver task panicked or was aborted.
    #[error("attribution task failed: {0}")]
    Task(String),

    /// Invalid configuration or request parameters.
    #[error("config error: {0}")]
    Config(String),

    /// I/O failure while loading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for snippet-attribution results.
pub type Result<T> = std::result::Result<T, AttributionError>;
