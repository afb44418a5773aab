//! Muninn error types

/// Muninn error types
#[derive(Debug, thiserror::Error)]
pub enum MuninnError {
    // Transport errors
    /// Connection-level failure (DNS, TLS, refused, timeout).
    ///
    /// A response that arrived with a non-success HTTP status is not an
    /// error; it is reported through the delivery status instead.
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("invalid URL: {0}")]
    UrlInvalid(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Storage errors
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Cache location resolves outside the store root.
    #[error("invalid cache location: {0}")]
    Location(String),

    /// The persisted retry queue document exists but cannot be decoded.
    #[error("retry queue document corrupt: {0}")]
    QueueCorrupt(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Result type alias for Muninn operations
pub type Result<T> = std::result::Result<T, MuninnError>;
