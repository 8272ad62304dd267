//! Error types for search engine operations

use crate::error::AppError;

/// Result type for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Errors that can occur while talking to the search engine
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// No node could be reached
    #[error("Search engine unreachable: {0}")]
    Connection(String),

    /// Request exceeded the configured timeout
    #[error("Search engine request timed out: {0}")]
    Timeout(String),

    /// The requested index or document does not exist
    #[error("Not found in search engine: {0}")]
    NotFound(String),

    /// The engine answered with a non-success status
    #[error("Search engine returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The engine answered with a body we could not interpret
    #[error("Invalid search engine response: {0}")]
    InvalidResponse(String),

    /// Request body could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl SearchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SearchError::NotFound(_))
    }

    /// Whether another attempt (possibly on another node) may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            SearchError::Connection(_) | SearchError::Timeout(_) => true,
            SearchError::Status { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SearchError::Timeout(err.to_string())
        } else if err.is_connect() || err.is_request() {
            SearchError::Connection(err.to_string())
        } else if err.is_decode() {
            SearchError::InvalidResponse(err.to_string())
        } else {
            SearchError::Connection(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::Serialization(err.to_string())
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidConfiguration(msg) => AppError::Configuration(msg),
            _ => AppError::SearchEngine(err.to_string()),
        }
    }
}
