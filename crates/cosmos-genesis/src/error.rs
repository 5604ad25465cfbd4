//! Error types for cosmos-genesis

use std::time::Duration;
use thiserror::Error;

/// Result type alias for cosmos-genesis operations
pub type CosmosResult<T> = Result<T, CosmosError>;

/// Error types for query construction and execution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CosmosError {
    /// A configuration call received a value that violates its constraint
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// `build` was called before the query was complete
    #[error("Incomplete query: {0}")]
    IncompleteQuery(String),

    /// The service rejected, failed or cancelled the query
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Query did not finish in time
    #[error("Query timeout after {0:?}")]
    Timeout(Duration),

    /// Record value missing or not convertible
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl CosmosError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create an incomplete query error
    pub fn incomplete(message: impl Into<String>) -> Self {
        Self::IncompleteQuery(message.into())
    }

    /// Create a query failure error
    pub fn query_failed(message: impl Into<String>) -> Self {
        Self::QueryFailed(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this is an invalid argument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Check if this is an incomplete query error
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::IncompleteQuery(_))
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
