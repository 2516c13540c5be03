//! Error types for nqorm

use thiserror::Error;

/// Result type alias for nqorm operations
pub type NqResult<T> = Result<T, NqError>;

/// Error types for query building and execution
#[derive(Debug, Error)]
pub enum NqError {
    /// Operator name or token outside the operator catalog
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    /// Builder constructed without a table name
    #[error("Missing table name")]
    MissingTable,

    /// Identifier that cannot be rendered safely
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Statement with nothing to execute (UPDATE without SET, INSERT without rows, ...)
    #[error("Empty statement: {0}")]
    EmptyStatement(&'static str),

    /// Filter value whose shape does not fit its operator
    #[error("Invalid filter on column '{column}': {message}")]
    InvalidFilter { column: String, message: String },

    /// Builder state recorded as invalid while chaining
    #[error("Validation error: {0}")]
    Validation(String),

    /// BEGIN issued while a transaction is already open
    #[error("A transaction is already active")]
    TransactionActive,

    /// COMMIT/ROLLBACK/SAVEPOINT issued outside a transaction
    #[error("No active transaction")]
    NoActiveTransaction,

    /// The service executed the query but reported a failure
    #[error("Query failed: {0}")]
    Query(String),

    /// Non-success HTTP status
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Transport-level failure (connection, URL, ...)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response could not be interpreted
    #[error("Decode error: {0}")]
    Decode(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic reqwest error
    #[cfg(feature = "http")]
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl NqError {
    /// Create an invalid filter error for a specific column
    pub fn invalid_filter(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidFilter {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Usage errors are raised before any request is sent and are never retried.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownOperator(_)
                | Self::MissingTable
                | Self::InvalidIdentifier(_)
                | Self::EmptyStatement(_)
                | Self::InvalidFilter { .. }
                | Self::Validation(_)
                | Self::TransactionActive
                | Self::NoActiveTransaction
        )
    }

    /// Check if this error came from the transport
    pub fn is_transport_error(&self) -> bool {
        match self {
            Self::Http { .. } | Self::Transport(_) => true,
            #[cfg(feature = "http")]
            Self::Reqwest(_) => true,
            _ => false,
        }
    }

    /// HTTP status code, if this is an HTTP error
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            #[cfg(feature = "http")]
            Self::Reqwest(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(feature = "http")]
impl From<url::ParseError> for NqError {
    fn from(err: url::ParseError) -> Self {
        Self::Transport(format!("invalid URL: {err}"))
    }
}
