//! Error types for pagequery

use thiserror::Error;

/// Boxed driver error carried by [`QueryError::Execution`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for pagequery operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Error types for building and running queries
#[derive(Debug, Error)]
pub enum QueryError {
    /// The query description violates the input contract.
    ///
    /// Raised before any SQL text is produced. Fix the input; never retry.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The executor failed (connectivity, syntax, constraint violation, ...).
    ///
    /// The driver error is kept unchanged as the `source()`.
    #[error("Execution error: {0}")]
    Execution(#[source] BoxError),
}

impl QueryError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Wrap an executor failure
    pub fn execution(err: impl Into<BoxError>) -> Self {
        Self::Execution(err.into())
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is an execution error
    pub fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }
}

impl From<tokio_postgres::Error> for QueryError {
    fn from(err: tokio_postgres::Error) -> Self {
        Self::Execution(Box::new(err))
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for QueryError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Execution(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn validation_is_distinguished_from_execution() {
        let err = QueryError::validation("table name required");
        assert!(err.is_validation());
        assert!(!err.is_execution());
        assert_eq!(err.to_string(), "Validation error: table name required");
    }

    #[test]
    fn execution_keeps_driver_error_as_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let err = QueryError::execution(io);
        assert!(err.is_execution());
        assert_eq!(err.to_string(), "Execution error: reset by peer");

        let source = err.source().expect("source");
        let io = source
            .downcast_ref::<std::io::Error>()
            .expect("io error source");
        assert_eq!(io.kind(), std::io::ErrorKind::ConnectionReset);
    }
}
