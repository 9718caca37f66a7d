//! Error types for jobly

use thiserror::Error;

/// Result type alias for jobly operations
pub type JoblyResult<T> = Result<T, JoblyError>;

/// Error types for query compilation and repository operations
#[derive(Debug, Error)]
pub enum JoblyError {
    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Filter set contains keys outside the entity's allow-list
    #[error("Incorrect queries: {}", .0.join(", "))]
    InvalidFilterKeys(Vec<String>),

    /// Unique constraint violation
    #[error("Unique constraint violation on {constraint}: {source}")]
    UniqueViolation {
        constraint: String,
        #[source]
        source: tokio_postgres::Error,
    },

    /// Foreign key constraint violation
    #[error("Foreign key violation on {constraint}: {source}")]
    ForeignKeyViolation {
        constraint: String,
        #[source]
        source: tokio_postgres::Error,
    },

    /// Check constraint violation
    #[error("Check constraint violation on {constraint}: {source}")]
    CheckViolation {
        constraint: String,
        #[source]
        source: tokio_postgres::Error,
    },

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Migration error
    #[cfg(feature = "migrate")]
    #[error("Migration error: {0}")]
    Migration(String),
}

impl JoblyError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a rejected filter set
    pub fn is_invalid_filter(&self) -> bool {
        matches!(self, Self::InvalidFilterKeys(_))
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation { .. })
    }

    /// The server-side error behind a query or constraint failure.
    pub fn db_error(&self) -> Option<&tokio_postgres::error::DbError> {
        match self {
            Self::Query(source)
            | Self::UniqueViolation { source, .. }
            | Self::ForeignKeyViolation { source, .. }
            | Self::CheckViolation { source, .. } => source.as_db_error(),
            _ => None,
        }
    }

    /// HTTP status an outer routing layer should answer with.
    ///
    /// Unknown filter keys are reported as not-found, the same as a missing row.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::CheckViolation { .. } | Self::ForeignKeyViolation { .. } => {
                400
            }
            Self::NotFound(_) | Self::InvalidFilterKeys(_) => 404,
            Self::UniqueViolation { .. } => 409,
            _ => 500,
        }
    }

    /// Parse a tokio_postgres error into a more specific JoblyError
    ///
    /// The original error stays reachable through `db_error()` and `source()`.
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        let Some(db_err) = err.as_db_error() else {
            return Self::Query(err);
        };
        let code = db_err.code().clone();
        let constraint = db_err.constraint().unwrap_or("unknown").to_string();

        match code.code() {
            "23505" => Self::UniqueViolation {
                constraint,
                source: err,
            },
            "23503" => Self::ForeignKeyViolation {
                constraint,
                source: err,
            },
            "23514" => Self::CheckViolation {
                constraint,
                source: err,
            },
            _ => Self::Query(err),
        }
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for JoblyError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

#[cfg(feature = "migrate")]
impl From<refinery::Error> for JoblyError {
    fn from(err: refinery::Error) -> Self {
        Self::Migration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_filter_keys_lists_offenders() {
        let err = JoblyError::InvalidFilterKeys(vec!["color".to_string(), "size".to_string()]);
        assert_eq!(err.to_string(), "Incorrect queries: color, size");
        assert!(err.is_invalid_filter());
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn not_found_carries_message() {
        let err = JoblyError::not_found("Job 1000000 not found");
        assert_eq!(err.to_string(), "Not found: Job 1000000 not found");
        assert!(err.is_not_found());
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn validation_is_client_error() {
        let err = JoblyError::validation("no data supplied");
        assert!(err.is_validation());
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn non_database_errors_carry_no_db_error() {
        assert!(JoblyError::validation("no data supplied").db_error().is_none());
        assert!(!JoblyError::not_found("No company: nope").is_unique_violation());
    }
}
