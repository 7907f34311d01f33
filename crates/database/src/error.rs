use sqlx::error::ErrorKind;
use thiserror::Error;

/// Failure classes surfaced by the query gateway.
///
/// A lookup that matches no row is `NotFound`, so callers can tell an absent
/// record apart from a store that could not be reached.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Invalid database connection settings: {0}")]
    ConnectionConfigError(String),

    #[error("Failed to reach the database: {0}")]
    ConnectionError(#[source] sqlx::Error),

    #[error("The database rejected the write: {message}")]
    ConstraintViolation {
        /// Name of the violated constraint, when the store reports one.
        constraint: Option<String>,
        message: String,
    },

    #[error("The requested data was not found in the database.")]
    NotFound,

    #[error("Database query failed: {0}")]
    QueryError(#[source] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
}

impl DbError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound)
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, DbError::ConstraintViolation { .. })
    }

    pub(crate) fn constraint(constraint: &str, message: impl Into<String>) -> Self {
        DbError::ConstraintViolation {
            constraint: Some(constraint.to_string()),
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound,
            sqlx::Error::Configuration(e) => DbError::ConnectionConfigError(e.to_string()),
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => DbError::ConstraintViolation {
                    constraint: db_err.constraint().map(str::to_string),
                    message: db_err.message().to_string(),
                },
                _ => DbError::QueryError(sqlx::Error::Database(db_err)),
            },
            e @ (sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed) => DbError::ConnectionError(e),
            e => DbError::QueryError(e),
        }
    }
}

/// Turns a `NotFound` miss back into `Ok(None)` for callers that treat absence
/// as a normal outcome.
pub trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, DbError>;
}

impl<T> OptionalExt<T> for Result<T, DbError> {
    fn optional(self) -> Result<Option<T>, DbError> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(DbError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
