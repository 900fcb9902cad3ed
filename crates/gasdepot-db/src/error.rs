//! # Database Error Types
//!
//! Error types for storage operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← categorised: NotFound, Conflict, constraint    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  RecordError (this module) ← what create() / list() return              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (backoffice-api) ← JSON + HTTP status for the terminal        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use gasdepot_core::{CoreError, ValidationError};
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - A delta targets an inventory row, counterparty or staff member
    ///   that does not exist in the store
    /// - `get` of an unknown transaction id
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// CHECK constraint violation.
    #[error("Constraint violation: {message}")]
    CheckViolation { message: String },

    /// The write lock could not be taken before the busy timeout.
    ///
    /// ## When This Occurs
    /// - Another terminal held the write lock for longer than the timeout
    ///
    /// Callers retry the whole operation from scratch.
    #[error("Write conflict: {0}")]
    Conflict(String),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// SQLite primary result codes for a lock that could not be taken.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Whether a database error is SQLITE_BUSY / SQLITE_LOCKED, including their
/// extended codes.
fn is_lock_error(db_err: &dyn sqlx::error::DatabaseError) -> bool {
    let by_code = db_err
        .code()
        .and_then(|code| code.parse::<i32>().ok())
        .map(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
        .unwrap_or(false);

    by_code || db_err.message().contains("database is locked")
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → busy/locked → Conflict,
///                               otherwise by constraint message
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                if is_lock_error(db_err.as_ref()) {
                    return DbError::Conflict(db_err.message().to_string());
                }

                let msg = db_err.message();

                // SQLite reports constraints as "<KIND> constraint failed: <detail>"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Record Error
// =============================================================================

/// What `TransactionRecorder::create` and the history reader return.
///
/// Every variant means "nothing happened": a failed `create()` leaves no
/// record and no ledger change behind, and the terminal may resubmit.
///
/// ```text
/// Validation         malformed request, rejected before any write
/// NotFound           SKU / counterparty / staff missing at write time
/// Conflict           write lock not obtained in time; retry from scratch
/// InsufficientStock  oversell under OversellPolicy::Reject
/// Persistence        the commit itself failed
/// ```
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Concurrent write conflict, retry the request: {0}")]
    Conflict(String),

    #[error("Insufficient stock for {item_ref} ({variant}): {counter} would become {resulting}")]
    InsufficientStock {
        item_ref: String,
        variant: String,
        counter: String,
        resulting: i64,
    },

    #[error("Persistence failure: {0}")]
    Persistence(#[source] DbError),
}

impl From<DbError> for RecordError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => RecordError::NotFound { entity, id },
            DbError::Conflict(message) => RecordError::Conflict(message),
            other => RecordError::Persistence(other),
        }
    }
}

impl From<sqlx::Error> for RecordError {
    fn from(err: sqlx::Error) -> Self {
        DbError::from(err).into()
    }
}

impl From<CoreError> for RecordError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => RecordError::Validation(v),
            CoreError::AmountOverflow { field } => {
                RecordError::Validation(ValidationError::invalid(field, "amount out of range"))
            }
            CoreError::InsufficientStock {
                item_ref,
                variant,
                counter,
                resulting,
            } => RecordError::InsufficientStock {
                item_ref,
                variant,
                counter,
                resulting,
            },
        }
    }
}

/// Result type for recorder and history operations.
pub type RecordResult<T> = Result<T, RecordError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[test]
    fn test_pool_timeout_maps_to_exhausted() {
        let err: DbError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, DbError::PoolExhausted));
    }

    #[test]
    fn test_record_error_classification() {
        let err: RecordError = DbError::Conflict("database is locked".to_string()).into();
        assert!(matches!(err, RecordError::Conflict(_)));

        let err: RecordError = DbError::not_found("Customer", "C1").into();
        assert!(matches!(err, RecordError::NotFound { .. }));

        let err: RecordError = DbError::QueryFailed("disk I/O error".to_string()).into();
        assert!(matches!(err, RecordError::Persistence(_)));

        let err: RecordError = CoreError::AmountOverflow {
            field: "subtotal".to_string(),
        }
        .into();
        assert!(matches!(err, RecordError::Validation(_)));
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(
            DbError::not_found("Customer", "C1").to_string(),
            "Customer not found: C1"
        );
    }
}
