//! # Database Error Types
//!
//! Error types for storage operations and the caller-facing error response.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)       CoreError (medstock-core)            │
//! │       │                                │                                │
//! │       └──────────────┬─────────────────┘                                │
//! │                      ▼                                                  │
//! │  DbError (this module) ← Adds context and categorization               │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │  ErrorResponse { code: ErrorKind, message } ← what the caller sees     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;

use medstock_core::{CoreError, ErrorKind};

/// Database operation errors.
///
/// These errors wrap sqlx errors and domain errors so that every failure
/// of an inventory operation maps onto one [`ErrorKind`].
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - ID doesn't exist
    /// - Soft-deleted record
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - A live product already has this name
    /// - A live user already has this email
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - A movement references a product or user that doesn't exist
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Business rule violation (insufficient stock, validation, overflow).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    ///
    /// ## When This Occurs
    /// - CHECK constraint failure
    /// - Append-only trigger fired on the movements table
    /// - Stats row missing
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
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Fills in the offending value of a UniqueViolation raised by SQLite,
    /// which only reports the column.
    pub(crate) fn with_duplicate_value(self, value: &str) -> Self {
        match self {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, value),
            other => other,
        }
    }

    /// Category of this error as seen by callers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::NotFound { .. } => ErrorKind::NotFound,
            DbError::UniqueViolation { .. } => ErrorKind::AlreadyExists,
            // Only raised when a movement points at a missing product or user
            DbError::ForeignKeyViolation { .. } => ErrorKind::NotFound,
            DbError::Core(err) => err.kind(),
            DbError::ConnectionFailed(_)
            | DbError::MigrationFailed(_)
            | DbError::QueryFailed(_)
            | DbError::PoolExhausted
            | DbError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// True when the caller asked to remove more than is on hand.
    pub fn is_insufficient_stock(&self) -> bool {
        matches!(self, DbError::Core(CoreError::InsufficientStock { .. }))
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // FK constraint: "FOREIGN KEY constraint failed"
                if let Some(target) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    let field = target
                        .rsplit_once('.')
                        .map(|(_, column)| column)
                        .unwrap_or(target)
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
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
// Error Response
// =============================================================================

/// The error shape handed to whatever sits in front of the engine.
///
/// ## JSON Format
/// ```json
/// { "code": "INVALID", "message": "Insufficient stock for product 7: ..." }
/// ```
///
/// Internal failures are reported without their storage detail; that goes
/// to the log instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub code: ErrorKind,
    pub message: String,
}

impl From<&DbError> for ErrorResponse {
    fn from(err: &DbError) -> Self {
        let code = err.kind();
        let message = match code {
            ErrorKind::Internal => {
                tracing::error!(error = %err, "Internal error");
                "Internal error".to_string()
            }
            _ => err.to_string(),
        };
        ErrorResponse { code, message }
    }
}

impl From<DbError> for ErrorResponse {
    fn from(err: DbError) -> Self {
        ErrorResponse::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medstock_core::ValidationError;

    #[test]
    fn test_kinds() {
        assert_eq!(DbError::not_found("Product", 4).kind(), ErrorKind::NotFound);
        assert_eq!(
            DbError::duplicate("email", "a@b.co").kind(),
            ErrorKind::AlreadyExists
        );
        assert_eq!(
            DbError::ForeignKeyViolation {
                message: "FOREIGN KEY constraint failed".to_string()
            }
            .kind(),
            ErrorKind::NotFound
        );
        assert_eq!(DbError::PoolExhausted.kind(), ErrorKind::Internal);

        let insufficient = DbError::from(CoreError::InsufficientStock {
            product_id: 1,
            available: 2,
            requested: 3,
        });
        assert_eq!(insufficient.kind(), ErrorKind::Invalid);
        assert!(insufficient.is_insufficient_stock());
    }

    #[test]
    fn test_with_duplicate_value() {
        let err = DbError::duplicate("email", "unknown").with_duplicate_value("a@b.co");
        assert_eq!(err.to_string(), "Duplicate email: 'a@b.co' already exists");

        let untouched = DbError::PoolExhausted.with_duplicate_value("x");
        assert!(matches!(untouched, DbError::PoolExhausted));
    }

    #[test]
    fn test_error_response() {
        let err = DbError::from(CoreError::from(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }));
        let response = ErrorResponse::from(&err);
        assert_eq!(response.code, ErrorKind::Invalid);
        assert_eq!(response.message, "Validation error: quantity must be positive");

        let internal = ErrorResponse::from(DbError::QueryFailed("no such table: stats".into()));
        assert_eq!(internal.code, ErrorKind::Internal);
        assert_eq!(internal.message, "Internal error");

        let json = serde_json::to_string(&internal).unwrap();
        assert_eq!(json, r#"{"code":"INTERNAL","message":"Internal error"}"#);
    }
}
