//! # Error Types
//!
//! Domain-specific error types for medstock-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  medstock-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule failures                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  medstock-db errors (separate crate)                                   │
//! │  └── DbError          - Storage failures (wraps CoreError)             │
//! │                                                                         │
//! │  Every error collapses to one ErrorKind for the caller:                │
//! │  NOT_FOUND • INVALID • ALREADY_EXISTS • INTERNAL                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Error Kind
// =============================================================================

/// The four error categories a caller of the inventory engine can observe.
///
/// The request layer maps these to status codes (404, 400, 409, 500); no
/// other internal detail crosses that boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Referenced product or user does not exist (or is soft-deleted).
    NotFound,
    /// Insufficient stock, malformed quantity, bad input.
    Invalid,
    /// Unique constraint violation.
    AlreadyExists,
    /// Storage, arithmetic or encoding failure.
    Internal,
}

impl ErrorKind {
    /// Returns the wire code, e.g. `"NOT_FOUND"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Invalid => "INVALID",
            ErrorKind::AlreadyExists => "ALREADY_EXISTS",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised while planning a stock change.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id does not resolve to a live product.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// User id does not resolve to a live user.
    #[error("User not found: {0}")]
    UserNotFound(i64),

    /// Removing the requested quantity would drive stock below zero.
    ///
    /// ## User Workflow
    /// ```text
    /// Stock Out (qty: 60)
    ///      │
    ///      ▼
    /// UPDATE stock = stock - 60  → post = -10
    ///      │
    ///      ▼
    /// InsufficientStock { available: 50, requested: 60 }
    ///      │
    ///      ▼
    /// Transaction rolled back, stock still 50
    /// ```
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: i64,
        available: i64,
        requested: i64,
    },

    /// A money or counter computation left the i64 range.
    #[error("Arithmetic overflow while computing {0}")]
    ArithmeticOverflow(&'static str),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Category of this error as seen by callers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::ProductNotFound(_) | CoreError::UserNotFound(_) => ErrorKind::NotFound,
            CoreError::InsufficientStock { .. } => ErrorKind::Invalid,
            CoreError::ArithmeticOverflow(_) => ErrorKind::Internal,
            CoreError::Validation(err) => err.kind(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g. email, date range).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g. product name, user email).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    /// Category of this error as seen by callers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::Duplicate { .. } => ErrorKind::AlreadyExists,
            _ => ErrorKind::Invalid,
        }
    }

    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
