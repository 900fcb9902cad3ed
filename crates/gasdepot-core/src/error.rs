//! # Error Types
//!
//! Domain-specific error types for gasdepot-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  gasdepot-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Malformed requests (nothing touched)           │
//! │                                                                         │
//! │  gasdepot-db errors (separate crate)                                   │
//! │  ├── DbError          - Storage failures                               │
//! │  └── RecordError      - What TransactionRecorder::create returns       │
//! │                                                                         │
//! │  backoffice-api errors                                                 │
//! │  └── ApiError         - What the POS terminal sees (JSON)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised while planning or applying a transaction.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A counter would go negative and the oversell policy is `Reject`.
    ///
    /// ## When This Occurs
    /// ```text
    /// Sale: 5 × LPG-12KG
    ///      │
    ///      ▼
    /// full: 3 - 5 = -2   (inside the open database transaction)
    ///      │
    ///      ▼
    /// InsufficientStock { item_ref: "LPG-12KG", counter: "full", resulting: -2 }
    ///      │
    ///      ▼
    /// Whole transaction rolled back
    /// ```
    #[error("Insufficient stock for {item_ref} ({variant}): {counter} would become {resulting}")]
    InsufficientStock {
        item_ref: String,
        variant: String,
        counter: String,
        resulting: i64,
    },

    /// An amount computation overflowed the i64 range.
    #[error("Amount overflow while computing {field}")]
    AmountOverflow { field: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any write; a request that fails validation never opens a
/// database transaction.
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
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid date range, unknown sort field).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Creates a Required error for a field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates an InvalidFormat error.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
