//! # Error Types
//!
//! Structured error types for strip_core. A failed extraction carries enough
//! context (file, line, value) for the caller to report the problem without
//! re-reading the inputs.
//!
//! ## Example
//!
//! ```rust
//! use strip_core::errors::{StripError, StripResult};
//!
//! fn validate_draft(draft_m: f64) -> StripResult<()> {
//!     if draft_m <= 0.0 {
//!         return Err(StripError::InvalidInput {
//!             field: "draft_m".to_string(),
//!             value: draft_m.to_string(),
//!             reason: "Draft must be positive".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Numeric degeneracies (a zero natural frequency, NaN amplitudes) are NOT
//! errors: the solver and load integrator propagate non-finite values and the
//! caller checks the final matrices before display.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for strip_core operations
pub type StripResult<T> = Result<T, StripError>;

/// Structured error type for the calculation pipeline.
///
/// Each variant provides specific context about what went wrong, so the
/// presentation layer can show a precise diagnostic instead of "no results".
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum StripError {
    /// An input value is invalid (out of range, wrong length, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A geometry or reference table could not be parsed
    #[error("Malformed table '{path}' line {line}: {reason}")]
    TableFormat {
        path: String,
        line: usize,
        reason: String,
    },

    /// A reference lookup had no matching entry
    #[error("Lookup miss in {table} for {key}: {reason}")]
    LookupMiss {
        table: String,
        key: String,
        reason: String,
    },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// Staging file is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl StripError {
    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        StripError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a TableFormat error
    pub fn table_format(path: impl Into<String>, line: usize, reason: impl Into<String>) -> Self {
        StripError::TableFormat {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }

    /// Create a LookupMiss error
    pub fn lookup_miss(
        table: impl Into<String>,
        key: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        StripError::LookupMiss {
            table: table.into(),
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        StripError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(
        path: impl Into<String>,
        locked_by: impl Into<String>,
        locked_at: impl Into<String>,
    ) -> Self {
        StripError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StripError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            StripError::InvalidInput { .. } => "INVALID_INPUT",
            StripError::TableFormat { .. } => "TABLE_FORMAT",
            StripError::LookupMiss { .. } => "LOOKUP_MISS",
            StripError::FileError { .. } => "FILE_ERROR",
            StripError::FileLocked { .. } => "FILE_LOCKED",
            StripError::Serialization { .. } => "SERIALIZATION_ERROR",
        }
    }
}
