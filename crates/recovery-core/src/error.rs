//! # Error Types
//!
//! Domain-specific error types for recovery-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  recovery-core errors (this file)                                      │
//! │  ├── ValidationError  - A single field failed to parse or validate     │
//! │  └── RecordError      - A source row was dropped (row number attached) │
//! │                                                                         │
//! │  recovery-csv errors (separate crate)                                  │
//! │  └── CsvError         - Fatal: file missing, header mismatch, I/O      │
//! │                                                                         │
//! │  recovery-cli errors (binary)                                          │
//! │  └── AppError         - What ends the run with exit code 1             │
//! │                                                                         │
//! │  RecordError never aborts a run: it is logged and counted.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Field-level validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value could not be parsed.
    #[error("{field} has invalid format '{value}': {reason}")]
    InvalidFormat {
        field: String,
        value: String,
        reason: String,
    },

    /// Value must be greater than zero.
    #[error("{field} must be positive, got '{value}'")]
    MustBePositive { field: String, value: String },

    /// Value must be zero or greater.
    #[error("{field} must not be negative, got '{value}'")]
    Negative { field: String, value: String },
}

impl ValidationError {
    /// Creates a Required error for a field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates an InvalidFormat error.
    pub fn invalid_format(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Record Error
// =============================================================================

/// A source row that was skipped.
///
/// ## When This Occurs
/// - Price, quantity or another field failed validation
/// - An operation references a product missing from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// A field on the row failed validation.
    #[error("row {row}: {source}")]
    Invalid {
        row: u64,
        #[source]
        source: ValidationError,
    },

    /// The operation's product is not in the product index.
    #[error("row {row}: product {product_id} (operation {operation}) not found in products")]
    UnknownProduct {
        row: u64,
        product_id: String,
        operation: String,
    },
}

impl RecordError {
    /// Attaches a row number to a validation failure.
    pub fn invalid(row: u64, source: ValidationError) -> Self {
        RecordError::Invalid { row, source }
    }

    /// Returns the source row this error refers to.
    pub fn row(&self) -> u64 {
        match self {
            RecordError::Invalid { row, .. } | RecordError::UnknownProduct { row, .. } => *row,
        }
    }
}

/// Convenience type alias for per-record results.
pub type RecordResult<T> = Result<T, RecordError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(
            ValidationError::required("producto_id").to_string(),
            "producto_id is required"
        );

        let err = ValidationError::Negative {
            field: "precio_venta".to_string(),
            value: "-1".to_string(),
        };
        assert_eq!(err.to_string(), "precio_venta must not be negative, got '-1'");
    }

    #[test]
    fn test_record_error_messages() {
        let err = RecordError::invalid(
            7,
            ValidationError::invalid_format("cantidad_cambio", "abc", "not a number"),
        );
        assert_eq!(
            err.to_string(),
            "row 7: cantidad_cambio has invalid format 'abc': not a number"
        );
        assert_eq!(err.row(), 7);

        let err = RecordError::UnknownProduct {
            row: 3,
            product_id: "P9".to_string(),
            operation: "op-1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "row 3: product P9 (operation op-1) not found in products"
        );
    }
}
