//! # Application Error Type
//!
//! Everything that ends a run early. Each variant leads to exit code 1.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Where Errors Stop                                    │
//! │                                                                         │
//! │  ValidationError (per row) ──► logged in recovery-core, row skipped    │
//! │  CsvError::Write           ──► logged here, run continues              │
//! │  ConfigError / CsvError    ──► AppError ──► ❌ + ExitCode 1            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use recovery_csv::CsvError;
use thiserror::Error;

use crate::config::ConfigError;

/// Fatal errors of a recovery run.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Csv(#[from] CsvError),
}

/// Result type for the application.
pub type AppResult<T> = Result<T, AppError>;
