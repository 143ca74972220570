//! # CSV Error Types
//!
//! Fatal errors of the CSV layer.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  std::io::Error / csv::Error                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CsvError (this module) ← Adds the file path                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AppError (binary) ← Ends the run with exit code 1                     │
//! │                                                                         │
//! │  Per-row problems never become a CsvError: they are logged and         │
//! │  the row is skipped.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

/// CSV source and sink errors.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Input file does not exist.
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Header row lacks columns every record needs.
    ///
    /// ## When This Occurs
    /// - Export taken from the wrong table
    /// - Renamed column (`precio` instead of `precio_venta`)
    #[error("{source_name}: missing required columns {columns:?}")]
    MissingColumns {
        source_name: String,
        columns: Vec<String>,
    },

    /// Reading the file failed part way.
    #[error("Failed to read {source_name}: {source}")]
    Read {
        source_name: String,
        #[source]
        source: csv::Error,
    },

    /// Writing an output file failed.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// File system error outside the CSV codec (open, flush).
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CsvError {
    /// Creates a Read error for a named source.
    pub fn read(source_name: impl Into<String>, source: csv::Error) -> Self {
        CsvError::Read {
            source_name: source_name.into(),
            source,
        }
    }

    /// Creates an Io error for a path.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        CsvError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;
