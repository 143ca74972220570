//! # recover-invoices
//!
//! Rebuilds invoices that never reached the database from the stock
//! operations that reference them.
//!
//! ## Usage
//! ```bash
//! # Read and write in the current directory
//! recover-invoices
//!
//! # Exports in another directory
//! recover-invoices --dir ./exports
//!
//! # Custom file names and defaults
//! recover-invoices --config recover.toml
//! ```
//!
//! The setup lives in lib.rs so it can be tested.

use std::process::ExitCode;

fn main() -> ExitCode {
    recovery_cli::run()
}
