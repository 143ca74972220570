//! # Invoice Recovery Command
//!
//! Library behind the `recover-invoices` binary.
//!
//! ## Module Organization
//! ```text
//! recovery_cli/
//! ├── lib.rs      ◄─── You are here (run & recover)
//! ├── config.rs   ◄─── CliArgs, RecoveryConfig (toml + env)
//! ├── console.rs  ◄─── Glyph formatter for tracing, success lines
//! └── error.rs    ◄─── AppError (fatal errors only)
//! ```
//!
//! ## Run Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         recover-invoices                                │
//! │                                                                         │
//! │  1. Initialize logging ──────────────────────────────────────────────► │
//! │     • glyph formatter on stdout, RUST_LOG or "info"                     │
//! │                                                                         │
//! │  2. Load configuration ──────────────────────────────────────────────► │
//! │     • defaults, recover.toml, RECOVER_* env, --dir                      │
//! │                                                                         │
//! │  3. Load indexes ────────────────────────────────────────────────────► │
//! │     • products (id → price), existing invoice ids                       │
//! │                                                                         │
//! │  4. Stream stock operations into the Reconciler ─────────────────────► │
//! │                                                                         │
//! │  5. Write import files ──────────────────────────────────────────────► │
//! │     • a failed write is logged, the other file is still written         │
//! │                                                                         │
//! │  Any fatal error in 2-4: ❌ message, no files written, exit code 1      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod console;
pub mod error;

use std::path::Path;
use std::process::ExitCode;

use recovery_core::{ReconcileStats, Reconciler};
use recovery_csv::{
    load_invoice_ids, load_operations, load_products, write_invoices, write_lines, CsvResult,
    WriteStatus,
};
use tracing::{error, info, warn};

pub use config::{CliArgs, ConfigError, RecoveryConfig, USAGE};
pub use error::{AppError, AppResult};

/// What a completed run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Products with a usable price.
    pub products: usize,

    /// Invoice ids already in the database.
    pub existing_invoices: usize,

    pub stats: ReconcileStats,

    /// Invoice file result; `None` when the write failed.
    pub invoices_file: Option<WriteStatus>,

    /// Line file result; `None` when the write failed.
    pub lines_file: Option<WriteStatus>,
}

impl RunReport {
    /// True when either import file could not be written.
    pub fn write_failed(&self) -> bool {
        self.invoices_file.is_none() || self.lines_file.is_none()
    }
}

/// Runs the command with the process arguments.
pub fn run() -> ExitCode {
    console::init_tracing();

    let args = match CliArgs::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            error!("{}", e);
            println!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    if args.help {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    let outcome = RecoveryConfig::load(args.config, args.dir)
        .map_err(AppError::from)
        .and_then(|config| recover(&config));

    match outcome {
        Ok(report) => {
            if report.write_failed() {
                warn!("Recovery finished with write errors");
            } else {
                console::success("Recovery finished");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Runs one recovery pass with a loaded configuration.
///
/// ## Errors
/// A missing or unreadable input, or a product export without the required
/// columns. Nothing is written in that case.
pub fn recover(config: &RecoveryConfig) -> AppResult<RunReport> {
    info!("Starting invoice recovery");

    let products = load_products(&config.products_path())?;
    let existing = load_invoice_ids(&config.invoices_path())?;

    info!("Processing stock operations to find orphaned sales");
    let mut reconciler = Reconciler::new(&products, &existing, &config.defaults);
    load_operations(&config.operations_path(), |row, op| {
        reconciler.process(row, &op);
    })?;
    let result = reconciler.finish();

    log_stats(&result.stats);
    if result.is_empty() {
        info!("No orphaned sales found, nothing to recover");
    }

    let invoices_path = config.invoice_output_path();
    let lines_path = config.line_output_path();
    let invoices_file = logged(&invoices_path, write_invoices(&invoices_path, &result.invoices));
    let lines_file = logged(&lines_path, write_lines(&lines_path, &result.lines));

    Ok(RunReport {
        products: products.len(),
        existing_invoices: existing.len(),
        stats: result.stats,
        invoices_file,
        lines_file,
    })
}

fn log_stats(stats: &ReconcileStats) {
    info!(
        rows = stats.rows_read,
        ignored = stats.ignored,
        already_invoiced = stats.already_invoiced,
        invalid = stats.invalid,
        unknown_product = stats.unknown_product,
        "Processing finished"
    );
    info!("{} new invoices will be created", stats.invoices);
    info!("{} new invoice lines will be created", stats.lines);

    if stats.rejected() > 0 {
        warn!(count = stats.rejected(), "Operations were skipped; see the row warnings above");
    }
    if stats.unknown_product > 0 {
        warn!(
            count = stats.unknown_product,
            "Operations with unknown products were dropped; their invoices may be under-totaled"
        );
    }
}

/// Reports a write result. Failures are logged and do not stop the run.
fn logged(path: &Path, outcome: CsvResult<WriteStatus>) -> Option<WriteStatus> {
    match outcome {
        Ok(WriteStatus::Written(rows)) => {
            console::success(format_args!("File written: {} ({rows} rows)", path.display()));
            Some(WriteStatus::Written(rows))
        }
        Ok(status) => Some(status),
        Err(e) => {
            error!("{}", e);
            None
        }
    }
}
