//! # recovery-csv: CSV Layer for Invoice Recovery
//!
//! Reads the three database exports and writes the two import files.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Invoice Recovery Data Flow                          │
//! │                                                                         │
//! │  productos_rows.csv   facturas_rows.csv   operacion_stocks_rows.csv     │
//! │       │                     │                     │                     │
//! │       ▼                     ▼                     ▼                     │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  recovery-csv (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │    source     │    │     sink      │    │    error     │  │   │
//! │  │   │ load_products │    │ write_invoices│    │   CsvError   │  │   │
//! │  │   │ load_invoice_ │    │ write_lines   │    │  (fatal only)│  │   │
//! │  │   │ ids / ops     │    │               │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                           ▲                     │
//! │       ▼                                           │                     │
//! │  recovery-core Reconciler ─────────────► Reconciliation                 │
//! │                                                   │                     │
//! │                                                   ▼                     │
//! │        facturas_a_importar.csv   detalle_facturas_a_importar.csv        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`source`] - Export readers (products, invoices, stock operations)
//! - [`sink`] - Import file writers
//! - [`error`] - Fatal CSV errors
//!
//! ## Usage
//!
//! ```rust,ignore
//! use recovery_core::{ReconcileDefaults, Reconciler};
//! use recovery_csv::{load_invoice_ids, load_operations, load_products, write_invoices};
//!
//! let products = load_products(Path::new("productos_rows.csv"))?;
//! let existing = load_invoice_ids(Path::new("facturas_rows.csv"))?;
//! let defaults = ReconcileDefaults::default();
//!
//! let mut reconciler = Reconciler::new(&products, &existing, &defaults);
//! load_operations(Path::new("operacion_stocks_rows.csv"), |row, op| {
//!     reconciler.process(row, &op);
//! })?;
//!
//! let result = reconciler.finish();
//! write_invoices(Path::new("facturas_a_importar.csv"), &result.invoices)?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod sink;
pub mod source;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{CsvError, CsvResult};
pub use sink::{
    write_invoices, write_lines, write_records, WriteStatus, INVOICE_COLUMNS, LINE_COLUMNS,
};
pub use source::{
    load_invoice_ids, load_operations, load_products, read_invoice_ids, read_operations,
    read_products,
};
