//! # recovery-core: Pure Reconciliation Logic
//!
//! Finds sale operations whose invoice never reached the database and
//! rebuilds the missing invoices and invoice lines from them.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Invoice Recovery Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                recover-invoices (apps/recovery-cli)             │   │
//! │  │        config ──► load indexes ──► reconcile ──► write          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                recovery-csv (sources and sinks)                 │   │
//! │  │     productos / facturas / operacion_stocks ──► rows            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ recovery-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  catalog  │  │ reconcile │  │   │
//! │  │   │  rows in  │  │   Money   │  │ Products  │  │ Reconciler│  │   │
//! │  │   │ records   │  │ (decimal) │  │ Invoices  │  │   stats   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO FILES • NO CONSOLE • SINGLE PASS                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Input rows and synthesized records
//! - [`money`] - Exact decimal money type
//! - [`error`] - Per-record error types
//! - [`validation`] - Field parsers (price, quantity, timestamps)
//! - [`catalog`] - Product index and existing-invoice set
//! - [`reconcile`] - The reconciliation engine
//!
//! ## Example Usage
//!
//! ```rust
//! use recovery_core::{reconcile, InvoiceSet, Money, ProductIndex, ReconcileDefaults, StockOperation};
//!
//! let price: Money = "10.00".parse().unwrap();
//! let products: ProductIndex = [("P1", price)].into_iter().collect();
//! let existing: InvoiceSet = ["F-OLD"].into_iter().collect();
//!
//! let op = StockOperation {
//!     tipo_operacion: Some("VENTA".into()),
//!     factura_uuid: Some("F1".into()),
//!     producto_id: Some("P1".into()),
//!     cantidad_cambio: Some("-2".into()),
//!     timestamp: Some("2024-01-01".into()),
//!     ..Default::default()
//! };
//!
//! let result = reconcile(&products, &existing, &ReconcileDefaults::default(), [(2, op)]);
//! assert_eq!(result.invoices.len(), 1);
//! assert_eq!(result.invoices[0].total.to_string(), "20.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod money;
pub mod reconcile;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::{InvoiceSet, ProductIndex};
pub use error::{RecordError, RecordResult, ValidationError};
pub use money::Money;
pub use reconcile::{
    reconcile, IdGenerator, Outcome, ReconcileDefaults, ReconcileStats, Reconciler,
    Reconciliation, UuidGenerator,
};
pub use types::*;
