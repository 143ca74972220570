//! # Reconciliation Engine
//!
//! Folds stock operations into synthesized invoices and invoice lines.
//!
//! ## Per-Record Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Reconciler::process(row, op)                       │
//! │                                                                         │
//! │  1. tipo_operacion == VENTA && factura_uuid != ""?  no ──► Ignored      │
//! │  2. factura_uuid in InvoiceSet?                    yes ──► Invoiced     │
//! │  3. parse cantidad / timestamp / vendedor           err ──► Rejected    │
//! │  4. producto_id in ProductIndex?                    no ──► Rejected     │
//! │  5. emit SynthesizedLine (fresh id)                                     │
//! │  6. upsert SynthesizedInvoice by factura_uuid      ──► Recovered        │
//! │                                                                         │
//! │  Invoices keep first-seen order, lines keep source order.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Known Limitation
//! An operation with an unknown product is dropped entirely. When other
//! operations of the same invoice resolve, the synthesized invoice's total
//! omits the dropped line's value.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::catalog::{InvoiceSet, ProductIndex};
use crate::error::{RecordError, ValidationError};
use crate::money::Money;
use crate::types::{
    InvoiceStatus, PaymentMethod, StockOperation, SynthesizedInvoice, SynthesizedLine,
};
use crate::validation::{is_iso_timestamp, parse_quantity, require};

// =============================================================================
// Defaults
// =============================================================================

/// Values filled into synthesized records when the source has none.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReconcileDefaults {
    /// Seller used when `vendedor_id` is missing or empty.
    pub seller_id: String,

    /// Customer assigned to every synthesized invoice.
    pub customer_id: String,

    /// Tag in front of the display number: `<prefix>-<first 8 chars>`.
    pub number_prefix: String,

    /// Timestamp used when an operation has none.
    pub timestamp_fallback: String,
}

impl Default for ReconcileDefaults {
    fn default() -> Self {
        ReconcileDefaults {
            seller_id: "1".to_string(),
            customer_id: "1".to_string(),
            number_prefix: "RECUPERADA".to_string(),
            timestamp_fallback: "now()".to_string(),
        }
    }
}

impl ReconcileDefaults {
    /// Every default must be non-empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("seller_id", &self.seller_id),
            ("customer_id", &self.customer_id),
            ("number_prefix", &self.number_prefix),
            ("timestamp_fallback", &self.timestamp_fallback),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(ValidationError::required(field));
            }
        }
        Ok(())
    }

    /// Display number for an invoice id.
    ///
    /// ```rust
    /// use recovery_core::ReconcileDefaults;
    ///
    /// let defaults = ReconcileDefaults::default();
    /// assert_eq!(
    ///     defaults.invoice_number("550e8400-e29b-41d4-a716-446655440000"),
    ///     "RECUPERADA-550e8400"
    /// );
    /// ```
    pub fn invoice_number(&self, invoice_id: &str) -> String {
        let short: String = invoice_id.chars().take(8).collect();
        format!("{}-{}", self.number_prefix, short)
    }
}

// =============================================================================
// Line Identifiers
// =============================================================================

/// Source of identifiers for synthesized lines.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Random UUID v4 identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

impl<F: FnMut() -> String> IdGenerator for F {
    fn next_id(&mut self) -> String {
        self()
    }
}

// =============================================================================
// Outcome & Statistics
// =============================================================================

/// What happened to a single operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not a sale, or a sale without an invoice id.
    Ignored,
    /// The invoice already exists.
    AlreadyInvoiced,
    /// The row was dropped.
    Rejected(RecordError),
    /// A line was synthesized; `new_invoice` is true for the invoice's first line.
    Recovered { new_invoice: bool },
}

/// Counters for the run summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub rows_read: usize,
    pub ignored: usize,
    pub already_invoiced: usize,
    /// Rows with a missing or malformed field.
    pub invalid: usize,
    pub unknown_product: usize,
    pub lines: usize,
    pub invoices: usize,
}

impl ReconcileStats {
    fn record(&mut self, outcome: &Outcome) {
        self.rows_read += 1;
        match outcome {
            Outcome::Ignored => self.ignored += 1,
            Outcome::AlreadyInvoiced => self.already_invoiced += 1,
            Outcome::Rejected(RecordError::Invalid { .. }) => self.invalid += 1,
            Outcome::Rejected(RecordError::UnknownProduct { .. }) => self.unknown_product += 1,
            Outcome::Recovered { new_invoice } => {
                self.lines += 1;
                if *new_invoice {
                    self.invoices += 1;
                }
            }
        }
    }

    /// Rows that were orphaned sales but produced nothing.
    pub fn rejected(&self) -> usize {
        self.invalid + self.unknown_product
    }
}

/// Result of a reconciliation pass.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Synthesized invoices, first-seen order.
    pub invoices: Vec<SynthesizedInvoice>,
    /// Synthesized lines, source order.
    pub lines: Vec<SynthesizedLine>,
    pub stats: ReconcileStats,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.invoices.is_empty() && self.lines.is_empty()
    }
}

// =============================================================================
// Reconciler
// =============================================================================

/// Fields of an operation that passed step 3.
struct ParsedSale<'op> {
    product_id: &'op str,
    raw_quantity: &'op str,
    quantity: i64,
    timestamp: &'op str,
    seller_id: &'op str,
}

/// Step 3: required fields, quantity, and defaulted timestamp / seller.
fn parse_sale<'s>(
    op: &'s StockOperation,
    defaults: &'s ReconcileDefaults,
) -> Result<ParsedSale<'s>, ValidationError> {
    let product_id = require("producto_id", &op.producto_id)?;
    let raw_quantity = require("cantidad_cambio", &op.cantidad_cambio)?;
    let quantity = parse_quantity("cantidad_cambio", raw_quantity)?;

    let timestamp = op
        .timestamp
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or(defaults.timestamp_fallback.as_str());

    let seller_id = op
        .vendedor_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(defaults.seller_id.as_str());

    Ok(ParsedSale {
        product_id,
        raw_quantity,
        quantity,
        timestamp,
        seller_id,
    })
}

fn amount_too_large(row: u64, sale: &ParsedSale<'_>) -> RecordError {
    RecordError::invalid(
        row,
        ValidationError::invalid_format("cantidad_cambio", sale.raw_quantity, "amount too large"),
    )
}

/// Single-pass reconciliation state.
///
/// ## Usage
/// ```rust
/// use recovery_core::{
///     InvoiceSet, Money, ProductIndex, ReconcileDefaults, Reconciler, StockOperation,
/// };
///
/// let price: Money = "10.00".parse().unwrap();
/// let products: ProductIndex = [("P1", price)].into_iter().collect();
/// let existing = InvoiceSet::new();
/// let defaults = ReconcileDefaults::default();
///
/// let mut reconciler = Reconciler::new(&products, &existing, &defaults);
/// reconciler.process(2, &StockOperation {
///     tipo_operacion: Some("VENTA".into()),
///     factura_uuid: Some("F1".into()),
///     producto_id: Some("P1".into()),
///     cantidad_cambio: Some("-3".into()),
///     timestamp: Some("2024-01-01".into()),
///     ..Default::default()
/// });
///
/// let result = reconciler.finish();
/// assert_eq!(result.invoices[0].total.to_string(), "30.00");
/// assert_eq!(result.lines[0].quantity, 3);
/// ```
pub struct Reconciler<'a, G = UuidGenerator> {
    products: &'a ProductIndex,
    existing: &'a InvoiceSet,
    defaults: &'a ReconcileDefaults,
    ids: G,
    invoices: Vec<SynthesizedInvoice>,
    positions: HashMap<String, usize>,
    flagged_timestamps: HashSet<usize>,
    lines: Vec<SynthesizedLine>,
    stats: ReconcileStats,
}

impl<'a> Reconciler<'a, UuidGenerator> {
    /// Creates a reconciler that assigns UUID v4 line ids.
    pub fn new(
        products: &'a ProductIndex,
        existing: &'a InvoiceSet,
        defaults: &'a ReconcileDefaults,
    ) -> Self {
        Reconciler::with_id_generator(products, existing, defaults, UuidGenerator)
    }
}

impl<'a, G: IdGenerator> Reconciler<'a, G> {
    /// Creates a reconciler with a custom line id source.
    pub fn with_id_generator(
        products: &'a ProductIndex,
        existing: &'a InvoiceSet,
        defaults: &'a ReconcileDefaults,
        ids: G,
    ) -> Self {
        Reconciler {
            products,
            existing,
            defaults,
            ids,
            invoices: Vec::new(),
            positions: HashMap::new(),
            flagged_timestamps: HashSet::new(),
            lines: Vec::new(),
            stats: ReconcileStats::default(),
        }
    }

    /// Processes one operation. `row` is its line number in the source.
    ///
    /// Rejected rows are logged here at WARN with their row number.
    pub fn process(&mut self, row: u64, op: &StockOperation) -> Outcome {
        let outcome = self.evaluate(row, op);
        if let Outcome::Rejected(err) = &outcome {
            warn!(row, operation = op.label(), "Skipping operation: {}", err);
        }
        self.stats.record(&outcome);
        outcome
    }

    fn evaluate(&mut self, row: u64, op: &StockOperation) -> Outcome {
        let Some(invoice_id) = op.sale_invoice() else {
            return Outcome::Ignored;
        };

        if self.existing.contains(invoice_id) {
            return Outcome::AlreadyInvoiced;
        }

        let sale = match parse_sale(op, self.defaults) {
            Ok(sale) => sale,
            Err(e) => return Outcome::Rejected(RecordError::invalid(row, e)),
        };

        let Some(unit_price) = self.products.price(sale.product_id) else {
            return Outcome::Rejected(RecordError::UnknownProduct {
                row,
                product_id: sale.product_id.to_string(),
                operation: op.label().to_string(),
            });
        };

        let Some(line_total) = unit_price.checked_mul_quantity(sale.quantity) else {
            return Outcome::Rejected(amount_too_large(row, &sale));
        };

        let new_invoice = match self.positions.get(invoice_id).copied() {
            Some(pos) => {
                if self.invoices[pos].add_line_total(line_total).is_none() {
                    return Outcome::Rejected(amount_too_large(row, &sale));
                }
                self.touch_invoice(row, pos, sale.timestamp);
                false
            }
            None => {
                self.open_invoice(invoice_id, &sale, line_total);
                true
            }
        };

        self.lines.push(SynthesizedLine {
            id: self.ids.next_id(),
            invoice_id: invoice_id.to_string(),
            product_id: sale.product_id.to_string(),
            quantity: sale.quantity,
            unit_price,
            line_total,
            created_at: sale.timestamp.to_string(),
            updated_at: sale.timestamp.to_string(),
            invoice_numeric_id: None,
            deleted_at: None,
        });

        Outcome::Recovered { new_invoice }
    }

    /// Moves `updated_at` forward, warning once per invoice about
    /// timestamps whose string order is not chronological.
    fn touch_invoice(&mut self, row: u64, pos: usize, timestamp: &str) {
        let invoice = &mut self.invoices[pos];

        let comparable = is_iso_timestamp(&invoice.updated_at) && is_iso_timestamp(timestamp);
        if !comparable && self.flagged_timestamps.insert(pos) {
            warn!(
                row,
                invoice = %invoice.id,
                current = %invoice.updated_at,
                candidate = timestamp,
                "Non ISO-8601 timestamp; updated_at uses plain string order"
            );
        }
        invoice.touch(timestamp);
    }

    fn open_invoice(&mut self, invoice_id: &str, sale: &ParsedSale<'_>, amount: Money) {
        let timestamp = sale.timestamp.to_string();
        self.positions.insert(invoice_id.to_string(), self.invoices.len());
        self.invoices.push(SynthesizedInvoice {
            id: invoice_id.to_string(),
            number: self.defaults.invoice_number(invoice_id),
            issued_at: timestamp.clone(),
            seller_id: sale.seller_id.to_string(),
            customer_id: self.defaults.customer_id.clone(),
            subtotal: amount,
            tax: Money::zero(),
            total: amount,
            status: InvoiceStatus::Paid,
            payment_method: PaymentMethod::Cash,
            created_at: timestamp.clone(),
            updated_at: timestamp,
            deleted_at: None,
        });
    }

    /// Ends the pass and hands over the synthesized records.
    pub fn finish(self) -> Reconciliation {
        Reconciliation {
            invoices: self.invoices,
            lines: self.lines,
            stats: self.stats,
        }
    }
}

/// Runs a whole pass over `(row, operation)` pairs.
pub fn reconcile<I>(
    products: &ProductIndex,
    existing: &InvoiceSet,
    defaults: &ReconcileDefaults,
    operations: I,
) -> Reconciliation
where
    I: IntoIterator<Item = (u64, StockOperation)>,
{
    let mut reconciler = Reconciler::new(products, existing, defaults);
    for (row, op) in operations {
        reconciler.process(row, &op);
    }
    reconciler.finish()
}

// =============================================================================
// Unit Tests
// =============================================================================
