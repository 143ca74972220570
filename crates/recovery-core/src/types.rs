//! # Domain Types
//!
//! Raw rows read from the exports and the records synthesized from them.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  INPUT ROWS (all fields optional)       OUTPUT RECORDS                  │
//! │                                                                         │
//! │  ┌─────────────────┐                    ┌──────────────────────┐        │
//! │  │ ProductRecord   │──► ProductIndex    │ SynthesizedInvoice   │        │
//! │  │ id, precio_venta│                    │ uuid, numero_factura │        │
//! │  └─────────────────┘                    │ subtotal == total    │        │
//! │  ┌─────────────────┐                    └──────────▲───────────┘        │
//! │  │ InvoiceRecord   │──► InvoiceSet                 │ 1:N factura_uuid   │
//! │  │ uuid            │                    ┌──────────┴───────────┐        │
//! │  └─────────────────┘                    │ SynthesizedLine      │        │
//! │  ┌─────────────────┐                    │ cantidad × precio    │        │
//! │  │ StockOperation  │──► Reconciler ───► └──────────────────────┘        │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Input fields are `Option<String>` so a missing column or an empty cell
//! never fails deserialization; requiredness is decided per record by the
//! code that consumes the row. Output field order is the column order of
//! the import files.

use serde::{Deserialize, Serialize};

use crate::money::Money;

/// `tipo_operacion` value marking a sale.
pub const SALE_OPERATION: &str = "VENTA";

// =============================================================================
// Input Rows
// =============================================================================

/// A row of the product export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductRecord {
    #[serde(default)]
    pub id: Option<String>,

    /// Unit sale price as decimal text.
    #[serde(default)]
    pub precio_venta: Option<String>,
}

/// A row of the invoice export. Only the identifier matters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InvoiceRecord {
    #[serde(default)]
    pub uuid: Option<String>,
}

/// A row of the stock operation export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StockOperation {
    /// Operation identifier, used in diagnostics only.
    #[serde(default)]
    pub uuid: Option<String>,

    #[serde(default)]
    pub tipo_operacion: Option<String>,

    #[serde(default)]
    pub factura_uuid: Option<String>,

    #[serde(default)]
    pub producto_id: Option<String>,

    /// Signed stock delta; negative for sales.
    #[serde(default)]
    pub cantidad_cambio: Option<String>,

    #[serde(default)]
    pub timestamp: Option<String>,

    #[serde(default)]
    pub vendedor_id: Option<String>,
}

impl StockOperation {
    /// Returns the invoice id when this row is a sale that names one.
    pub fn sale_invoice(&self) -> Option<&str> {
        if self.tipo_operacion.as_deref() != Some(SALE_OPERATION) {
            return None;
        }
        self.factura_uuid.as_deref().filter(|id| !id.is_empty())
    }

    /// Identifier for log messages.
    pub fn label(&self) -> &str {
        self.uuid.as_deref().unwrap_or("?")
    }
}

// =============================================================================
// Invoice Status / Payment Method
// =============================================================================

/// Status of a synthesized invoice. Recovered sales are always paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum InvoiceStatus {
    #[default]
    #[serde(rename = "Pagada")]
    Paid,
}

/// Payment method of a synthesized invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "Efectivo")]
    Cash,
}

// =============================================================================
// Synthesized Invoice
// =============================================================================

/// An invoice rebuilt from orphaned sale operations.
///
/// ## Invariant
/// `subtotal == total`: recovered invoices carry no tax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynthesizedInvoice {
    #[serde(rename = "uuid")]
    pub id: String,

    #[serde(rename = "numero_factura")]
    pub number: String,

    #[serde(rename = "fecha_emision")]
    pub issued_at: String,

    #[serde(rename = "vendedor_id")]
    pub seller_id: String,

    #[serde(rename = "cliente_id")]
    pub customer_id: String,

    pub subtotal: Money,

    #[serde(rename = "iva")]
    pub tax: Money,

    pub total: Money,

    #[serde(rename = "estado")]
    pub status: InvoiceStatus,

    #[serde(rename = "metodo_pago")]
    pub payment_method: PaymentMethod,

    pub created_at: String,

    /// Greatest timestamp among the invoice's lines (string order).
    pub updated_at: String,

    pub deleted_at: Option<String>,
}

impl SynthesizedInvoice {
    /// Adds a line total to both subtotal and total.
    ///
    /// Returns the new total, or `None` (invoice unchanged) on overflow.
    pub fn add_line_total(&mut self, amount: Money) -> Option<Money> {
        let total = self.total.checked_add(amount)?;
        self.subtotal = total;
        self.total = total;
        Some(total)
    }

    /// Replaces `updated_at` if `timestamp` sorts after it.
    ///
    /// Plain string comparison: only correct for fixed-width ISO-8601 text.
    pub fn touch(&mut self, timestamp: &str) {
        if timestamp > self.updated_at.as_str() {
            self.updated_at = timestamp.to_string();
        }
    }
}

// =============================================================================
// Synthesized Line
// =============================================================================

/// One invoice line per orphaned sale operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynthesizedLine {
    #[serde(rename = "uuid")]
    pub id: String,

    #[serde(rename = "factura_uuid")]
    pub invoice_id: String,

    #[serde(rename = "producto_id")]
    pub product_id: String,

    #[serde(rename = "cantidad")]
    pub quantity: i64,

    #[serde(rename = "precio_unitario")]
    pub unit_price: Money,

    #[serde(rename = "precio_total")]
    pub line_total: Money,

    pub created_at: String,

    pub updated_at: String,

    /// Numeric invoice key; left empty, the import links by `factura_uuid`.
    #[serde(rename = "factura_id")]
    pub invoice_numeric_id: Option<i64>,

    pub deleted_at: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================
