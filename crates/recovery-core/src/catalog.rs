//! # Lookup Indexes
//!
//! In-memory indexes built from the two leaf exports before reconciliation.
//!
//! - [`ProductIndex`] - product id → unit sale price
//! - [`InvoiceSet`] - membership set of invoice ids already in the database

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::{RecordError, RecordResult};
use crate::money::Money;
use crate::types::{InvoiceRecord, ProductRecord};
use crate::validation::{parse_price, require};

// =============================================================================
// Product Index
// =============================================================================

/// Unit sale prices keyed by product id.
#[derive(Debug, Clone, Default)]
pub struct ProductIndex {
    prices: HashMap<String, Money>,
}

impl ProductIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses one product row and indexes it.
    ///
    /// ## Behavior
    /// - Empty `id` or a bad `precio_venta`: `Err`, index unchanged
    /// - Duplicate id: the later row replaces the earlier price
    pub fn ingest(&mut self, row: u64, record: &ProductRecord) -> RecordResult<()> {
        let id = require("id", &record.id).map_err(|e| RecordError::invalid(row, e))?;
        let raw_price =
            require("precio_venta", &record.precio_venta).map_err(|e| RecordError::invalid(row, e))?;
        let price = parse_price("precio_venta", raw_price).map_err(|e| RecordError::invalid(row, e))?;

        if let Some(previous) = self.insert(id, price) {
            debug!(row, product_id = id, %previous, %price, "Duplicate product id, keeping later price");
        }
        Ok(())
    }

    /// Inserts a price, returning the one it replaced.
    pub fn insert(&mut self, id: impl Into<String>, price: Money) -> Option<Money> {
        self.prices.insert(id.into(), price)
    }

    /// Looks up a product's unit price.
    pub fn price(&self, id: &str) -> Option<Money> {
        self.prices.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Money)> for ProductIndex {
    fn from_iter<I: IntoIterator<Item = (S, Money)>>(iter: I) -> Self {
        let mut index = ProductIndex::new();
        for (id, price) in iter {
            index.insert(id, price);
        }
        index
    }
}

// =============================================================================
// Invoice Set
// =============================================================================

/// Identifiers of invoices that already exist.
#[derive(Debug, Clone, Default)]
pub struct InvoiceSet {
    ids: HashSet<String>,
}

impl InvoiceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a row's `uuid`. Rows without one are ignored.
    ///
    /// Returns `true` when a new id was added.
    pub fn ingest(&mut self, record: &InvoiceRecord) -> bool {
        match record.uuid.as_deref() {
            Some(id) if !id.is_empty() => self.ids.insert(id.to_string()),
            _ => false,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for InvoiceSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        InvoiceSet {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    fn product(id: &str, price: &str) -> ProductRecord {
        ProductRecord {
            id: Some(id.to_string()),
            precio_venta: Some(price.to_string()),
        }
    }

    #[test]
    fn test_ingest_valid_products() {
        let mut index = ProductIndex::new();
        index.ingest(2, &product("P1", "10.0")).unwrap();
        index.ingest(3, &product("P2", "0")).unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(index.price("P1"), Some(money("10.00")));
        assert_eq!(index.price("P2"), Some(Money::zero()));
        assert_eq!(index.price("P3"), None);
    }

    #[test]
    fn test_ingest_rejects_bad_rows() {
        let mut index = ProductIndex::new();

        let err = index.ingest(4, &product("P1", "gratis")).unwrap_err();
        assert_eq!(err.row(), 4);
        assert!(matches!(
            err,
            RecordError::Invalid {
                source: ValidationError::InvalidFormat { .. },
                ..
            }
        ));

        assert!(index.ingest(5, &product("P2", "-3")).is_err());
        assert!(index.ingest(6, &product("", "3")).is_err());
        assert!(index
            .ingest(7, &ProductRecord { id: Some("P4".into()), precio_venta: None })
            .is_err());

        assert!(index.is_empty());
    }

    #[test]
    fn test_duplicate_product_keeps_later_price() {
        let mut index = ProductIndex::new();
        index.ingest(2, &product("P1", "1")).unwrap();
        index.ingest(3, &product("P1", "2")).unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.price("P1"), Some(money("2.00")));
    }

    #[test]
    fn test_invoice_set_ingest() {
        let mut set = InvoiceSet::new();
        assert!(set.ingest(&InvoiceRecord { uuid: Some("F1".into()) }));
        assert!(!set.ingest(&InvoiceRecord { uuid: Some("F1".into()) }));
        assert!(!set.ingest(&InvoiceRecord { uuid: Some(String::new()) }));
        assert!(!set.ingest(&InvoiceRecord { uuid: None }));

        assert_eq!(set.len(), 1);
        assert!(set.contains("F1"));
        assert!(!set.contains("F2"));
    }

    #[test]
    fn test_from_iterator() {
        let set: InvoiceSet = ["A", "B"].into_iter().collect();
        assert_eq!(set.len(), 2);

        let index: ProductIndex = [("P1", money("0.05"))].into_iter().collect();
        assert_eq!(index.price("P1"), Some(money("0.05")));
    }
}
