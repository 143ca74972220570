//! # CSV Sources
//!
//! Reads the three exports and feeds their rows to recovery-core.
//!
//! ## Source Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Reading an Export                                │
//! │                                                                         │
//! │  path exists? ── no ──► CsvError::NotFound (fatal)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  header row ── required column missing ──► MissingColumns (fatal)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  for each record (with its line number)                                 │
//! │       ├── I/O failure            ──► CsvError::Read (fatal)             │
//! │       ├── undecodable record     ──► warn, skip                         │
//! │       └── row ──► ProductIndex / InvoiceSet / Reconciler                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each loader has a path form (`load_*`) and a reader form (`read_*`).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use recovery_core::{InvoiceRecord, InvoiceSet, ProductIndex, ProductRecord, StockOperation};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{CsvError, CsvResult};

/// Columns the product export must have.
pub const PRODUCT_COLUMNS: &[&str] = &["id", "precio_venta"];

// =============================================================================
// Opening
// =============================================================================

/// Opens a CSV file, failing with `NotFound` when it does not exist.
fn open(path: &Path) -> CsvResult<csv::Reader<File>> {
    if !path.exists() {
        return Err(CsvError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|e| CsvError::io(path, e))?;
    Ok(reader_from(file))
}

/// Header-aware reader that tolerates ragged rows.
fn reader_from<R: Read>(rdr: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(rdr)
}

fn source_name(path: &Path) -> String {
    path.display().to_string()
}

// =============================================================================
// Row Streaming
// =============================================================================

/// Deserializes every record into `T` and hands it to `on_row` with its
/// 1-based line number. Returns the number of rows delivered.
fn for_each_row<R, T, F>(rdr: &mut csv::Reader<R>, source: &str, mut on_row: F) -> CsvResult<usize>
where
    R: Read,
    T: DeserializeOwned,
    F: FnMut(u64, T),
{
    let headers = rdr.headers().map_err(|e| CsvError::read(source, e))?.clone();
    let mut delivered = 0;

    for result in rdr.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(CsvError::read(source, e)),
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                warn!(source, row = line, "Unreadable record skipped: {}", e);
                continue;
            }
        };

        let line = record.position().map(|p| p.line()).unwrap_or(0);
        match record.deserialize::<T>(Some(&headers)) {
            Ok(row) => {
                on_row(line, row);
                delivered += 1;
            }
            Err(e) => warn!(source, row = line, "Undecodable record skipped: {}", e),
        }
    }

    Ok(delivered)
}

/// Fails with `MissingColumns` unless every `required` column is present.
fn require_columns<R: Read>(rdr: &mut csv::Reader<R>, source: &str, required: &[&str]) -> CsvResult<()> {
    let headers = rdr.headers().map_err(|e| CsvError::read(source, e))?;
    let missing: Vec<String> = required
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| column.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(CsvError::MissingColumns {
            source_name: source.to_string(),
            columns: missing,
        })
    }
}

// =============================================================================
// Products
// =============================================================================

/// Builds the product index from the product export.
///
/// ## Errors
/// - `NotFound` if the file is missing
/// - `MissingColumns` if `id` or `precio_venta` is not in the header
///
/// Rows with an unparseable price are logged and skipped.
pub fn load_products(path: &Path) -> CsvResult<ProductIndex> {
    let mut rdr = open(path)?;
    read_products_from(&mut rdr, &source_name(path))
}

/// Reader form of [`load_products`].
pub fn read_products<R: Read>(rdr: R, source: &str) -> CsvResult<ProductIndex> {
    read_products_from(&mut reader_from(rdr), source)
}

fn read_products_from<R: Read>(rdr: &mut csv::Reader<R>, source: &str) -> CsvResult<ProductIndex> {
    require_columns(rdr, source, PRODUCT_COLUMNS)?;

    let mut index = ProductIndex::new();
    let mut skipped = 0usize;

    for_each_row(rdr, source, |row, record: ProductRecord| {
        if let Err(e) = index.ingest(row, &record) {
            warn!(source, "Skipping product: {}", e);
            skipped += 1;
        }
    })?;

    info!(source, loaded = index.len(), skipped, "Products loaded");
    Ok(index)
}

// =============================================================================
// Existing Invoices
// =============================================================================

/// Builds the set of invoice ids already present in the database export.
///
/// Only a missing file is an error; rows without a `uuid` are ignored.
pub fn load_invoice_ids(path: &Path) -> CsvResult<InvoiceSet> {
    let mut rdr = open(path)?;
    read_invoice_ids_from(&mut rdr, &source_name(path))
}

/// Reader form of [`load_invoice_ids`].
pub fn read_invoice_ids<R: Read>(rdr: R, source: &str) -> CsvResult<InvoiceSet> {
    read_invoice_ids_from(&mut reader_from(rdr), source)
}

fn read_invoice_ids_from<R: Read>(rdr: &mut csv::Reader<R>, source: &str) -> CsvResult<InvoiceSet> {
    let mut set = InvoiceSet::new();
    let rows = for_each_row(rdr, source, |_, record: InvoiceRecord| {
        set.ingest(&record);
    })?;

    debug!(source, rows, "Invoice export scanned");
    info!(source, loaded = set.len(), "Existing invoices loaded");
    Ok(set)
}

// =============================================================================
// Stock Operations
// =============================================================================

/// Streams the stock operation export into `on_row` in file order.
///
/// Returns the number of rows streamed. Fails with `NotFound` before any
/// row is delivered when the file is missing.
pub fn load_operations<F>(path: &Path, on_row: F) -> CsvResult<usize>
where
    F: FnMut(u64, StockOperation),
{
    let mut rdr = open(path)?;
    for_each_row(&mut rdr, &source_name(path), on_row)
}

/// Reader form of [`load_operations`].
pub fn read_operations<R, F>(rdr: R, source: &str, on_row: F) -> CsvResult<usize>
where
    R: Read,
    F: FnMut(u64, StockOperation),
{
    for_each_row(&mut reader_from(rdr), source, on_row)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use recovery_core::Money;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn test_read_products() {
        let data = "\
id,nombre,precio_venta,uuid
P1,Cafe,10.0,u1
P2,Pan,abc,u2
P3,Leche,2.50,u3
,Sin id,1.00,u4
P4,Queso,-1,u5
";
        let index = read_products(data.as_bytes(), "productos").unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(index.price("P1"), Some(money("10.00")));
        assert_eq!(index.price("P3"), Some(money("2.50")));
        assert_eq!(index.price("P2"), None);
        assert_eq!(index.price("P4"), None);
    }

    #[test]
    fn test_products_missing_column_is_fatal() {
        let data = "id,precio\nP1,10\n";
        let err = read_products(data.as_bytes(), "productos").unwrap_err();

        match err {
            CsvError::MissingColumns { columns, .. } => assert_eq!(columns, vec!["precio_venta"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_products_ragged_rows() {
        let data = "id,precio_venta,extra\nP1,3\nP2\n";
        let index = read_products(data.as_bytes(), "productos").unwrap();

        assert_eq!(index.price("P1"), Some(money("3.00")));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_read_invoice_ids() {
        let data = "id,uuid,total\n1,F1,10\n2,,5\n3,F2,7\n4,F1,1\n";
        let set = read_invoice_ids(data.as_bytes(), "facturas").unwrap();

        assert_eq!(set.len(), 2);
        assert!(set.contains("F1"));
        assert!(set.contains("F2"));
    }

    #[test]
    fn test_invoices_without_uuid_column() {
        let data = "id,total\n1,10\n";
        let set = read_invoice_ids(data.as_bytes(), "facturas").unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_read_operations_with_line_numbers() {
        let data = "\
uuid,tipo_operacion,factura_uuid,producto_id,cantidad_cambio,timestamp
op1,VENTA,F1,P1,-3,2024-01-01
op2,COMPRA,,P1,10,
op3,VENTA,F2,P2,-1
";
        let mut rows = Vec::new();
        let count = read_operations(data.as_bytes(), "operaciones", |line, op| {
            rows.push((line, op))
        })
        .unwrap();

        assert_eq!(count, 3);
        assert_eq!(rows[0].0, 2);
        assert_eq!(rows[0].1.uuid.as_deref(), Some("op1"));
        assert_eq!(rows[0].1.cantidad_cambio.as_deref(), Some("-3"));
        assert_eq!(rows[1].1.factura_uuid, None);
        assert_eq!(rows[1].1.timestamp, None);
        assert_eq!(rows[2].0, 4);
        assert_eq!(rows[2].1.timestamp, None);
        assert_eq!(rows[2].1.vendedor_id, None);
    }

    #[test]
    fn test_missing_files_are_not_found() {
        let path = Path::new("/nonexistent/dir/productos_rows.csv");

        assert!(matches!(load_products(path), Err(CsvError::NotFound { .. })));
        assert!(matches!(load_invoice_ids(path), Err(CsvError::NotFound { .. })));

        let mut called = false;
        let result = load_operations(path, |_, _| called = true);
        assert!(matches!(result, Err(CsvError::NotFound { .. })));
        assert!(!called);
    }
}
