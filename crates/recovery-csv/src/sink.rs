//! # CSV Sinks
//!
//! Writes synthesized records to the import files.
//!
//! The header row is the column list passed by the caller
//! ([`INVOICE_COLUMNS`], [`LINE_COLUMNS`]). Values follow the field order of
//! the record type, so each list must match its type. An empty batch creates
//! no file.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use recovery_core::{SynthesizedInvoice, SynthesizedLine};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{CsvError, CsvResult};

/// Column order of the invoice import file.
pub const INVOICE_COLUMNS: &[&str] = &[
    "uuid",
    "numero_factura",
    "fecha_emision",
    "vendedor_id",
    "cliente_id",
    "subtotal",
    "iva",
    "total",
    "estado",
    "metodo_pago",
    "created_at",
    "updated_at",
    "deleted_at",
];

/// Column order of the invoice line import file.
pub const LINE_COLUMNS: &[&str] = &[
    "uuid",
    "factura_uuid",
    "producto_id",
    "cantidad",
    "precio_unitario",
    "precio_total",
    "created_at",
    "updated_at",
    "factura_id",
    "deleted_at",
];

/// What a write call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    /// Nothing to write; no file was created.
    Empty,
    /// The file was written with this many data rows.
    Written(usize),
}

/// Writes `columns` as the header row, then the records, to `path`.
/// Any existing file is replaced.
pub fn write_records<T: Serialize>(
    path: &Path,
    columns: &[&str],
    records: &[T],
) -> CsvResult<WriteStatus> {
    if records.is_empty() {
        info!(path = %path.display(), "No data to write");
        return Ok(WriteStatus::Empty);
    }

    let file = File::create(path).map_err(|e| CsvError::io(path, e))?;
    let written = write_records_to(file, columns, records).map_err(|e| match e {
        CsvError::Write { source, .. } => CsvError::Write {
            path: path.to_path_buf(),
            source,
        },
        CsvError::Io { source, .. } => CsvError::io(path, source),
        other => other,
    })?;

    debug!(path = %path.display(), rows = written, "File written");
    Ok(WriteStatus::Written(written))
}

/// Writes `columns` as the header row, then the records, to any writer.
///
/// The header is only emitted when there is at least one record.
pub fn write_records_to<W: Write, T: Serialize>(
    writer: W,
    columns: &[&str],
    records: &[T],
) -> CsvResult<usize> {
    if records.is_empty() {
        return Ok(0);
    }

    let write_error = |source| CsvError::Write {
        path: "<writer>".into(),
        source,
    };

    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(columns).map_err(write_error)?;

    for record in records {
        wtr.serialize(record).map_err(write_error)?;
    }

    wtr.flush()
        .map_err(|e| CsvError::io(Path::new("<writer>"), e))?;
    Ok(records.len())
}

/// Writes the synthesized invoices.
pub fn write_invoices(path: &Path, invoices: &[SynthesizedInvoice]) -> CsvResult<WriteStatus> {
    write_records(path, INVOICE_COLUMNS, invoices)
}

/// Writes the synthesized invoice lines.
pub fn write_lines(path: &Path, lines: &[SynthesizedLine]) -> CsvResult<WriteStatus> {
    write_records(path, LINE_COLUMNS, lines)
}

// =============================================================================
// Unit Tests
// =============================================================================
