//! End-to-end runs over real files in a scratch directory.

use std::fs;
use std::path::{Path, PathBuf};

use recovery_cli::{recover, AppError, RecoveryConfig};
use recovery_csv::{CsvError, WriteStatus};

const PRODUCTS: &str = "\
id,nombre,precio_venta,uuid
P1,Cafe,10.0,u-1
P2,Pan,2.5,u-2
P3,Roto,n/a,u-3
";

const INVOICES: &str = "\
id,uuid,total
1,F-OLD,12.00
";

const OPERATIONS: &str = "\
uuid,tipo_operacion,factura_uuid,producto_id,cantidad_cambio,timestamp,vendedor_id
op-1,VENTA,F1,P1,-3,2024-01-01 10:00:00,5
op-2,COMPRA,,P1,20,2024-01-01 09:00:00,
op-3,VENTA,F-OLD,P1,-1,2024-01-01 11:00:00,5
op-4,VENTA,F2,P404,-1,2024-01-01 12:00:00,
op-5,VENTA,F1,P2,-2,2024-01-02 08:00:00,5
op-6,VENTA,F3,P2,-4,2024-01-03 08:00:00,
op-7,VENTA,F4,P1,abc,2024-01-03 09:00:00,
";

fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("recover-e2e-{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_inputs(dir: &Path, operations: Option<&str>) {
    fs::write(dir.join("productos_rows.csv"), PRODUCTS).unwrap();
    fs::write(dir.join("facturas_rows.csv"), INVOICES).unwrap();
    if let Some(operations) = operations {
        fs::write(dir.join("operacion_stocks_rows.csv"), operations).unwrap();
    }
}

fn config_for(dir: &Path) -> RecoveryConfig {
    RecoveryConfig {
        base_dir: Some(dir.to_path_buf()),
        ..Default::default()
    }
}

#[test]
fn test_full_recovery_run() {
    let dir = scratch_dir();
    write_inputs(&dir, Some(OPERATIONS));

    let report = recover(&config_for(&dir)).unwrap();

    assert_eq!(report.products, 2);
    assert_eq!(report.existing_invoices, 1);
    assert_eq!(report.stats.rows_read, 7);
    assert_eq!(report.stats.ignored, 1);
    assert_eq!(report.stats.already_invoiced, 1);
    assert_eq!(report.stats.unknown_product, 1);
    assert_eq!(report.stats.invalid, 1);
    assert_eq!(report.stats.invoices, 2);
    assert_eq!(report.stats.lines, 3);
    assert_eq!(report.invoices_file, Some(WriteStatus::Written(2)));
    assert_eq!(report.lines_file, Some(WriteStatus::Written(3)));

    let invoices = fs::read_to_string(dir.join("facturas_a_importar.csv")).unwrap();
    let rows: Vec<&str> = invoices.lines().collect();
    assert_eq!(
        rows,
        [
            "uuid,numero_factura,fecha_emision,vendedor_id,cliente_id,subtotal,iva,total,estado,metodo_pago,created_at,updated_at,deleted_at",
            "F1,RECUPERADA-F1,2024-01-01 10:00:00,5,1,35.00,0.00,35.00,Pagada,Efectivo,2024-01-01 10:00:00,2024-01-02 08:00:00,",
            "F3,RECUPERADA-F3,2024-01-03 08:00:00,1,1,10.00,0.00,10.00,Pagada,Efectivo,2024-01-03 08:00:00,2024-01-03 08:00:00,",
        ]
    );

    let lines = fs::read_to_string(dir.join("detalle_facturas_a_importar.csv")).unwrap();
    let rows: Vec<Vec<&str>> = lines.lines().map(|l| l.split(',').collect()).collect();
    assert_eq!(
        rows[0],
        [
            "uuid",
            "factura_uuid",
            "producto_id",
            "cantidad",
            "precio_unitario",
            "precio_total",
            "created_at",
            "updated_at",
            "factura_id",
            "deleted_at"
        ]
    );
    assert_eq!(rows.len(), 4);
    assert_eq!(&rows[1][1..6], ["F1", "P1", "3", "10.00", "30.00"]);
    assert_eq!(&rows[2][1..6], ["F1", "P2", "2", "2.50", "5.00"]);
    assert_eq!(&rows[3][1..6], ["F3", "P2", "4", "2.50", "10.00"]);
    assert!(uuid::Uuid::parse_str(rows[1][0]).is_ok());
    assert_eq!(rows[1][8], "");

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_nothing_to_recover_writes_no_files() {
    let dir = scratch_dir();
    write_inputs(
        &dir,
        Some("uuid,tipo_operacion,factura_uuid,producto_id,cantidad_cambio\nop-1,VENTA,F-OLD,P1,-1\n"),
    );

    let report = recover(&config_for(&dir)).unwrap();

    assert_eq!(report.stats.already_invoiced, 1);
    assert_eq!(report.invoices_file, Some(WriteStatus::Empty));
    assert_eq!(report.lines_file, Some(WriteStatus::Empty));
    assert!(!dir.join("facturas_a_importar.csv").exists());
    assert!(!dir.join("detalle_facturas_a_importar.csv").exists());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_missing_operations_is_fatal() {
    let dir = scratch_dir();
    write_inputs(&dir, None);

    let err = recover(&config_for(&dir)).unwrap_err();

    assert!(matches!(err, AppError::Csv(CsvError::NotFound { .. })));
    assert!(!dir.join("facturas_a_importar.csv").exists());
    assert!(!dir.join("detalle_facturas_a_importar.csv").exists());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_products_without_price_column_is_fatal() {
    let dir = scratch_dir();
    write_inputs(&dir, Some(OPERATIONS));
    fs::write(dir.join("productos_rows.csv"), "id,precio\nP1,10\n").unwrap();

    let err = recover(&config_for(&dir)).unwrap_err();

    assert!(matches!(err, AppError::Csv(CsvError::MissingColumns { .. })));
    assert!(!dir.join("facturas_a_importar.csv").exists());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_failed_write_does_not_stop_the_other() {
    let dir = scratch_dir();
    write_inputs(&dir, Some(OPERATIONS));

    let mut config = config_for(&dir);
    config.output.invoices = PathBuf::from("missing-subdir/facturas_a_importar.csv");

    let report = recover(&config).unwrap();

    assert_eq!(report.invoices_file, None);
    assert!(report.write_failed());
    assert_eq!(report.lines_file, Some(WriteStatus::Written(3)));
    assert!(dir.join("detalle_facturas_a_importar.csv").exists());

    fs::remove_dir_all(&dir).unwrap();
}
