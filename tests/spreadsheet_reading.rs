use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use rust_xlsxwriter::Workbook;

use tabular_merge::locator::{SourceFile, SourceFormat};
use tabular_merge::reader::spreadsheet::read_workbook;
use tabular_merge::reader::{read_source, ReadOptions};
use tabular_merge::types::{DataType, Value};
use tabular_merge::FailureReason;

fn tmp_file(ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("tabular-merge-spreadsheet-{nanos}.{ext}"))
}

fn two_sheet_workbook(path: &PathBuf) {
    let mut wb = Workbook::new();

    let ws = wb.add_worksheet();
    ws.set_name("Stocks").unwrap();
    ws.write_string(0, 0, "ticker").unwrap();
    ws.write_string(0, 1, "price").unwrap();
    ws.write_string(0, 2, "listed").unwrap();
    ws.write_string(1, 0, "ACME").unwrap();
    ws.write_number(1, 1, 98.5).unwrap();
    ws.write_boolean(1, 2, true).unwrap();

    let ws = wb.add_worksheet();
    ws.set_name("Bonds").unwrap();
    ws.write_string(0, 0, "ticker").unwrap();
    ws.write_string(0, 1, "yield").unwrap();
    ws.write_string(1, 0, "GOVT").unwrap();
    ws.write_number(1, 1, 3.25).unwrap();

    wb.save(path).unwrap();
}

#[test]
fn every_sheet_becomes_its_own_raw_table() {
    let path = tmp_file("xlsx");
    two_sheet_workbook(&path);

    let tables = read_workbook(&path).unwrap();
    assert_eq!(tables.len(), 2);
    assert_eq!(tables[0].sheet.as_deref(), Some("Stocks"));
    assert_eq!(tables[1].sheet.as_deref(), Some("Bonds"));

    let stocks = &tables[0].data;
    assert_eq!(stocks.schema.fields[0].data_type, DataType::Utf8);
    assert_eq!(stocks.schema.fields[1].data_type, DataType::Float64);
    assert_eq!(stocks.schema.fields[2].data_type, DataType::Bool);
    assert_eq!(stocks.rows[0][0], Value::Utf8("ACME".to_string()));
    assert_eq!(stocks.rows[0][2], Value::Bool(true));

    let _ = fs::remove_file(&path);
}

#[test]
fn corrupt_workbook_is_classified_not_raised() {
    let path = tmp_file("xlsx");
    fs::write(&path, "definitely not a zip archive").unwrap();

    let err = read_workbook(&path).unwrap_err();
    assert!(matches!(err, FailureReason::CorruptFile(_)));

    let _ = fs::remove_file(&path);
}

#[test]
fn blank_leading_rows_do_not_hide_the_header() {
    let path = tmp_file("xlsx");
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    // Header starts at the third spreadsheet row.
    ws.write_string(2, 0, "id").unwrap();
    ws.write_number(3, 0, 1.0).unwrap();
    wb.save(&path).unwrap();

    let tables = read_workbook(&path).unwrap();
    assert_eq!(tables[0].data.schema.fields[0].name, "id");
    assert_eq!(tables[0].data.row_count(), 1);

    let _ = fs::remove_file(&path);
}

#[test]
fn unsupported_source_format_is_a_classified_failure() {
    let source = SourceFile {
        path: PathBuf::from("mystery.dat"),
        format: None,
        size: 0,
    };
    let err = read_source(&source, &ReadOptions::default()).unwrap_err();
    assert_eq!(err, FailureReason::UnsupportedFormat);
}

#[test]
fn read_source_dispatches_on_the_format_tag() {
    let path = tmp_file("xlsx");
    two_sheet_workbook(&path);

    let source = SourceFile {
        path: path.clone(),
        format: Some(SourceFormat::Spreadsheet),
        size: fs::metadata(&path).map(|m| m.len()).unwrap_or(0),
    };
    let tables = read_source(&source, &ReadOptions::default()).unwrap();
    assert_eq!(tables.len(), 2);

    let _ = fs::remove_file(&path);
}
