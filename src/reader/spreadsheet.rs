//! Workbook reading via calamine.
//!
//! Every named sheet in a workbook is read independently and becomes its own
//! [`RawTable`] tagged with the sheet name. The first non-empty row of a sheet
//! is its header row; column types are inferred from the cell kinds below it.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::FailureReason;
use crate::types::{DataType, Field, RawTable, Schema, Table, Value};

use super::infer::parse_datetime;

/// Read all sheets of a workbook, one [`RawTable`] per sheet.
///
/// Sheets that parse to zero rows or columns are returned as empty tables; the
/// merge driver decides whether the whole file counts as skipped.
pub fn read_workbook(path: &Path) -> Result<Vec<RawTable>, FailureReason> {
    let mut workbook = open_workbook_auto(path).map_err(classify_open)?;

    let sheet_names = workbook.sheet_names().to_vec();
    let mut tables = Vec::with_capacity(sheet_names.len());
    for sheet in sheet_names {
        let range = workbook
            .worksheet_range(&sheet)
            .map_err(|e| FailureReason::CorruptFile(e.to_string()))?;
        tables.push(sheet_table(sheet, &range));
    }
    Ok(tables)
}

fn classify_open(e: calamine::Error) -> FailureReason {
    match e {
        calamine::Error::Io(io) if io.kind() == std::io::ErrorKind::PermissionDenied => {
            FailureReason::PermissionDenied
        }
        other => FailureReason::CorruptFile(other.to_string()),
    }
}

fn sheet_table(sheet: String, range: &calamine::Range<Data>) -> RawTable {
    let Some((header_idx, headers)) = header_projection(range) else {
        // No non-empty row at all; an empty table the driver classifies.
        return RawTable {
            sheet: Some(sheet),
            data: Table::default(),
        };
    };

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for (idx, row) in range.rows().enumerate() {
        if idx <= header_idx {
            continue;
        }
        let values = (0..headers.len())
            .map(|col| convert_cell(row.get(col).unwrap_or(&Data::Empty)))
            .collect();
        rows.push(values);
    }

    let fields = headers
        .into_iter()
        .enumerate()
        .map(|(col, name)| Field::new(name, column_type(&rows, col)))
        .collect();
    let schema = Schema::new(fields);

    let mut data = Table::new(schema, rows);
    coerce_columns(&mut data);
    RawTable {
        sheet: Some(sheet),
        data,
    }
}

/// Locate the first non-empty row and stringify it as the header row.
fn header_projection(range: &calamine::Range<Data>) -> Option<(usize, Vec<String>)> {
    for (idx, row) in range.rows().enumerate() {
        if row.iter().any(|c| !matches!(c, Data::Empty)) {
            let headers = row.iter().map(cell_to_header_string).collect();
            return Some((idx, headers));
        }
    }
    None
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 => (*f as i64).to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn convert_cell(c: &Data) -> Value {
    match c {
        Data::Empty => Value::Null,
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Value::Null
            } else {
                Value::Utf8(trimmed.to_string())
            }
        }
        Data::Int(i) => Value::Int64(*i),
        Data::Float(f) => Value::Float64(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(Value::DateTime)
            .unwrap_or_else(|| Value::Utf8(dt.to_string())),
        Data::DateTimeIso(s) => parse_datetime(s)
            .map(Value::DateTime)
            .unwrap_or_else(|| Value::Utf8(s.clone())),
        Data::DurationIso(s) => Value::Utf8(s.clone()),
        // Formula errors behave like blanks, matching how empty cells merge.
        Data::Error(_) => Value::Null,
    }
}

/// Unify the value kinds seen in one column.
///
/// Integer and float cells unify to float; any other mixture widens to text.
fn column_type(rows: &[Vec<Value>], col: usize) -> DataType {
    let mut unified: Option<DataType> = None;
    for row in rows {
        let Some(kind) = row.get(col).and_then(value_kind) else {
            continue;
        };
        unified = Some(match unified {
            None => kind,
            Some(current) if current == kind => current,
            Some(DataType::Int64) if kind == DataType::Float64 => DataType::Float64,
            Some(DataType::Float64) if kind == DataType::Int64 => DataType::Float64,
            Some(_) => return DataType::Utf8,
        });
    }
    unified.unwrap_or(DataType::Utf8)
}

fn value_kind(v: &Value) -> Option<DataType> {
    match v {
        Value::Absent | Value::Null => None,
        Value::Int64(_) => Some(DataType::Int64),
        Value::Float64(_) => Some(DataType::Float64),
        Value::Bool(_) => Some(DataType::Bool),
        Value::DateTime(_) => Some(DataType::DateTime),
        Value::Utf8(_) => Some(DataType::Utf8),
    }
}

/// Rewrite cells so every value matches its column's unified type.
fn coerce_columns(table: &mut Table) {
    let types: Vec<DataType> = table.schema.fields.iter().map(|f| f.data_type).collect();
    for row in &mut table.rows {
        for (cell, ty) in row.iter_mut().zip(types.iter()) {
            coerce_cell(cell, *ty);
        }
    }
}

fn coerce_cell(cell: &mut Value, ty: DataType) {
    if cell.is_missing() {
        return;
    }
    match (ty, &*cell) {
        (DataType::Float64, Value::Int64(i)) => *cell = Value::Float64(*i as f64),
        (DataType::Utf8, v) if !matches!(v, Value::Utf8(_)) => *cell = Value::Utf8(v.render()),
        _ => {}
    }
}
