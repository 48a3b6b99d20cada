//! Column type inference for delimited sources.
//!
//! Every cell arrives as a string; a column's type is the narrowest one that
//! parses every non-empty cell, tried as integer, float, boolean, then
//! date/date-time. A column mixing types stays text, never an error.

use chrono::{NaiveDate, NaiveDateTime};

use crate::types::{DataType, Field, Schema, Table, Value};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Build a typed [`Table`] from header names and string rows.
pub fn table_from_strings(headers: Vec<String>, rows: Vec<Vec<String>>) -> Table {
    let types: Vec<DataType> = (0..headers.len())
        .map(|col| infer_column_type(&rows, col))
        .collect();

    let fields = headers
        .into_iter()
        .zip(types.iter())
        .map(|(name, ty)| Field::new(name, *ty))
        .collect();

    let typed_rows = rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(types.iter())
                .map(|(raw, ty)| parse_cell(&raw, *ty))
                .collect()
        })
        .collect();

    Table::new(Schema::new(fields), typed_rows)
}

/// Infer one column's type from all its non-empty cells.
///
/// A column with no non-empty cells stays text.
pub fn infer_column_type(rows: &[Vec<String>], col: usize) -> DataType {
    let mut any = false;
    let mut int_ok = true;
    let mut float_ok = true;
    let mut bool_ok = true;
    let mut datetime_ok = true;

    for row in rows {
        let cell = row.get(col).map(|s| s.trim()).unwrap_or("");
        if cell.is_empty() {
            continue;
        }
        any = true;
        int_ok = int_ok && parse_int(cell).is_some();
        float_ok = float_ok && parse_float(cell).is_some();
        bool_ok = bool_ok && parse_bool(cell).is_some();
        datetime_ok = datetime_ok && parse_datetime(cell).is_some();
        if !(int_ok || float_ok || bool_ok || datetime_ok) {
            return DataType::Utf8;
        }
    }

    if !any {
        return DataType::Utf8;
    }
    if int_ok {
        DataType::Int64
    } else if float_ok {
        DataType::Float64
    } else if bool_ok {
        DataType::Bool
    } else if datetime_ok {
        DataType::DateTime
    } else {
        DataType::Utf8
    }
}

/// Parse one raw cell according to an inferred column type.
///
/// Empty cells become [`Value::Null`]. A cell that does not parse as the
/// column type is kept as text rather than dropped.
pub fn parse_cell(raw: &str, ty: DataType) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }

    let parsed = match ty {
        DataType::Int64 => parse_int(trimmed).map(Value::Int64),
        DataType::Float64 => parse_float(trimmed).map(Value::Float64),
        DataType::Bool => parse_bool(trimmed).map(Value::Bool),
        DataType::DateTime => parse_datetime(trimmed).map(Value::DateTime),
        DataType::Utf8 => Some(Value::Utf8(trimmed.to_owned())),
    };

    parsed.unwrap_or_else(|| Value::Utf8(trimmed.to_owned()))
}

fn parse_int(s: &str) -> Option<i64> {
    s.parse::<i64>().ok()
}

fn parse_float(s: &str) -> Option<f64> {
    s.parse::<f64>().ok()
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" => Some(true),
        "false" | "f" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Parse a date or date-time using a fixed format list.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{infer_column_type, parse_cell, parse_datetime, table_from_strings};
    use crate::types::{DataType, Value};

    fn rows(cells: &[&[&str]]) -> Vec<Vec<String>> {
        cells
            .iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn infers_each_type_in_priority_order() {
        let data = rows(&[
            &["1", "2.5", "true", "2024-01-02", "abc"],
            &["2", "3", "no", "2024-02-03 10:30:00", "1x"],
        ]);
        assert_eq!(infer_column_type(&data, 0), DataType::Int64);
        assert_eq!(infer_column_type(&data, 1), DataType::Float64);
        assert_eq!(infer_column_type(&data, 2), DataType::Bool);
        assert_eq!(infer_column_type(&data, 3), DataType::DateTime);
        assert_eq!(infer_column_type(&data, 4), DataType::Utf8);
    }

    #[test]
    fn mixed_column_stays_text() {
        let data = rows(&[&["1"], &["oops"], &["3"]]);
        assert_eq!(infer_column_type(&data, 0), DataType::Utf8);
    }

    #[test]
    fn all_empty_column_stays_text() {
        let data = rows(&[&[""], &["  "]]);
        assert_eq!(infer_column_type(&data, 0), DataType::Utf8);
    }

    #[test]
    fn empty_cells_become_null_not_zero() {
        assert_eq!(parse_cell("", DataType::Int64), Value::Null);
        assert_eq!(parse_cell("  ", DataType::Utf8), Value::Null);
        assert_eq!(parse_cell("0", DataType::Int64), Value::Int64(0));
    }

    #[test]
    fn date_only_values_parse_at_midnight() {
        let dt = parse_datetime("2024-01-02").unwrap();
        assert_eq!(dt.format("%H:%M:%S").to_string(), "00:00:00");
    }

    #[test]
    fn table_from_strings_types_whole_columns() {
        let headers = vec!["id".to_string(), "label".to_string()];
        let data = rows(&[&["1", "a"], &["2", ""]]);
        let table = table_from_strings(headers, data);

        assert_eq!(table.schema.fields[0].data_type, DataType::Int64);
        assert_eq!(table.schema.fields[1].data_type, DataType::Utf8);
        assert_eq!(table.rows[0], vec![Value::Int64(1), Value::Utf8("a".into())]);
        assert_eq!(table.rows[1], vec![Value::Int64(2), Value::Null]);
    }
}
