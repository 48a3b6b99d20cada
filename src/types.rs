//! Core data model types for consolidation.
//!
//! Files are read into in-memory [`RawTable`]s whose columns carry inferred
//! [`DataType`]s. Schema reconciliation aligns every raw table onto one growing
//! global [`Schema`]; cells for columns a source never had are filled with
//! [`Value::Absent`], which is distinct from a genuinely empty cell
//! ([`Value::Null`]).

use chrono::NaiveDateTime;
use serde::Serialize;

/// Inferred logical type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// Calendar date or date-time.
    DateTime,
    /// UTF-8 string. Also the widened type for columns that mix types.
    Utf8,
}

/// A single named, typed column in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Column name.
    pub name: String,
    /// Inferred column type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// An ordered list of columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A single typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The column did not exist in the originating source at all.
    ///
    /// Not the same as [`Value::Null`]: a source that *has* the column but left
    /// the cell blank produces `Null`, never `Absent`.
    Absent,
    /// Empty cell in a source that has the column.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// Date or date-time.
    DateTime(NaiveDateTime),
    /// UTF-8 string.
    Utf8(String),
}

impl Value {
    /// True for the absent-value marker.
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// True for absent markers and empty cells alike.
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Absent | Value::Null)
    }

    /// Render the value for delimited/workbook serialization.
    ///
    /// Absent markers and empty cells both render as the empty string; the
    /// distinction only exists in memory.
    pub fn render(&self) -> String {
        match self {
            Value::Absent | Value::Null => String::new(),
            Value::Int64(i) => i.to_string(),
            Value::Float64(f) => f.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            Value::Utf8(s) => s.clone(),
        }
    }
}

/// In-memory tabular data.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`]
/// fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create a table from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.schema.len()
    }
}

/// One table as read from a single file or workbook sheet, before
/// reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Sheet name for workbook sources, `None` for delimited files.
    pub sheet: Option<String>,
    /// The parsed data.
    pub data: Table,
}

impl RawTable {
    /// True if the parse produced zero rows or zero columns.
    ///
    /// Empty raw tables are skipped by the merge driver, which is a different
    /// outcome than a read failure.
    pub fn is_empty(&self) -> bool {
        self.data.rows.is_empty() || self.data.schema.is_empty()
    }
}
