//! Schema reconciliation.
//!
//! The [`Reconciler`] folds raw tables one at a time into a growing global
//! column set (union, first-seen order) and aligns each table's rows onto it.
//! Column identity is exact-name; callers needing fuzzy matching must
//! pre-normalize names. Type conflicts widen the column (integer/float
//! conflicts to float, everything else to text) and are recorded as
//! informational [`WidenNote`]s, never as errors.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::types::{DataType, RawTable, Schema, Table, Value};

/// Informational record of a column whose type was widened during
/// reconciliation. Widening is lossy only in type strictness, not in data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidenNote {
    /// Column that was widened.
    pub column: String,
    /// Type the column had before this table arrived.
    pub from: DataType,
    /// Type the column holds for the rest of the pass.
    pub to: DataType,
    /// File whose table triggered the widening.
    pub path: PathBuf,
}

/// Incremental schema reconciler.
///
/// Memory scales with the global column set, not with the tables already
/// folded: each [`Reconciler::align`] call consumes one raw table and returns
/// its aligned rows for the caller to accumulate.
#[derive(Debug, Default)]
pub struct Reconciler {
    schema: Schema,
    notes: Vec<WidenNote>,
}

impl Reconciler {
    /// Create an empty reconciler.
    pub fn new() -> Self {
        Self::default()
    }

    /// The global column set so far. Grows monotonically; never shrinks.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Widen notes accumulated so far, in occurrence order.
    pub fn notes(&self) -> &[WidenNote] {
        &self.notes
    }

    /// Fold one raw table into the global column set and align its rows.
    ///
    /// Columns the table lacks are filled with [`Value::Absent`] for all its
    /// rows. The returned table's schema is a snapshot of the global set at
    /// this point; callers appending rows must pad earlier rows as the set
    /// grows.
    pub fn align(&mut self, raw: &RawTable, origin: &Path) -> Table {
        for field in &raw.data.schema.fields {
            match self.schema.index_of(&field.name) {
                None => self.schema.fields.push(field.clone()),
                Some(idx) => {
                    let current = self.schema.fields[idx].data_type;
                    if let Some(widened) = widen(current, field.data_type) {
                        self.notes.push(WidenNote {
                            column: field.name.clone(),
                            from: current,
                            to: widened,
                            path: origin.to_path_buf(),
                        });
                        self.schema.fields[idx].data_type = widened;
                    }
                }
            }
        }

        let projection: Vec<Option<usize>> = self
            .schema
            .fields
            .iter()
            .map(|f| raw.data.schema.index_of(&f.name))
            .collect();

        let rows = raw
            .data
            .rows
            .iter()
            .map(|row| {
                projection
                    .iter()
                    .map(|src| match src {
                        Some(i) => row.get(*i).cloned().unwrap_or(Value::Null),
                        None => Value::Absent,
                    })
                    .collect()
            })
            .collect();

        Table::new(self.schema.clone(), rows)
    }
}

/// The widened type for a conflicting pair, or `None` when no change is
/// needed. Associative and commutative, so the final column types do not
/// depend on discovery order.
fn widen(current: DataType, incoming: DataType) -> Option<DataType> {
    if current == incoming || current == DataType::Utf8 {
        return None;
    }
    match (current, incoming) {
        (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
            Some(DataType::Float64)
        }
        _ => Some(DataType::Utf8),
    }
}
