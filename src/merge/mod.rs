//! The merge driver.
//!
//! [`merge_tree`] runs the whole pipeline: walk the roots in deterministic
//! order, read each file independently, fold every readable table through the
//! schema reconciler, and concatenate aligned rows into one
//! [`ConsolidatedDataset`] with provenance columns. Per-file failures become
//! outcome records; the run itself cannot fail.

pub mod observability;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::FailureReason;
use crate::locator::{walk_sources, SourceFile, WalkEvent, DEFAULT_EXTENSIONS};
use crate::provenance::{
    disambiguate, sheet_label, SOURCE_NAME_COLUMN, SOURCE_PATH_COLUMN, SOURCE_SHEET_COLUMN,
};
use crate::reader::{read_source, ReadOptions};
use crate::reconcile::Reconciler;
use crate::report::{OutcomeRecord, OutcomeStatus, RunSummary};
use crate::types::{DataType, Field, Schema, Value};

use observability::MergeObserver;

/// How rows from distinct logical tables appear in the consolidated output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SheetMode {
    /// One flat table; sheet identity is not retained per row.
    #[default]
    Flat,
    /// Rows keep their originating sheet label in an extra grouping column,
    /// and workbook output writes one worksheet per label.
    KeepSheets,
}

/// Options controlling a merge run.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct MergeOptions {
    /// Recognized file extensions (matched case-insensitively).
    pub extensions: Vec<String>,
    /// Per-file read behavior (encoding cascade).
    pub read: ReadOptions,
    /// Flat vs sheet-preserving output.
    pub sheet_mode: SheetMode,
    /// Optional observer for per-file and end-of-run events.
    pub observer: Option<Arc<dyn MergeObserver>>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            read: ReadOptions::default(),
            sheet_mode: SheetMode::default(),
            observer: None,
        }
    }
}

impl fmt::Debug for MergeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeOptions")
            .field("extensions", &self.extensions)
            .field("read", &self.read)
            .field("sheet_mode", &self.sheet_mode)
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

/// One contiguous run of consolidated rows from a single source table.
#[derive(Debug, Clone)]
struct Span {
    rows: usize,
    name: String,
    path: String,
    sheet: String,
}

/// The consolidated output: all merged rows over the global column set, with
/// provenance columns appended last.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidatedDataset {
    /// Global column set including provenance columns.
    pub schema: Schema,
    /// Rows in discovery order.
    pub rows: Vec<Vec<Value>>,
    name_column: usize,
    path_column: usize,
    sheet_column: Option<usize>,
}

impl ConsolidatedDataset {
    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns, provenance included.
    pub fn column_count(&self) -> usize {
        self.schema.len()
    }

    /// Index of the source-file-name column.
    pub fn name_column(&self) -> usize {
        self.name_column
    }

    /// Index of the source-file-path column.
    pub fn path_column(&self) -> usize {
        self.path_column
    }

    /// Index of the sheet-label column, present in sheet-preserving mode.
    pub fn sheet_column(&self) -> Option<usize> {
        self.sheet_column
    }

    /// The (source name, source path) pair for one row.
    pub fn provenance(&self, row: usize) -> Option<(&str, &str)> {
        let row = self.rows.get(row)?;
        match (&row[self.name_column], &row[self.path_column]) {
            (Value::Utf8(name), Value::Utf8(path)) => Some((name, path)),
            _ => None,
        }
    }

    /// Distinct sheet labels in first-seen order (sheet-preserving mode).
    pub fn sheet_labels(&self) -> Vec<&str> {
        let Some(col) = self.sheet_column else {
            return Vec::new();
        };
        let mut labels: Vec<&str> = Vec::new();
        for row in &self.rows {
            if let Value::Utf8(label) = &row[col] {
                if !labels.contains(&label.as_str()) {
                    labels.push(label);
                }
            }
        }
        labels
    }

    /// Rows belonging to one sheet label (sheet-preserving mode).
    pub fn sheet_rows(&self, label: &str) -> Vec<&[Value]> {
        let Some(col) = self.sheet_column else {
            return Vec::new();
        };
        self.rows
            .iter()
            .filter(|row| matches!(&row[col], Value::Utf8(l) if l == label))
            .map(|row| row.as_slice())
            .collect()
    }
}

/// Result of a merge run: the dataset plus the full accounting.
#[derive(Debug)]
pub struct MergeOutput {
    /// The consolidated dataset (possibly empty, always well-formed).
    pub dataset: ConsolidatedDataset,
    /// Per-file outcomes and run-level warnings.
    pub summary: RunSummary,
}

/// Merge every recognized file under `roots` into one consolidated dataset.
///
/// Files are processed sequentially in discovery order with one file handle
/// open at a time. A file that fails to read contributes zero rows and one
/// failed outcome record; the run always completes.
///
/// # Examples
///
/// ```no_run
/// use tabular_merge::{merge_tree, MergeOptions};
///
/// let out = merge_tree(&["./data", "./archive"], &MergeOptions::default());
/// println!("{}", out.summary);
/// println!("rows={}", out.dataset.row_count());
/// ```
pub fn merge_tree(roots: &[impl AsRef<Path>], options: &MergeOptions) -> MergeOutput {
    let roots: Vec<PathBuf> = roots.iter().map(|r| r.as_ref().to_path_buf()).collect();

    let mut reconciler = Reconciler::new();
    let mut rows: Vec<Vec<Value>> = Vec::new();
    let mut spans: Vec<Span> = Vec::new();
    let mut outcomes: Vec<OutcomeRecord> = Vec::new();
    let mut missing_roots: Vec<PathBuf> = Vec::new();
    let mut walk_warnings: Vec<String> = Vec::new();

    for event in walk_sources(&roots, &options.extensions) {
        match event {
            WalkEvent::MissingRoot(root) => missing_roots.push(root),
            WalkEvent::Unreadable { path, message } => {
                let at = path
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                walk_warnings.push(format!("{at}: {message}"));
            }
            WalkEvent::File(source) => {
                let outcome =
                    consume_source(&source, options, &mut reconciler, &mut rows, &mut spans);
                notify(options.observer.as_deref(), &outcome);
                outcomes.push(outcome);
            }
        }
    }

    let dataset = finish_dataset(
        reconciler.schema().clone(),
        rows,
        &spans,
        options.sheet_mode,
    );
    let summary = RunSummary {
        outcomes,
        missing_roots,
        walk_warnings,
        widen_notes: reconciler.notes().to_vec(),
    };
    if let Some(obs) = options.observer.as_ref() {
        obs.on_finished(&summary);
    }

    MergeOutput { dataset, summary }
}

/// Read one source and fold its tables into the accumulators.
fn consume_source(
    source: &SourceFile,
    options: &MergeOptions,
    reconciler: &mut Reconciler,
    rows: &mut Vec<Vec<Value>>,
    spans: &mut Vec<Span>,
) -> OutcomeRecord {
    let tables = match read_source(source, &options.read) {
        Ok(tables) => tables,
        Err(reason) => return OutcomeRecord::failed(source.clone(), reason),
    };

    let name = source.file_name();
    let path = source.path.display().to_string();

    let mut merged_rows = 0usize;
    for raw in tables.iter().filter(|t| !t.is_empty()) {
        let aligned = reconciler.align(raw, &source.path);
        pad_rows(rows, reconciler.schema().len());

        merged_rows += aligned.rows.len();
        spans.push(Span {
            rows: aligned.rows.len(),
            name: name.clone(),
            path: path.clone(),
            sheet: sheet_label(source, raw.sheet.as_deref()),
        });
        rows.extend(aligned.rows);
    }

    if merged_rows == 0 {
        OutcomeRecord::skipped(source.clone(), FailureReason::EmptyFile)
    } else {
        OutcomeRecord::merged(source.clone(), merged_rows)
    }
}

/// Pad already-appended rows with absent markers as the global set grows.
/// New columns only ever append at the end, so padding is a pure extension.
fn pad_rows(rows: &mut [Vec<Value>], width: usize) {
    for row in rows {
        while row.len() < width {
            row.push(Value::Absent);
        }
    }
}

/// Append the provenance columns and materialize their values per span.
fn finish_dataset(
    mut schema: Schema,
    mut rows: Vec<Vec<Value>>,
    spans: &[Span],
    mode: SheetMode,
) -> ConsolidatedDataset {
    pad_rows(&mut rows, schema.len());

    let name_col = disambiguate(SOURCE_NAME_COLUMN, &schema);
    schema.fields.push(Field::new(name_col, DataType::Utf8));
    let name_column = schema.len() - 1;

    let path_col = disambiguate(SOURCE_PATH_COLUMN, &schema);
    schema.fields.push(Field::new(path_col, DataType::Utf8));
    let path_column = schema.len() - 1;

    let sheet_column = match mode {
        SheetMode::Flat => None,
        SheetMode::KeepSheets => {
            let sheet_col = disambiguate(SOURCE_SHEET_COLUMN, &schema);
            schema.fields.push(Field::new(sheet_col, DataType::Utf8));
            Some(schema.len() - 1)
        }
    };

    let mut cursor = 0usize;
    for span in spans {
        for row in &mut rows[cursor..cursor + span.rows] {
            row.push(Value::Utf8(span.name.clone()));
            row.push(Value::Utf8(span.path.clone()));
            if sheet_column.is_some() {
                row.push(Value::Utf8(span.sheet.clone()));
            }
        }
        cursor += span.rows;
    }

    ConsolidatedDataset {
        schema,
        rows,
        name_column,
        path_column,
        sheet_column,
    }
}

fn notify(observer: Option<&dyn MergeObserver>, outcome: &OutcomeRecord) {
    let Some(obs) = observer else {
        return;
    };
    match outcome.status {
        OutcomeStatus::Merged => obs.on_merged(outcome),
        OutcomeStatus::Skipped => obs.on_skipped(outcome),
        OutcomeStatus::Failed => obs.on_failed(outcome),
    }
}
