//! `tabular-merge` consolidates an arbitrary, heterogeneous collection of
//! tabular files (workbooks and delimited text) scattered across a directory
//! tree into one dataset with full provenance, ready for downstream analysis.
//!
//! The primary entrypoint is [`merge_tree`], which walks one or more roots in
//! deterministic order, reads every recognized file independently, reconciles
//! the inconsistent schemas onto one global column set, tags every row with
//! its source file, and reports exactly one outcome per discovered file. A
//! large, messy, partially-corrupt tree always yields a best-effort
//! consolidated result plus an accurate accounting of what was excluded and
//! why; no single bad file ever aborts the batch.
//!
//! ## What gets merged
//!
//! **File formats (detected by extension):**
//!
//! - **Delimited text**: `.csv`, `.tsv`, decoded with an encoding fallback
//!   cascade (UTF-8, then GBK, then WINDOWS-1252 by default)
//! - **Workbooks**: `.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`; every named
//!   sheet is read as its own table
//!
//! **Schema reconciliation:**
//!
//! The global column set is the union of all readable tables' columns in
//! first-seen order. A table missing a column gets [`types::Value::Absent`]
//! markers, explicitly distinct from a real empty cell. Type conflicts widen
//! the column (integer/float to float, anything else to text) and are recorded
//! as informational notes, never errors.
//!
//! ## Quick example
//!
//! ```no_run
//! use tabular_merge::{merge_tree, output, MergeOptions};
//!
//! let out = merge_tree(&["./data", "./archive"], &MergeOptions::default());
//! eprintln!("{}", out.summary);
//! // Output format follows the extension: .csv/.tsv or .xlsx/.xlsm.
//! output::write_dataset("merged.xlsx", &out.dataset)?;
//! # Ok::<(), tabular_merge::MergeError>(())
//! ```
//!
//! ## Sheet-preserving mode
//!
//! Source data often spans multiple logical tables (distinct instrument
//! classes, say) that downstream analysis treats separately. With
//! [`SheetMode::KeepSheets`] every row keeps a sheet label
//! (`<file stem>:<sheet>` for workbook sheets, the file stem for delimited
//! files) in an extra grouping column, and workbook output writes one
//! worksheet per label:
//!
//! ```no_run
//! use tabular_merge::{merge_tree, output, MergeOptions, SheetMode};
//!
//! let options = MergeOptions {
//!     sheet_mode: SheetMode::KeepSheets,
//!     ..Default::default()
//! };
//! let out = merge_tree(&["./data"], &options);
//! for label in out.dataset.sheet_labels() {
//!     println!("{label}: {} rows", out.dataset.sheet_rows(label).len());
//! }
//! output::write_workbook("merged.xlsx", &out.dataset, Some(&out.summary))?;
//! # Ok::<(), tabular_merge::MergeError>(())
//! ```
//!
//! ## Observability
//!
//! Attach a [`merge::observability::MergeObserver`] to log per-file outcomes
//! as they happen:
//!
//! ```no_run
//! use std::sync::Arc;
//! use tabular_merge::merge::observability::StdErrObserver;
//! use tabular_merge::{merge_tree, MergeOptions};
//!
//! let options = MergeOptions {
//!     observer: Some(Arc::new(StdErrObserver)),
//!     ..Default::default()
//! };
//! let out = merge_tree(&["./data"], &options);
//! assert_eq!(out.summary.outcomes.len(), out.summary.merged_count()
//!     + out.summary.skipped_count() + out.summary.failed_count());
//! ```
//!
//! ## Modules
//!
//! - [`locator`]: deterministic source discovery under root paths
//! - [`reader`]: per-format file reading and column type inference
//! - [`reconcile`]: incremental schema reconciliation
//! - [`provenance`]: provenance column naming
//! - [`merge`]: the batch driver and consolidated dataset
//! - [`report`]: per-file outcome records and the run summary
//! - [`output`]: dataset serialization (delimited text or workbook)
//! - [`types`]: schema + in-memory table types
//! - [`error`]: error and failure-classification types

pub mod error;
pub mod locator;
pub mod merge;
pub mod output;
pub mod provenance;
pub mod reader;
pub mod reconcile;
pub mod report;
pub mod types;

pub use error::{FailureReason, MergeError, MergeResult};
pub use merge::{merge_tree, ConsolidatedDataset, MergeOptions, MergeOutput, SheetMode};
pub use report::{OutcomeRecord, OutcomeStatus, RunSummary};
