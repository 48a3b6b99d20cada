//! Per-file outcome accounting.
//!
//! Every discovered file gets exactly one [`OutcomeRecord`] regardless of how
//! its read went; the [`RunSummary`] is the sole mechanism for surfacing
//! partial failure. A run never aborts because of one bad file: it always
//! completes and reports what happened.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::FailureReason;
use crate::locator::SourceFile;
use crate::reconcile::WidenNote;

/// What happened to one discovered file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutcomeStatus {
    /// At least one row was merged into the consolidated dataset.
    Merged,
    /// The file read fine but contributed nothing (zero rows or columns).
    Skipped,
    /// The file could not be read; `reason` says why.
    Failed,
}

/// One audit entry per discovered file. Lifecycle spans a single run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeRecord {
    /// The file this record accounts for.
    pub source: SourceFile,
    /// Merge outcome.
    pub status: OutcomeStatus,
    /// Why the file was skipped or failed; `None` for merged files.
    pub reason: Option<FailureReason>,
    /// Rows contributed to the consolidated dataset.
    pub rows: usize,
}

impl OutcomeRecord {
    /// Record a successfully merged file.
    pub fn merged(source: SourceFile, rows: usize) -> Self {
        Self {
            source,
            status: OutcomeStatus::Merged,
            reason: None,
            rows,
        }
    }

    /// Record a file that parsed but contributed nothing.
    pub fn skipped(source: SourceFile, reason: FailureReason) -> Self {
        Self {
            source,
            status: OutcomeStatus::Skipped,
            reason: Some(reason),
            rows: 0,
        }
    }

    /// Record a file that could not be read.
    pub fn failed(source: SourceFile, reason: FailureReason) -> Self {
        Self {
            source,
            status: OutcomeStatus::Failed,
            reason: Some(reason),
            rows: 0,
        }
    }
}

/// Structured end-of-run report, in discovery order.
///
/// Serializes to JSON for an external CLI layer and implements [`fmt::Display`]
/// for human-readable logs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// One record per discovered file, in discovery order.
    pub outcomes: Vec<OutcomeRecord>,
    /// Root paths that did not exist or were not directories.
    pub missing_roots: Vec<PathBuf>,
    /// Directory entries that could not be traversed.
    pub walk_warnings: Vec<String>,
    /// Informational type-widening notes from reconciliation.
    pub widen_notes: Vec<WidenNote>,
}

impl RunSummary {
    /// Count of files with the given status.
    pub fn count(&self, status: OutcomeStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// Files merged into the output.
    pub fn merged_count(&self) -> usize {
        self.count(OutcomeStatus::Merged)
    }

    /// Files skipped as empty.
    pub fn skipped_count(&self) -> usize {
        self.count(OutcomeStatus::Skipped)
    }

    /// Files that failed to read.
    pub fn failed_count(&self) -> usize {
        self.count(OutcomeStatus::Failed)
    }

    /// Total rows contributed by merged files.
    pub fn total_rows(&self) -> usize {
        self.outcomes.iter().map(|o| o.rows).sum()
    }

    /// Failed records, in discovery order.
    pub fn failures(&self) -> impl Iterator<Item = &OutcomeRecord> {
        self.outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Failed)
    }

    /// Serialize the report as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "merged={} skipped={} failed={} rows={}",
            self.merged_count(),
            self.skipped_count(),
            self.failed_count(),
            self.total_rows()
        )?;
        for root in &self.missing_roots {
            writeln!(f, "missing root: {}", root.display())?;
        }
        for warning in &self.walk_warnings {
            writeln!(f, "walk warning: {warning}")?;
        }
        for record in self.failures() {
            let reason = record
                .reason
                .as_ref()
                .map(|r| r.to_string())
                .unwrap_or_default();
            writeln!(f, "failed: {} ({reason})", record.source.path.display())?;
        }
        for note in &self.widen_notes {
            writeln!(
                f,
                "widened column '{}' {:?} -> {:?} ({})",
                note.column,
                note.from,
                note.to,
                note.path.display()
            )?;
        }
        Ok(())
    }
}
