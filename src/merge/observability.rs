use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::report::{OutcomeRecord, RunSummary};

/// Observer interface for merge progress.
///
/// Implementors can record metrics, logs, or drive progress display. All
/// callbacks default to no-ops.
pub trait MergeObserver: Send + Sync {
    /// Called when a file's rows were merged.
    fn on_merged(&self, _record: &OutcomeRecord) {}

    /// Called when a file parsed but contributed nothing.
    fn on_skipped(&self, _record: &OutcomeRecord) {}

    /// Called when a file failed to read.
    fn on_failed(&self, _record: &OutcomeRecord) {}

    /// Called once at end of run with the full summary.
    fn on_finished(&self, _summary: &RunSummary) {}
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn MergeObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn MergeObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl MergeObserver for CompositeObserver {
    fn on_merged(&self, record: &OutcomeRecord) {
        for o in &self.observers {
            o.on_merged(record);
        }
    }

    fn on_skipped(&self, record: &OutcomeRecord) {
        for o in &self.observers {
            o.on_skipped(record);
        }
    }

    fn on_failed(&self, record: &OutcomeRecord) {
        for o in &self.observers {
            o.on_failed(record);
        }
    }

    fn on_finished(&self, summary: &RunSummary) {
        for o in &self.observers {
            o.on_finished(summary);
        }
    }
}

/// Logs merge events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl MergeObserver for StdErrObserver {
    fn on_merged(&self, record: &OutcomeRecord) {
        eprintln!(
            "[merge][ok] path={} rows={}",
            record.source.path.display(),
            record.rows
        );
    }

    fn on_skipped(&self, record: &OutcomeRecord) {
        eprintln!("[merge][skip] path={}", record.source.path.display());
    }

    fn on_failed(&self, record: &OutcomeRecord) {
        let reason = record
            .reason
            .as_ref()
            .map(|r| r.to_string())
            .unwrap_or_default();
        eprintln!(
            "[merge][fail] path={} err={reason}",
            record.source.path.display()
        );
    }

    fn on_finished(&self, summary: &RunSummary) {
        eprintln!(
            "[merge][done] merged={} skipped={} failed={} rows={}",
            summary.merged_count(),
            summary.skipped_count(),
            summary.failed_count(),
            summary.total_rows()
        );
    }
}

/// Appends merge events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl MergeObserver for FileObserver {
    fn on_merged(&self, record: &OutcomeRecord) {
        self.append_line(&format!(
            "{} ok path={} rows={}",
            unix_ts(),
            record.source.path.display(),
            record.rows
        ));
    }

    fn on_skipped(&self, record: &OutcomeRecord) {
        self.append_line(&format!(
            "{} skip path={}",
            unix_ts(),
            record.source.path.display()
        ));
    }

    fn on_failed(&self, record: &OutcomeRecord) {
        let reason = record
            .reason
            .as_ref()
            .map(|r| r.to_string())
            .unwrap_or_default();
        self.append_line(&format!(
            "{} fail path={} err={reason}",
            unix_ts(),
            record.source.path.display()
        ));
    }

    fn on_finished(&self, summary: &RunSummary) {
        self.append_line(&format!(
            "{} done merged={} skipped={} failed={} rows={}",
            unix_ts(),
            summary.merged_count(),
            summary.skipped_count(),
            summary.failed_count(),
            summary.total_rows()
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
