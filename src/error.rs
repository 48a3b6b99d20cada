use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Convenience result type for fallible operations.
pub type MergeResult<T> = Result<T, MergeError>;

/// Hard errors.
///
/// The merge run itself never fails because of a bad input file; per-file
/// problems are classified into [`FailureReason`]s and surfaced through the
/// run summary. `MergeError` only occurs at the serialization boundary, when
/// writing the consolidated dataset out.
#[derive(Debug, Error)]
pub enum MergeError {
    /// Underlying I/O error while writing output.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited output error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook output error.
    #[error("workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    /// The output path's extension selects no known serialization format.
    #[error("unsupported output extension for path ({0})")]
    UnsupportedOutput(PathBuf),
}

/// Classification of a single file that could not be merged.
///
/// Every failure is caught at the reader boundary and converted into one of
/// these; none abort the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum FailureReason {
    /// The file's extension maps to no known reader.
    #[error("unsupported format")]
    UnsupportedFormat,

    /// No configured encoding could decode the file without invalid sequences.
    #[error("undecodable under every configured encoding")]
    DecodeFailure,

    /// The file exists but could not be parsed as its format.
    #[error("corrupt or unreadable file: {0}")]
    CorruptFile(String),

    /// The file parsed successfully but holds zero rows or zero columns.
    ///
    /// Used as a skip reason, not a failure.
    #[error("file parsed to zero rows or zero columns")]
    EmptyFile,

    /// The file could not be opened for reading.
    #[error("permission denied")]
    PermissionDenied,
}
