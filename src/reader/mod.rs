//! Per-file reading.
//!
//! [`read_source`] loads one discovered [`SourceFile`] into raw tables (one
//! per workbook sheet, exactly one for delimited files) or a classified
//! [`FailureReason`]. It never panics and never aborts the batch: every
//! failure mode is converted into a reason the reporter can account for.

pub mod delimited;
pub mod infer;
pub mod spreadsheet;

use encoding_rs::{Encoding, GBK, UTF_8, WINDOWS_1252};

use crate::error::FailureReason;
use crate::locator::{SourceFile, SourceFormat};
use crate::types::RawTable;

/// Options controlling how individual files are read.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Ordered encoding fallback list for delimited text.
    ///
    /// The default cascade is UTF-8, then GBK, then WINDOWS-1252. The last of
    /// those maps every byte, so with the default list decoding cannot fail;
    /// callers that restrict the list can observe `DecodeFailure`.
    pub encodings: Vec<&'static Encoding>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            encodings: vec![UTF_8, GBK, WINDOWS_1252],
        }
    }
}

/// Read one source into its raw tables.
///
/// Workbooks yield one [`RawTable`] per named sheet; delimited files yield
/// exactly one with `sheet: None`.
pub fn read_source(
    source: &SourceFile,
    options: &ReadOptions,
) -> Result<Vec<RawTable>, FailureReason> {
    match source.format {
        None => Err(FailureReason::UnsupportedFormat),
        Some(SourceFormat::DelimitedText) => {
            delimited::read_delimited(&source.path, options).map(|t| vec![t])
        }
        Some(SourceFormat::Spreadsheet) => spreadsheet::read_workbook(&source.path),
    }
}
