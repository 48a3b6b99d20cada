//! Consolidated dataset serialization.
//!
//! The output format is selected by the output path's extension: `.csv`/`.tsv`
//! produce UTF-8 delimited text, workbook extensions produce an xlsx file. In
//! sheet-preserving mode the workbook gets one worksheet per sheet label,
//! with names sanitized to Excel's rules; an optional summary worksheet
//! records run statistics and the failure list.

use std::path::Path;

use rust_xlsxwriter::{Workbook, Worksheet};

use crate::error::{MergeError, MergeResult};
use crate::merge::ConsolidatedDataset;
use crate::report::RunSummary;
use crate::types::Value;

/// Excel limits worksheet names to 31 characters.
const MAX_SHEET_NAME_LEN: usize = 31;

/// Worksheet name used when rows carry no sheet label.
const FLAT_SHEET_NAME: &str = "merged";

/// Serialize the dataset to the format selected by `path`'s extension.
///
/// Provenance columns are always included; absent markers and empty cells both
/// serialize as blanks.
pub fn write_dataset(path: impl AsRef<Path>, dataset: &ConsolidatedDataset) -> MergeResult<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());
    match ext.as_deref() {
        Some("csv") => write_delimited(path, dataset, b','),
        Some("tsv") => write_delimited(path, dataset, b'\t'),
        Some("xlsx") | Some("xlsm") => write_workbook(path, dataset, None),
        _ => Err(MergeError::UnsupportedOutput(path.to_path_buf())),
    }
}

fn write_delimited(path: &Path, dataset: &ConsolidatedDataset, delimiter: u8) -> MergeResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)?;

    wtr.write_record(dataset.schema.field_names())?;
    for row in &dataset.rows {
        wtr.write_record(row.iter().map(Value::render))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the dataset as an xlsx workbook.
///
/// Rows are grouped into worksheets by their sheet label when the dataset
/// carries one, otherwise everything lands on a single worksheet. Pass a
/// [`RunSummary`] to append a summary worksheet with counts and failures.
pub fn write_workbook(
    path: impl AsRef<Path>,
    dataset: &ConsolidatedDataset,
    summary: Option<&RunSummary>,
) -> MergeResult<()> {
    let mut workbook = Workbook::new();
    let mut taken: Vec<String> = Vec::new();

    for (label, rows) in group_rows(dataset) {
        let name = unique_sheet_name(&label, &taken);
        taken.push(name.clone());

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&name)?;
        write_sheet(worksheet, dataset, &rows)?;
    }

    if let Some(summary) = summary {
        let name = unique_sheet_name("summary", &taken);
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&name)?;
        write_summary_sheet(worksheet, summary)?;
    }

    workbook.save(path.as_ref())?;
    Ok(())
}

/// Group row indices by sheet label, preserving first-seen label order.
fn group_rows(dataset: &ConsolidatedDataset) -> Vec<(String, Vec<usize>)> {
    let Some(col) = dataset.sheet_column() else {
        return vec![(
            FLAT_SHEET_NAME.to_string(),
            (0..dataset.row_count()).collect(),
        )];
    };

    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
    for (idx, row) in dataset.rows.iter().enumerate() {
        let label = match &row[col] {
            Value::Utf8(l) => l.clone(),
            _ => FLAT_SHEET_NAME.to_string(),
        };
        match groups.iter_mut().find(|(l, _)| *l == label) {
            Some((_, rows)) => rows.push(idx),
            None => groups.push((label, vec![idx])),
        }
    }

    if groups.is_empty() {
        // Keep the workbook well-formed even with zero merged rows.
        groups.push((FLAT_SHEET_NAME.to_string(), Vec::new()));
    }
    groups
}

fn write_sheet(
    worksheet: &mut Worksheet,
    dataset: &ConsolidatedDataset,
    rows: &[usize],
) -> MergeResult<()> {
    for (col, name) in dataset.schema.field_names().enumerate() {
        worksheet.write_string(0, col as u16, name)?;
    }
    for (out_row, &idx) in rows.iter().enumerate() {
        let row = (out_row + 1) as u32;
        for (col, value) in dataset.rows[idx].iter().enumerate() {
            write_cell(worksheet, row, col as u16, value)?;
        }
    }
    Ok(())
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, value: &Value) -> MergeResult<()> {
    match value {
        Value::Absent | Value::Null => {}
        Value::Int64(i) => {
            worksheet.write_number(row, col, *i as f64)?;
        }
        Value::Float64(f) => {
            worksheet.write_number(row, col, *f)?;
        }
        Value::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        Value::DateTime(_) | Value::Utf8(_) => {
            worksheet.write_string(row, col, value.render())?;
        }
    }
    Ok(())
}

fn write_summary_sheet(worksheet: &mut Worksheet, summary: &RunSummary) -> MergeResult<()> {
    let counts: Vec<(&str, String)> = vec![
        ("merged files", summary.merged_count().to_string()),
        ("skipped files", summary.skipped_count().to_string()),
        ("failed files", summary.failed_count().to_string()),
        ("total rows", summary.total_rows().to_string()),
    ];
    let mut row = 0u32;
    for (label, value) in counts {
        worksheet.write_string(row, 0, label)?;
        worksheet.write_string(row, 1, &value)?;
        row += 1;
    }

    if summary.failures().next().is_some() {
        row += 1;
        worksheet.write_string(row, 0, "failed file")?;
        worksheet.write_string(row, 1, "reason")?;
        row += 1;
        for record in summary.failures() {
            let reason = record
                .reason
                .as_ref()
                .map(|r| r.to_string())
                .unwrap_or_default();
            worksheet.write_string(row, 0, record.source.path.display().to_string())?;
            worksheet.write_string(row, 1, &reason)?;
            row += 1;
        }
    }
    Ok(())
}

/// Replace characters Excel forbids in worksheet names and cap the length.
fn sanitize_sheet_name(label: &str) -> String {
    let mut name: String = label
        .chars()
        .map(|c| match c {
            '\\' | '/' | '?' | '*' | '[' | ']' | ':' => '_',
            other => other,
        })
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    if name.is_empty() {
        name.push_str("sheet");
    }
    name
}

/// Sanitize `label` and uniquify it against already-used names with a
/// numeric suffix.
fn unique_sheet_name(label: &str, taken: &[String]) -> String {
    let base = sanitize_sheet_name(label);
    if !taken.iter().any(|t| t == &base) {
        return base;
    }
    for n in 2.. {
        let suffix = format!("_{n}");
        let keep = MAX_SHEET_NAME_LEN.saturating_sub(suffix.len());
        let candidate: String = base.chars().take(keep).chain(suffix.chars()).collect();
        if !taken.iter().any(|t| t == &candidate) {
            return candidate;
        }
    }
    unreachable!("numeric suffixes are unbounded")
}

#[cfg(test)]
mod tests {
    use super::{sanitize_sheet_name, unique_sheet_name};

    #[test]
    fn sanitize_replaces_forbidden_characters() {
        assert_eq!(sanitize_sheet_name("a/b:c*d"), "a_b_c_d");
    }

    #[test]
    fn sanitize_caps_length_to_excel_limit() {
        let long = "x".repeat(40);
        assert_eq!(sanitize_sheet_name(&long).chars().count(), 31);
    }

    #[test]
    fn sanitize_never_returns_empty() {
        assert_eq!(sanitize_sheet_name(""), "sheet");
    }

    #[test]
    fn unique_names_get_numeric_suffixes() {
        let taken = vec!["data".to_string(), "data_2".to_string()];
        assert_eq!(unique_sheet_name("data", &taken), "data_3");
        assert_eq!(unique_sheet_name("other", &taken), "other");
    }
}
