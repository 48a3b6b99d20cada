//! Provenance column naming.
//!
//! Every consolidated row carries its source file name and path (and, in
//! sheet-preserving mode, a sheet label). If a data column already uses one of
//! the provenance names, the provenance column is renamed deterministically:
//! overwriting source data silently would be a correctness bug.

use crate::locator::SourceFile;
use crate::types::Schema;

/// Preferred name of the source-file-name column.
pub const SOURCE_NAME_COLUMN: &str = "source_name";
/// Preferred name of the source-file-path column.
pub const SOURCE_PATH_COLUMN: &str = "source_path";
/// Preferred name of the sheet-label column (sheet-preserving mode only).
pub const SOURCE_SHEET_COLUMN: &str = "source_sheet";

/// Pick a provenance column name that collides with nothing in `schema`.
///
/// Suffixes `_src` repeatedly until the name is free, so the result is
/// deterministic for a given schema.
pub fn disambiguate(preferred: &str, schema: &Schema) -> String {
    let mut name = preferred.to_string();
    while schema.index_of(&name).is_some() {
        name.push_str("_src");
    }
    name
}

/// The logical-table label for one raw table.
///
/// Delimited files are labelled by their stem; workbook sheets by
/// `stem:sheet`, which keeps sheets with the same name in different workbooks
/// apart. Identically named files in different directories share a label and
/// stay distinguishable through the source-path column.
pub fn sheet_label(source: &SourceFile, sheet: Option<&str>) -> String {
    let stem = source.file_stem();
    match sheet {
        Some(s) => format!("{stem}:{s}"),
        None => stem,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{disambiguate, sheet_label, SOURCE_NAME_COLUMN};
    use crate::locator::SourceFile;
    use crate::types::{DataType, Field, Schema};

    #[test]
    fn free_name_is_kept_as_is() {
        let schema = Schema::new(vec![Field::new("id", DataType::Int64)]);
        assert_eq!(disambiguate(SOURCE_NAME_COLUMN, &schema), "source_name");
    }

    #[test]
    fn collision_renames_instead_of_overwriting() {
        let schema = Schema::new(vec![
            Field::new("source_name", DataType::Utf8),
            Field::new("source_name_src", DataType::Utf8),
        ]);
        assert_eq!(
            disambiguate(SOURCE_NAME_COLUMN, &schema),
            "source_name_src_src"
        );
    }

    #[test]
    fn labels_include_workbook_stem() {
        let source = SourceFile {
            path: PathBuf::from("/data/q1/prices.xlsx"),
            format: None,
            size: 0,
        };
        assert_eq!(sheet_label(&source, Some("Bonds")), "prices:Bonds");
        assert_eq!(sheet_label(&source, None), "prices");
    }
}
