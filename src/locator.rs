//! Source discovery.
//!
//! Recursively enumerates candidate files under one or more root paths,
//! filtered to a configurable set of recognized extensions. Traversal is
//! depth-first with entries sorted lexicographically per directory level, so
//! discovery order is reproducible across runs and platforms. Symlinks are
//! followed; walkdir's ancestor check breaks symlink cycles and reports them
//! as unreadable entries instead of looping.

use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

/// Extensions recognized when the caller does not configure their own set.
pub const DEFAULT_EXTENSIONS: &[&str] = &["csv", "tsv", "xlsx", "xls", "xlsm", "xlsb", "ods"];

/// The closed set of source kinds the reader knows how to load.
///
/// Adding a format means adding a variant here plus a reader implementation,
/// not editing shared conditional logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SourceFormat {
    /// Workbook formats read via calamine (`.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`).
    Spreadsheet,
    /// Delimited text (`.csv`, `.tsv`).
    DelimitedText,
}

impl SourceFormat {
    /// Detect a source format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" | "tsv" => Some(Self::DelimitedText),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Spreadsheet),
            _ => None,
        }
    }
}

/// One discovered unit of work. Immutable once discovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    /// Path as discovered under its root.
    pub path: PathBuf,
    /// Detected format; `None` when the extension passed the configured filter
    /// but maps to no reader (reading it yields `UnsupportedFormat`).
    pub format: Option<SourceFormat>,
    /// File size in bytes at discovery time.
    pub size: u64,
}

impl SourceFile {
    /// The file name component, lossily converted.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// The file stem (name without extension), lossily converted.
    pub fn file_stem(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Events produced while walking the roots.
///
/// Problems are yielded inline rather than aborting, so one missing root or
/// unreadable subdirectory never stops traversal of everything else.
#[derive(Debug)]
pub enum WalkEvent {
    /// A candidate file whose extension matched the configured set.
    File(SourceFile),
    /// A root path that does not exist or is not a directory.
    MissingRoot(PathBuf),
    /// A directory entry that could not be read (permissions, symlink loop).
    Unreadable {
        /// Offending path, when known.
        path: Option<PathBuf>,
        /// Human-readable cause.
        message: String,
    },
}

/// Lazily walk `roots` in deterministic order, yielding matching files.
///
/// `extensions` is matched case-insensitively against each file's extension.
/// The iterator is restartable: calling this again with the same arguments on
/// an unchanged tree yields the same sequence.
pub fn walk_sources<'a>(
    roots: &'a [PathBuf],
    extensions: &'a [String],
) -> impl Iterator<Item = WalkEvent> + 'a {
    roots.iter().flat_map(move |root| walk_one_root(root, extensions))
}

fn walk_one_root<'a>(
    root: &'a Path,
    extensions: &'a [String],
) -> Box<dyn Iterator<Item = WalkEvent> + 'a> {
    if !root.is_dir() {
        return Box::new(std::iter::once(WalkEvent::MissingRoot(root.to_path_buf())));
    }

    let walk = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(move |entry| match entry {
            Err(e) => Some(WalkEvent::Unreadable {
                path: e.path().map(Path::to_path_buf),
                message: e.to_string(),
            }),
            Ok(entry) => {
                if !entry.file_type().is_file() {
                    return None;
                }
                let ext = entry.path().extension()?.to_str()?.to_ascii_lowercase();
                if !extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)) {
                    return None;
                }
                let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
                Some(WalkEvent::File(SourceFile {
                    path: entry.path().to_path_buf(),
                    format: SourceFormat::from_extension(&ext),
                    size,
                }))
            }
        });

    Box::new(walk)
}
