//! Delimited-text reading with encoding recovery.
//!
//! The file's bytes are read in one acquire-read-release step, then decoded
//! using an ordered fallback list of encodings. Decoding stops at the first
//! encoding that maps the whole file without invalid sequences; if every
//! configured encoding reports errors, the file is classified
//! [`FailureReason::DecodeFailure`].

use std::fs;
use std::io;
use std::path::Path;

use encoding_rs::Encoding;

use crate::error::FailureReason;
use crate::types::RawTable;

use super::infer::table_from_strings;
use super::ReadOptions;

/// Read a delimited-text file into a single [`RawTable`].
///
/// `.tsv` files split on tabs, everything else on commas. The first record is
/// the header row. Short records are padded with empty cells.
pub fn read_delimited(path: &Path, options: &ReadOptions) -> Result<RawTable, FailureReason> {
    // One open handle at a time; the file is fully in memory after this.
    let bytes = fs::read(path).map_err(classify_io)?;
    let text = decode(&bytes, &options.encodings)?;
    parse_records(&text, delimiter_for(path))
}

fn classify_io(e: io::Error) -> FailureReason {
    if e.kind() == io::ErrorKind::PermissionDenied {
        FailureReason::PermissionDenied
    } else {
        FailureReason::CorruptFile(e.to_string())
    }
}

/// Decode `bytes` with the first encoding in `encodings` that reports no
/// invalid sequences.
///
/// `encoding_rs::Encoding::decode` also honors byte-order marks, so UTF-8
/// files written with a BOM decode cleanly under the first attempt.
pub fn decode(bytes: &[u8], encodings: &[&'static Encoding]) -> Result<String, FailureReason> {
    for enc in encodings {
        let (text, _, had_errors) = enc.decode(bytes);
        if !had_errors {
            return Ok(text.into_owned());
        }
    }
    Err(FailureReason::DecodeFailure)
}

fn delimiter_for(path: &Path) -> u8 {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());
    match ext.as_deref() {
        Some("tsv") => b'\t',
        _ => b',',
    }
}

fn parse_records(text: &str, delimiter: u8) -> Result<RawTable, FailureReason> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| FailureReason::CorruptFile(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| FailureReason::CorruptFile(e.to_string()))?;
        let row = (0..headers.len())
            .map(|i| record.get(i).unwrap_or("").to_string())
            .collect();
        rows.push(row);
    }

    Ok(RawTable {
        sheet: None,
        data: table_from_strings(headers, rows),
    })
}

#[cfg(test)]
mod tests {
    use encoding_rs::UTF_8;

    use super::{decode, parse_records};
    use crate::error::FailureReason;
    use crate::types::{DataType, Value};

    #[test]
    fn parses_headers_and_typed_rows() {
        let raw = parse_records("id,name\n1,Ada\n2,Grace\n", b',').unwrap();
        assert_eq!(raw.sheet, None);
        assert_eq!(raw.data.row_count(), 2);
        assert_eq!(raw.data.schema.fields[0].data_type, DataType::Int64);
        assert_eq!(raw.data.rows[0][1], Value::Utf8("Ada".to_string()));
    }

    #[test]
    fn short_records_pad_with_null() {
        let raw = parse_records("a,b\n1\n", b',').unwrap();
        assert_eq!(raw.data.rows[0][1], Value::Null);
    }

    #[test]
    fn decode_fails_when_every_encoding_reports_errors() {
        let err = decode(&[0xff, 0xfe, 0xfd], &[UTF_8]).unwrap_err();
        assert_eq!(err, FailureReason::DecodeFailure);
    }

    #[test]
    fn empty_input_yields_empty_table() {
        let raw = parse_records("", b',').unwrap();
        assert!(raw.is_empty());
    }
}
