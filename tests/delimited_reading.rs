use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use encoding_rs::{GBK, UTF_8};

use tabular_merge::reader::delimited::read_delimited;
use tabular_merge::reader::ReadOptions;
use tabular_merge::types::{DataType, Value};
use tabular_merge::{merge_tree, FailureReason, MergeOptions, OutcomeStatus};

fn tmp_file(ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("tabular-merge-delimited-{nanos}.{ext}"))
}

#[test]
fn utf8_csv_reads_with_inferred_types() {
    let path = tmp_file("csv");
    fs::write(
        &path,
        "id,price,active,traded_on,note\n1,2.5,yes,2024-01-02,first\n2,3.0,no,2024-01-03,\n",
    )
    .unwrap();

    let raw = read_delimited(&path, &ReadOptions::default()).unwrap();
    let types: Vec<DataType> = raw.data.schema.fields.iter().map(|f| f.data_type).collect();
    assert_eq!(
        types,
        vec![
            DataType::Int64,
            DataType::Float64,
            DataType::Bool,
            DataType::DateTime,
            DataType::Utf8,
        ]
    );
    assert_eq!(raw.data.rows[0][2], Value::Bool(true));
    assert_eq!(raw.data.rows[1][4], Value::Null);

    let _ = fs::remove_file(&path);
}

#[test]
fn gbk_file_merges_through_the_fallback_cascade() {
    let path = tmp_file("csv");
    let (bytes, _, _) = GBK.encode("名称,数量\n股票,10\n");
    fs::write(&path, &bytes).unwrap();

    let raw = read_delimited(&path, &ReadOptions::default()).unwrap();
    assert_eq!(raw.data.schema.fields[0].name, "名称");
    assert_eq!(raw.data.rows[0][0], Value::Utf8("股票".to_string()));
    assert_eq!(raw.data.rows[0][1], Value::Int64(10));

    let _ = fs::remove_file(&path);
}

#[test]
fn undecodable_file_fails_with_decode_failure() {
    let path = tmp_file("csv");
    let (bytes, _, _) = GBK.encode("名称\n股票\n");
    fs::write(&path, &bytes).unwrap();

    // Restrict the cascade so no encoding can decode the GBK bytes.
    let options = ReadOptions {
        encodings: vec![UTF_8],
    };
    let err = read_delimited(&path, &options).unwrap_err();
    assert_eq!(err, FailureReason::DecodeFailure);

    let _ = fs::remove_file(&path);
}

#[test]
fn decode_failure_surfaces_as_failed_outcome_in_a_run() {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("tabular-merge-decode-{nanos}"));
    fs::create_dir_all(&dir).unwrap();
    let (bytes, _, _) = GBK.encode("名称\n股票\n");
    fs::write(dir.join("legacy.csv"), &bytes).unwrap();

    let options = MergeOptions {
        read: ReadOptions {
            encodings: vec![UTF_8],
        },
        ..Default::default()
    };
    let out = merge_tree(&[&dir], &options);

    assert_eq!(out.summary.failed_count(), 1);
    assert_eq!(
        out.summary.outcomes[0].reason,
        Some(FailureReason::DecodeFailure)
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn tsv_files_split_on_tabs() {
    let path = tmp_file("tsv");
    fs::write(&path, "id\tname\n1\tAda\n").unwrap();

    let raw = read_delimited(&path, &ReadOptions::default()).unwrap();
    let names: Vec<&str> = raw.data.schema.field_names().collect();
    assert_eq!(names, vec!["id", "name"]);
    assert_eq!(raw.data.rows[0][1], Value::Utf8("Ada".to_string()));

    let _ = fs::remove_file(&path);
}

#[test]
fn utf8_bom_is_stripped_by_the_first_cascade_entry() {
    let path = tmp_file("csv");
    let mut bytes = vec![0xef, 0xbb, 0xbf];
    bytes.extend_from_slice(b"id\n1\n");
    fs::write(&path, &bytes).unwrap();

    let raw = read_delimited(&path, &ReadOptions::default()).unwrap();
    assert_eq!(raw.data.schema.fields[0].name, "id");

    let _ = fs::remove_file(&path);
}

#[test]
fn header_only_file_is_skipped_not_failed() {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("tabular-merge-headeronly-{nanos}"));
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("empty.csv"), "id,name\n").unwrap();

    let out = merge_tree(&[&dir], &MergeOptions::default());

    assert_eq!(out.summary.outcomes[0].status, OutcomeStatus::Skipped);
    assert_eq!(
        out.summary.outcomes[0].reason,
        Some(FailureReason::EmptyFile)
    );

    let _ = fs::remove_dir_all(&dir);
}
