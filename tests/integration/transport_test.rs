//! Integration tests for untyped and typed transport over files on disk

use serde_json::{json, Map, Value};
use std::fs;
use tempfile::tempdir;

use csv_table_codec::codec::{build_codec, transforms, FieldSpec};
use csv_table_codec::error::CsvCodecError;
use csv_table_codec::options::{CsvOptions, LineDelimiter};
use csv_table_codec::stream::{with_reader, with_writer, RowReader, RowWriter};
use csv_table_codec::{transport, typed};

const SIGHTINGS: &str = "2021-11-14,plants,3,\"one fewer\"\n\
                         2021-11-13,cats,2,\"active, meowing, \neating houseplants\"\n\
                         2021-11-13,plants,4";

fn object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("not an object")
}

#[test]
fn test_concrete_scenario_parses_three_rows() {
    let mut reader = RowReader::open(SIGHTINGS.as_bytes(), &CsvOptions::default()).unwrap();
    let rows = transport::collect_all(&mut reader).unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], ["2021-11-14", "plants", "3", "one fewer"]);
    assert_eq!(
        rows[1],
        [
            "2021-11-13",
            "cats",
            "2",
            "active, meowing, \neating houseplants"
        ]
    );
    assert_eq!(rows[2], ["2021-11-13", "plants", "4"]);
}

#[test]
fn test_concrete_scenario_rows_write_back() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("sightings_copy.csv");

    let mut reader = RowReader::open(SIGHTINGS.as_bytes(), &CsvOptions::default()).unwrap();
    let rows = transport::collect_all(&mut reader).unwrap();
    let widths: Vec<usize> = rows.iter().map(Vec::len).collect();
    assert_eq!(widths, [4, 4, 3]);

    let mut writer = RowWriter::create(&file_path, &CsvOptions::default()).unwrap();
    assert_eq!(transport::write_all(&mut writer, &rows).unwrap(), 3);
    writer.close().unwrap();

    let text = fs::read_to_string(&file_path).unwrap();
    assert_eq!(
        text,
        "2021-11-14,plants,3,one fewer\n\
         2021-11-13,cats,2,\"active, meowing, \neating houseplants\"\n\
         2021-11-13,plants,4\n"
    );

    let mut reader = RowReader::from_path(&file_path, &CsvOptions::default()).unwrap();
    assert_eq!(transport::collect_all(&mut reader).unwrap(), rows);
}

#[test]
fn test_concrete_scenario_from_file() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("sightings.csv");
    fs::write(&file_path, SIGHTINGS).unwrap();

    let mut reader = RowReader::from_path(&file_path, &CsvOptions::default()).unwrap();
    let kinds: Vec<String> = transport::read_all(&mut reader)
        .map(|row| row.unwrap()[1].clone())
        .collect();
    assert_eq!(kinds, ["plants", "cats", "plants"]);
    assert_eq!(reader.rows_read(), 3);
}

#[test]
fn test_lazy_exhaustion_is_idempotent() {
    let mut reader = RowReader::open(SIGHTINGS.as_bytes(), &CsvOptions::default()).unwrap();
    assert_eq!(transport::read_all(&mut reader).count(), 3);
    for _ in 0..3 {
        assert!(reader.read_row().unwrap().is_none());
    }
    assert_eq!(transport::read_all(&mut reader).count(), 0);
}

#[test]
fn test_write_file_with_crlf_and_read_back() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("crlf.csv");
    let options = CsvOptions::default()
        .with_separator(';')
        .with_line_delimiter(LineDelimiter::Crlf);
    let rows = vec![vec!["a;b", "c"], vec!["line\nbreak", ""]];

    {
        let mut writer = RowWriter::create(&file_path, &options).unwrap();
        assert_eq!(transport::write_all(&mut writer, &rows).unwrap(), 2);
        writer.close().unwrap();
        writer.close().unwrap();
        assert!(matches!(
            writer.write_row(["late"]),
            Err(CsvCodecError::Closed)
        ));
    }

    let text = fs::read_to_string(&file_path).unwrap();
    assert_eq!(text, "\"a;b\";c\r\n\"line\nbreak\";\r\n");

    let mut reader = RowReader::from_path(&file_path, &options).unwrap();
    assert_eq!(transport::collect_all(&mut reader).unwrap(), rows);
    reader.close();
    assert!(matches!(reader.read_row(), Err(CsvCodecError::Closed)));
}

#[test]
fn test_malformed_row_reports_raw_line() {
    let input = "ok,1\n\"never closed,2\n";
    let mut reader = RowReader::open(input.as_bytes(), &CsvOptions::default()).unwrap();
    let mut rows = transport::read_all(&mut reader);
    assert!(rows.next().unwrap().is_ok());
    match rows.next() {
        Some(Err(CsvCodecError::MalformedRow { line, raw, .. })) => {
            assert_eq!(line, 2);
            assert_eq!(raw.as_deref(), Some("\"never closed,2"));
        }
        other => panic!("expected MalformedRow, got {:?}", other),
    }
    assert!(rows.next().is_none());
}

#[test]
fn test_field_size_limit() {
    let options = CsvOptions::default().with_field_size_limit(Some(4));
    let mut reader = RowReader::open(&b"abcd,ef\nabcde,f\n"[..], &options).unwrap();
    assert!(reader.read_row().unwrap().is_some());
    assert!(matches!(
        reader.read_row(),
        Err(CsvCodecError::FieldTooLarge {
            line: 2,
            field_index: 0,
            limit: 4,
            actual: 5
        })
    ));
}

#[test]
fn test_typed_roundtrip_through_file() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("typed.csv");
    let codec = build_codec(vec![
        transforms::date("date", "%Y-%m-%d"),
        FieldSpec::text("kind"),
        transforms::integer("count"),
        FieldSpec::text("notes"),
    ])
    .unwrap();
    let values = vec![
        object(json!({"date": "2021-11-14", "kind": "plants", "count": 3, "notes": "one fewer"})),
        object(json!({
            "date": "2021-11-13",
            "kind": "cats",
            "count": 2,
            "notes": "active, meowing, \neating houseplants"
        })),
    ];

    let file = fs::File::create(&file_path).unwrap();
    let written = with_writer(file, &CsvOptions::default(), |writer| {
        typed::write_all(writer, &codec, &values)
    })
    .unwrap();
    assert_eq!(written, 2);

    let text = fs::read_to_string(&file_path).unwrap();
    assert!(text.starts_with("date,kind,count,notes\n2021-11-14,plants,3,one fewer\n"));

    let file = fs::File::open(&file_path).unwrap();
    let read = with_reader(file, &CsvOptions::default(), |reader| {
        typed::read_all_eager(reader, &codec)
    })
    .unwrap();
    assert_eq!(read, values);
}

#[test]
fn test_header_mismatch_before_any_data_row() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("short_header.csv");
    fs::write(&file_path, "a,b\n1,2\n3,4\n").unwrap();

    let codec = build_codec(vec![
        FieldSpec::text("a"),
        FieldSpec::text("b"),
        FieldSpec::text("c"),
    ])
    .unwrap();

    let mut reader = RowReader::from_path(&file_path, &CsvOptions::default()).unwrap();
    match typed::read_all(&mut reader, &codec) {
        Err(CsvCodecError::HeaderMismatch { expected, actual }) => {
            assert_eq!(expected, ["a", "b", "c"]);
            assert_eq!(actual, ["a", "b"]);
        }
        Err(other) => panic!("expected HeaderMismatch, got {:?}", other),
        Ok(_) => panic!("expected HeaderMismatch"),
    }
    // Only the header row was consumed
    assert_eq!(reader.rows_read(), 1);
    assert_eq!(reader.read_row().unwrap(), Some(vec!["1".to_string(), "2".to_string()]));
}

#[test]
fn test_header_mismatch_message_shows_both_headers() {
    let error = CsvCodecError::HeaderMismatch {
        expected: vec!["a".into(), "b".into(), "c".into()],
        actual: vec!["a".into(), "b".into()],
    };
    let message = error.to_string();
    assert!(message.contains("\"c\""));
    assert!(message.contains("[\"a\", \"b\"]"));
}

#[test]
fn test_abandoned_typed_read_leaves_reader_usable() {
    let codec = build_codec(vec![FieldSpec::text("n")]).unwrap();
    let mut reader = RowReader::open(&b"n\n1\n2\n3\n"[..], &CsvOptions::default()).unwrap();
    {
        let mut values = typed::read_all(&mut reader, &codec).unwrap();
        assert_eq!(values.next().unwrap().unwrap()["n"], json!("1"));
    }
    assert!(!reader.is_closed());
    let rest: Vec<_> = typed::read_all_headerless(&mut reader, &codec)
        .map(|v| v.unwrap()["n"].clone())
        .collect();
    assert_eq!(rest, [json!("2"), json!("3")]);
}
