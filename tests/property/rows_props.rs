//! Property-based tests for row streams
//!
//! Rows written by a `RowWriter` and read back by a `RowReader` must come
//! back cell for cell, whatever the dialect and whatever the cells contain.

use proptest::prelude::*;
use tempfile::tempdir;

use csv_table_codec::options::{CsvOptions, LineDelimiter};
use csv_table_codec::stream::{Row, RowReader, RowWriter};
use csv_table_codec::transport;

/// Strategy for generating cells that need quoting under the default dialect
fn special_cell_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        // Cells with commas
        "[a-zA-Z0-9]{0,10},[a-zA-Z0-9]{0,10}".prop_map(|s| s),
        // Cells with double quotes
        "[a-zA-Z0-9]{0,10}\"[a-zA-Z0-9]{0,10}\"[a-zA-Z0-9]{0,10}".prop_map(|s| s),
        // Cells with newlines
        "[a-zA-Z0-9]{0,10}\n[a-zA-Z0-9]{0,10}".prop_map(|s| s),
        // Cells with carriage returns
        "[a-zA-Z0-9]{0,10}\r\n[a-zA-Z0-9]{0,10}".prop_map(|s| s),
        // Everything at once
        "[a-zA-Z0-9]{0,5},\"[a-zA-Z0-9]{0,5}\"\n[a-zA-Z0-9]{0,5}".prop_map(|s| s),
        // Cells made only of quotes
        "\"{1,4}".prop_map(|s| s),
        Just(r#"{"key": "value, with comma"}"#.to_string()),
        Just("active, meowing, \neating houseplants".to_string()),
    ]
}

/// Strategy for generating arbitrary cells
fn cell_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,20}".prop_map(|s| s),
        special_cell_strategy(),
        "[;'|\t]{0,3}[a-z]{0,5}".prop_map(|s| s),
        Just(String::new()),
        Just("Hello 世界 🌍".to_string()),
    ]
}

/// Strategy for generating rows of one to eight cells
fn row_strategy() -> impl Strategy<Value = Row> {
    prop::collection::vec(cell_strategy(), 1..8)
}

/// Strategy for generating writable dialects
fn options_strategy() -> impl Strategy<Value = CsvOptions> {
    (
        prop_oneof![Just(','), Just(';'), Just('\t'), Just('|')],
        prop_oneof![Just('"'), Just('\'')],
        prop_oneof![Just(LineDelimiter::Lf), Just(LineDelimiter::Crlf)],
    )
        .prop_map(|(separator, quote, delimiter)| {
            CsvOptions::default()
                .with_separator(separator)
                .with_quote(quote)
                .with_line_delimiter(delimiter)
        })
}

fn write_rows(rows: &[Row], options: &CsvOptions) -> Vec<u8> {
    let mut writer = RowWriter::open(Vec::new(), options).expect("Failed to open writer");
    transport::write_all(&mut writer, rows).expect("Failed to write rows");
    writer.into_inner().expect("Failed to flush writer")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Rows survive a write/read cycle in the default dialect
    #[test]
    fn rows_roundtrip_default_dialect(
        rows in prop::collection::vec(row_strategy(), 0..20)
    ) {
        let options = CsvOptions::default();
        let bytes = write_rows(&rows, &options);

        let mut reader = RowReader::open(&bytes[..], &options).expect("Failed to open reader");
        let read = transport::collect_all(&mut reader).expect("Failed to read rows");
        prop_assert_eq!(read, rows);
    }

    // Rows survive a write/read cycle in any supported dialect
    #[test]
    fn rows_roundtrip_any_dialect(
        rows in prop::collection::vec(row_strategy(), 1..10),
        options in options_strategy()
    ) {
        let bytes = write_rows(&rows, &options);

        let mut reader = RowReader::open(&bytes[..], &options).expect("Failed to open reader");
        let read = transport::collect_all(&mut reader).expect("Failed to read rows");
        prop_assert_eq!(read, rows);
    }

    // Counters track every row
    #[test]
    fn rows_written_matches_rows_read(
        rows in prop::collection::vec(row_strategy(), 0..20)
    ) {
        let options = CsvOptions::default();
        let mut writer = RowWriter::open(Vec::new(), &options).expect("Failed to open writer");
        let written = transport::write_all(&mut writer, &rows).expect("Failed to write rows");
        prop_assert_eq!(written, rows.len() as u64);
        prop_assert_eq!(writer.rows_written(), rows.len() as u64);
        let bytes = writer.into_inner().expect("Failed to flush writer");

        let mut reader = RowReader::open(&bytes[..], &options).expect("Failed to open reader");
        let count = transport::read_all(&mut reader).count();
        prop_assert_eq!(count, rows.len());
        prop_assert_eq!(reader.rows_read(), rows.len() as u64);
        // Exhaustion is sticky
        prop_assert!(reader.read_row().expect("Read after end failed").is_none());
    }

    // Files on disk behave like in-memory buffers
    #[test]
    fn rows_roundtrip_through_file(
        rows in prop::collection::vec(row_strategy(), 1..10)
    ) {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let file_path = temp_dir.path().join("rows.csv");
        let options = CsvOptions::default().with_line_delimiter(LineDelimiter::Crlf);

        {
            let mut writer = RowWriter::create(&file_path, &options)
                .expect("Failed to create CSV writer");
            transport::write_all(&mut writer, &rows).expect("Failed to write rows");
            writer.close().expect("Failed to close writer");
        }

        let mut reader = RowReader::from_path(&file_path, &options)
            .expect("Failed to open CSV reader");
        let read = transport::collect_all(&mut reader).expect("Failed to read rows");
        prop_assert_eq!(read, rows);
    }
}
