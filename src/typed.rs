//! Typed CSV transport
//!
//! Combines a [`TableCodec`] with the row streams: a header row followed by
//! encoded data rows on the way out, and a validated header row followed by
//! lazily decoded data rows on the way in.
//!
//! # Example
//!
//! ```
//! use csv_table_codec::codec::{build_codec, transforms, FieldSpec};
//! use csv_table_codec::options::CsvOptions;
//! use csv_table_codec::stream::{RowReader, RowWriter};
//! use csv_table_codec::typed;
//! use serde_json::json;
//!
//! let codec = build_codec(vec![FieldSpec::text("kind"), transforms::integer("count")]).unwrap();
//! let values = vec![
//!     json!({"kind": "plants", "count": 3}).as_object().unwrap().clone(),
//!     json!({"kind": "cats", "count": 2}).as_object().unwrap().clone(),
//! ];
//!
//! let mut writer = RowWriter::open(Vec::new(), &CsvOptions::default()).unwrap();
//! typed::write_all(&mut writer, &codec, &values).unwrap();
//! let bytes = writer.into_inner().unwrap();
//! assert_eq!(bytes, b"kind,count\nplants,3\ncats,2\n");
//!
//! let mut reader = RowReader::open(&bytes[..], &CsvOptions::default()).unwrap();
//! let decoded: Vec<_> = typed::read_all(&mut reader, &codec)
//!     .unwrap()
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(decoded, values);
//! ```

use std::borrow::Borrow;
use std::io::{Read, Write};
use std::iter::FusedIterator;

use crate::codec::{StructuredTarget, TableCodec};
use crate::error::CsvCodecError;
use crate::stream::{RowReader, RowWriter};

/// Writes the codec headers, then one encoded row per value, in order.
/// Returns the number of data rows written.
pub fn write_all<W, T, I>(
    writer: &mut RowWriter<W>,
    codec: &TableCodec<T>,
    values: I,
) -> Result<u64, CsvCodecError>
where
    W: Write,
    T: StructuredTarget,
    I: IntoIterator,
    I::Item: Borrow<T::Value>,
{
    writer.write_row(codec.headers())?;
    write_all_headerless(writer, codec, values)
}

/// Writes one encoded row per value without a header row.
pub fn write_all_headerless<W, T, I>(
    writer: &mut RowWriter<W>,
    codec: &TableCodec<T>,
    values: I,
) -> Result<u64, CsvCodecError>
where
    W: Write,
    T: StructuredTarget,
    I: IntoIterator,
    I::Item: Borrow<T::Value>,
{
    let mut row = Vec::with_capacity(codec.width());
    let mut count = 0;
    for value in values {
        codec.encode_into(value.borrow(), &mut row)?;
        writer.write_row(&row)?;
        count += 1;
    }
    Ok(count)
}

/// Reads and validates the header row, then lazily decodes data rows.
///
/// # Errors
///
/// `CsvCodecError::HeaderMismatch` if the first row is not exactly the codec
/// headers (same cells, same order), or if there is no first row. No data
/// row is read in that case.
pub fn read_all<'a, R, T>(
    reader: &'a mut RowReader<R>,
    codec: &'a TableCodec<T>,
) -> Result<Records<'a, R, T>, CsvCodecError>
where
    R: Read,
    T: StructuredTarget,
{
    let expected = codec.headers();
    match reader.read_row()? {
        Some(actual) if actual == expected => {
            tracing::debug!(headers = ?expected, "header row validated");
        }
        found => {
            let actual = found.unwrap_or_default();
            tracing::warn!(?expected, ?actual, "header mismatch");
            return Err(CsvCodecError::HeaderMismatch {
                expected: expected.to_vec(),
                actual,
            });
        }
    }
    Ok(read_all_headerless(reader, codec))
}

/// Lazily decodes every remaining row, treating the first one as data.
pub fn read_all_headerless<'a, R, T>(
    reader: &'a mut RowReader<R>,
    codec: &'a TableCodec<T>,
) -> Records<'a, R, T>
where
    R: Read,
    T: StructuredTarget,
{
    Records {
        reader,
        codec,
        done: false,
    }
}

/// Eager variant of [`read_all`]: validates the header and decodes every
/// remaining row into memory.
pub fn read_all_eager<R, T>(
    reader: &mut RowReader<R>,
    codec: &TableCodec<T>,
) -> Result<Vec<T::Value>, CsvCodecError>
where
    R: Read,
    T: StructuredTarget,
{
    read_all(reader, codec)?.collect()
}

/// Lazy sequence of decoded values returned by [`read_all`] and
/// [`read_all_headerless`].
///
/// Each call to `next` reads one row. Ends at end of stream or right after
/// yielding the first error. Dropping it early leaves the reader open.
pub struct Records<'a, R: Read, T: StructuredTarget> {
    reader: &'a mut RowReader<R>,
    codec: &'a TableCodec<T>,
    done: bool,
}

impl<R: Read, T: StructuredTarget> Iterator for Records<'_, R, T> {
    type Item = Result<T::Value, CsvCodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let outcome = match self.reader.read_row() {
            Ok(Some(row)) => self
                .codec
                .decode(&row)
                .map_err(|e| e.at_line(self.reader.line())),
            Ok(None) => {
                self.done = true;
                return None;
            }
            Err(e) => Err(e),
        };
        if outcome.is_err() {
            self.done = true;
        }
        Some(outcome)
    }
}

impl<R: Read, T: StructuredTarget> FusedIterator for Records<'_, R, T> {}
