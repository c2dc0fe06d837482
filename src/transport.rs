//! Untyped CSV transport
//!
//! Bulk writes and lazy bulk reads of plain text rows, with no structure
//! imposed on them.

use std::io::{Read, Write};
use std::iter::FusedIterator;

use crate::error::CsvCodecError;
use crate::stream::{Row, RowReader, RowWriter};

/// Writes every row of `rows`, in order. Returns the number of rows written.
pub fn write_all<W, I, R, S>(writer: &mut RowWriter<W>, rows: I) -> Result<u64, CsvCodecError>
where
    W: Write,
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    let mut count = 0;
    for row in rows {
        writer.write_row(row)?;
        count += 1;
    }
    Ok(count)
}

/// Lazily reads the remaining rows of `reader`.
///
/// Each call to `next` reads exactly one row. The sequence is single pass:
/// once `reader` is exhausted, a second `read_all` on it yields nothing.
pub fn read_all<R: Read>(reader: &mut RowReader<R>) -> Rows<'_, R> {
    Rows {
        reader,
        done: false,
    }
}

/// Eagerly reads every remaining row into memory.
pub fn collect_all<R: Read>(reader: &mut RowReader<R>) -> Result<Vec<Row>, CsvCodecError> {
    read_all(reader).collect()
}

/// Lazy row sequence returned by [`read_all`].
///
/// Ends at end of stream or right after yielding the first error.
/// Dropping it early leaves the reader open.
pub struct Rows<'r, R: Read> {
    reader: &'r mut RowReader<R>,
    done: bool,
}

impl<R: Read> Iterator for Rows<'_, R> {
    type Item = Result<Row, CsvCodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> FusedIterator for Rows<'_, R> {}
