//! Row stream module
//!
//! Reads and writes ordered rows of text cells over byte sources and sinks.
//! Handles own their tokenizer for their whole lifetime and are released by
//! `close`, by drop, or by the scoped helpers [`with_reader`] and
//! [`with_writer`].

pub mod reader;
mod tap;
pub mod writer;

use std::io::{Read, Write};

use crate::error::CsvCodecError;
use crate::options::CsvOptions;

pub use reader::RowReader;
pub use writer::RowWriter;

/// One line of tabular data: ordered text cells, identified by position only.
pub type Row = Vec<String>;

/// Opens a reader over `source`, runs `f` with it and releases it on every
/// exit path.
pub fn with_reader<R, T, F>(source: R, options: &CsvOptions, f: F) -> Result<T, CsvCodecError>
where
    R: Read,
    F: FnOnce(&mut RowReader<R>) -> Result<T, CsvCodecError>,
{
    let mut reader = RowReader::open(source, options)?;
    let result = f(&mut reader);
    reader.close();
    result
}

/// Opens a writer over `sink`, runs `f` with it and releases it on every
/// exit path.
///
/// The final flush error is returned only when `f` succeeded; otherwise the
/// error from `f` wins.
pub fn with_writer<W, T, F>(sink: W, options: &CsvOptions, f: F) -> Result<T, CsvCodecError>
where
    W: Write,
    F: FnOnce(&mut RowWriter<W>) -> Result<T, CsvCodecError>,
{
    let mut writer = RowWriter::open(sink, options)?;
    let result = f(&mut writer);
    let closed = writer.close();
    let value = result?;
    closed?;
    Ok(value)
}
