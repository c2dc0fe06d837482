use csv::{QuoteStyle, Writer, WriterBuilder};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::CsvCodecError;
use crate::options::CsvOptions;

/// Row writer over a byte sink.
///
/// The `RowWriter` formats one ordered sequence of text cells per call as a
/// CSV line. Cells containing the separator, the quote character or a line
/// break are quoted, and embedded quotes are doubled.
///
/// Output is buffered. It reaches the sink on [`flush`](Self::flush),
/// [`close`](Self::close), [`into_inner`](Self::into_inner) or drop; only the
/// explicit calls report flush errors.
///
/// A writer is not safe for concurrent use; callers must serialize access.
pub struct RowWriter<W: Write> {
    /// The formatter, `None` once released.
    inner: Option<Writer<W>>,
    rows_written: u64,
}

impl<W: Write> RowWriter<W> {
    /// Creates a row writer over `sink`.
    pub fn open(sink: W, options: &CsvOptions) -> Result<Self, CsvCodecError> {
        let dialect = options.dialect()?;
        let writer = WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(dialect.delimiter)
            .quote(dialect.quote)
            .double_quote(true)
            .quote_style(QuoteStyle::Necessary)
            .terminator(dialect.terminator())
            .from_writer(sink);

        Ok(Self {
            inner: Some(writer),
            rows_written: 0,
        })
    }

    /// Appends one row.
    ///
    /// A row with a single empty cell is written as `""` so that it reads
    /// back as one cell rather than as a blank line.
    pub fn write_row<I, S>(&mut self, cells: I) -> Result<(), CsvCodecError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let writer = self.inner.as_mut().ok_or(CsvCodecError::Closed)?;
        writer.write_record(cells)?;
        self.rows_written += 1;
        Ok(())
    }

    /// Flushes buffered rows to the sink.
    pub fn flush(&mut self) -> Result<(), CsvCodecError> {
        let writer = self.inner.as_mut().ok_or(CsvCodecError::Closed)?;
        writer.flush()?;
        Ok(())
    }

    /// Flushes and releases the sink. A second call does nothing.
    pub fn close(&mut self) -> Result<(), CsvCodecError> {
        if let Some(mut writer) = self.inner.take() {
            writer.flush()?;
            tracing::debug!(rows_written = self.rows_written, "row writer closed");
        }
        Ok(())
    }

    /// Flushes and returns the sink.
    pub fn into_inner(mut self) -> Result<W, CsvCodecError> {
        let writer = self.inner.take().ok_or(CsvCodecError::Closed)?;
        writer
            .into_inner()
            .map_err(|e| CsvCodecError::Io(e.into_error()))
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    /// Number of rows written so far.
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }
}

impl RowWriter<File> {
    /// Creates (or truncates) the file at `path` and opens a row writer on it.
    pub fn create(path: &Path, options: &CsvOptions) -> Result<Self, CsvCodecError> {
        let file = File::create(path)?;
        Self::open(file, options)
    }
}
