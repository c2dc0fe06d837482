use csv::{Reader, ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::tap::{ends_inside_quotes, Tap};
use super::Row;
use crate::error::CsvCodecError;
use crate::options::{CsvOptions, Dialect};

/// Row reader over a byte source.
///
/// The `RowReader` parses one line of CSV at a time into an ordered [`Row`]
/// of text cells. No header is implied: the first line is returned like any
/// other row.
///
/// # Features
///
/// - Accepts `\n`, `\r` and `\r\n` line endings
/// - Skips blank lines, including trailing blank content
/// - Reports unterminated quoted fields and invalid UTF-8 as
///   [`CsvCodecError::MalformedRow`] with the offending text
/// - Enforces the optional field size limit from [`CsvOptions`]
/// - Returns `Ok(None)` on every call once the source is exhausted
///
/// A reader is not safe for concurrent use; callers must serialize access.
pub struct RowReader<R: Read> {
    /// The tokenizer, `None` once released.
    inner: Option<Reader<Tap<R>>>,
    dialect: Dialect,
    /// Reused parse buffer.
    record: StringRecord,
    rows_read: u64,
    /// Line on which the last returned row started (1-indexed).
    line: u64,
}

impl<R: Read> RowReader<R> {
    /// Creates a row reader over `source`.
    pub fn open(source: R, options: &CsvOptions) -> Result<Self, CsvCodecError> {
        let dialect = options.dialect()?;
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(dialect.delimiter)
            .quote(dialect.quote)
            .terminator(csv::Terminator::CRLF)
            .from_reader(Tap::new(source));

        Ok(Self {
            inner: Some(reader),
            dialect,
            record: StringRecord::new(),
            rows_read: 0,
            line: 0,
        })
    }

    /// Reads the next row, or `Ok(None)` at end of stream.
    ///
    /// # Errors
    ///
    /// - `CsvCodecError::MalformedRow` if the next row cannot be parsed
    /// - `CsvCodecError::FieldTooLarge` if a cell exceeds the size limit
    /// - `CsvCodecError::Io` if the source fails
    /// - `CsvCodecError::Closed` if the reader was released
    pub fn read_row(&mut self) -> Result<Option<Row>, CsvCodecError> {
        let reader = self.inner.as_mut().ok_or(CsvCodecError::Closed)?;

        let outcome = reader.read_record(&mut self.record);
        let end = reader.position().byte();

        let record = match outcome {
            Ok(false) => return Ok(None),
            Ok(true) => &self.record,
            Err(err) => {
                let (start, line) = err
                    .position()
                    .map_or((end, self.line + 1), |p| (p.byte(), p.line()));
                let raw = raw_text(reader.get_ref().span(start, end));
                reader.get_mut().release_until(end);
                return Err(malformed(err, line, raw));
            }
        };

        let (start, line) = record
            .position()
            .map_or((end, self.line + 1), |p| (p.byte(), p.line()));
        self.line = line;

        // A row left open by a quote runs to the end of everything read so far
        let span = reader.get_ref().span(start, end);
        if end == reader.get_ref().total()
            && ends_inside_quotes(span, self.dialect.delimiter, self.dialect.quote)
        {
            let raw = raw_text(span);
            reader.get_mut().release_until(end);
            tracing::debug!(line, "unterminated quoted field");
            return Err(CsvCodecError::MalformedRow {
                line,
                raw,
                reason: "unterminated quoted field".to_string(),
            });
        }
        reader.get_mut().release_until(end);

        // Check field size limits if configured
        if let Some(limit) = self.dialect.field_size_limit {
            for (i, field) in record.iter().enumerate() {
                if field.len() > limit {
                    return Err(CsvCodecError::FieldTooLarge {
                        line,
                        field_index: i,
                        limit,
                        actual: field.len(),
                    });
                }
            }
        }

        self.rows_read += 1;
        Ok(Some(record.iter().map(str::to_owned).collect()))
    }

    /// Releases the underlying source. A second call does nothing.
    pub fn close(&mut self) {
        if self.inner.take().is_some() {
            tracing::debug!(rows_read = self.rows_read, "row reader closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    /// Number of rows returned so far.
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Line on which the last returned row started, 0 before the first row.
    pub fn line(&self) -> u64 {
        self.line
    }
}

impl RowReader<File> {
    /// Opens a row reader over the file at `path`.
    pub fn from_path(path: &Path, options: &CsvOptions) -> Result<Self, CsvCodecError> {
        let file = File::open(path)?;
        Self::open(file, options)
    }
}

fn raw_text(span: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(span);
    let text = text.trim_matches(|c| c == '\r' || c == '\n');
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn malformed(err: csv::Error, line: u64, raw: Option<String>) -> CsvCodecError {
    let reason = match err.into_kind() {
        csv::ErrorKind::Io(io) => return CsvCodecError::Io(io),
        csv::ErrorKind::Utf8 { err: utf8, .. } => {
            format!("invalid UTF-8 in field {}", utf8.field())
        }
        other => format!("{:?}", other),
    };
    CsvCodecError::MalformedRow { line, raw, reason }
}
