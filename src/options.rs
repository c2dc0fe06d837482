//! Dialect options module
//!
//! Handles the construction options shared by row readers and writers, from
//! code or from a JSON dialect file. This module provides [`CsvOptions`] and
//! the byte-level [`Dialect`] it validates into.
//!
//! # Example
//!
//! ```rust,ignore
//! use csv_table_codec::options::{CsvOptions, LineDelimiter};
//! use std::path::Path;
//!
//! // Semicolon separated, CRLF terminated
//! let options = CsvOptions::default()
//!     .with_separator(';')
//!     .with_line_delimiter(LineDelimiter::Crlf);
//!
//! // From JSON file
//! let options = CsvOptions::from_json_file(Path::new("dialect.json"))?;
//! ```

use crate::error::CsvCodecError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Line terminator emitted by writers.
///
/// Readers accept `\n`, `\r` and `\r\n` whichever is configured.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LineDelimiter {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    Crlf,
}

/// Construction options for [`RowReader`](crate::stream::RowReader) and
/// [`RowWriter`](crate::stream::RowWriter).
///
/// Missing keys in a JSON dialect file fall back to the defaults:
///
/// ```json
/// {
///     "field_separator": ";",
///     "quote_character": "'",
///     "line_delimiter": "crlf",
///     "field_size_limit": 65536
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// Cell separator. Default `,`.
    pub field_separator: char,
    /// Quote character; embedded quotes are escaped by doubling. Default `"`.
    pub quote_character: char,
    /// Terminator written after each row. Default LF.
    pub line_delimiter: LineDelimiter,
    /// Largest cell, in bytes, a reader accepts. Unlimited when `None`.
    pub field_size_limit: Option<usize>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            field_separator: ',',
            quote_character: '"',
            line_delimiter: LineDelimiter::Lf,
            field_size_limit: None,
        }
    }
}

/// Byte-level form of [`CsvOptions`], checked once when a handle opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub delimiter: u8,
    pub quote: u8,
    pub terminator: LineDelimiter,
    pub field_size_limit: Option<usize>,
}

impl CsvOptions {
    pub fn with_separator(mut self, separator: char) -> Self {
        self.field_separator = separator;
        self
    }

    pub fn with_quote(mut self, quote: char) -> Self {
        self.quote_character = quote;
        self
    }

    pub fn with_line_delimiter(mut self, line_delimiter: LineDelimiter) -> Self {
        self.line_delimiter = line_delimiter;
        self
    }

    pub fn with_field_size_limit(mut self, limit: Option<usize>) -> Self {
        self.field_size_limit = limit;
        self
    }

    /// Load options from a JSON dialect file.
    ///
    /// # Errors
    ///
    /// - `CsvCodecError::Io` if the file cannot be opened
    /// - `CsvCodecError::Json` if the JSON is invalid
    /// - `CsvCodecError::Configuration` if the dialect is unusable
    pub fn from_json_file(path: &Path) -> Result<Self, CsvCodecError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let options: CsvOptions = serde_json::from_reader(reader)?;
        options.dialect()?;
        Ok(options)
    }

    /// Validate the options into a [`Dialect`].
    ///
    /// The separator and quote must be distinct single-byte ASCII characters
    /// and neither may be a line terminator.
    pub fn dialect(&self) -> Result<Dialect, CsvCodecError> {
        let delimiter = single_byte("field_separator", self.field_separator)?;
        let quote = single_byte("quote_character", self.quote_character)?;
        if delimiter == quote {
            return Err(CsvCodecError::Configuration(format!(
                "field_separator and quote_character are both {:?}",
                self.field_separator
            )));
        }
        if self.field_size_limit == Some(0) {
            return Err(CsvCodecError::Configuration(
                "field_size_limit must be positive".to_string(),
            ));
        }
        Ok(Dialect {
            delimiter,
            quote,
            terminator: self.line_delimiter,
            field_size_limit: self.field_size_limit,
        })
    }
}

fn single_byte(option: &str, c: char) -> Result<u8, CsvCodecError> {
    if !c.is_ascii() {
        return Err(CsvCodecError::Configuration(format!(
            "{} must be a single-byte ASCII character, got {:?}",
            option, c
        )));
    }
    if c == '\n' || c == '\r' {
        return Err(CsvCodecError::Configuration(format!(
            "{} cannot be a line terminator",
            option
        )));
    }
    Ok(c as u8)
}

impl Dialect {
    pub(crate) fn terminator(&self) -> csv::Terminator {
        match self.terminator {
            LineDelimiter::Lf => csv::Terminator::Any(b'\n'),
            LineDelimiter::Crlf => csv::Terminator::CRLF,
        }
    }
}
