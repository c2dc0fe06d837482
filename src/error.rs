//! Error module
//!
//! Defines the error type shared by the row streams, the table codec and both
//! transports. Every failure surfaces to the immediate caller; nothing in the
//! crate retries or swallows an error.

use thiserror::Error;

/// The main error type for the CSV table codec.
///
/// # Error Categories
///
/// - **Input errors**: rows the tokenizer cannot resolve (`MalformedRow`), a
///   header row that differs from the codec (`HeaderMismatch`), rows of the
///   wrong width (`FieldCount`) and oversized cells (`FieldTooLarge`)
/// - **Transform errors**: a field's encode or decode transform rejected a
///   value (`Encode`, `Decode`, `MissingField`)
/// - **Configuration errors**: invalid dialects and invalid codec declarations
/// - **Resource errors**: I/O failures and use of a released handle
///
/// # Example
///
/// ```rust,ignore
/// use csv_table_codec::error::CsvCodecError;
///
/// fn example() -> Result<(), CsvCodecError> {
///     // Errors from underlying types are automatically converted
///     let file = std::fs::File::open("nonexistent.csv")?;
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum CsvCodecError {
    /// The tokenizer could not resolve quoting or encoding for a row.
    ///
    /// `raw` holds the offending input text when it could be recovered.
    #[error("Malformed row at line {line}: {reason}{}", raw_suffix(.raw))]
    MalformedRow {
        line: u64,
        raw: Option<String>,
        reason: String,
    },

    /// The first row of a typed read did not equal the codec headers.
    ///
    /// Fatal to the read session. An input with no rows at all reports an
    /// empty `actual` sequence.
    #[error("Header mismatch: expected {expected:?}, found {actual:?}")]
    HeaderMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    /// Invalid dialect options or an invalid codec declaration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A data row whose width differs from the codec width.
    #[error("{}Expected {expected} fields but got {actual}", line_prefix(.line))]
    FieldCount {
        line: Option<u64>,
        expected: usize,
        actual: usize,
    },

    /// A declared field could not be found on the value being encoded.
    #[error("Missing field '{field}'")]
    MissingField { field: String },

    /// A field's encode transform rejected its value.
    #[error("Cannot encode field '{field}': {message}")]
    Encode { field: String, message: String },

    /// A field's decode transform rejected its cell.
    #[error("{}Cannot decode field '{field}' from {cell:?}: {message}", line_prefix(.line))]
    Decode {
        field: String,
        line: Option<u64>,
        cell: String,
        message: String,
    },

    /// A cell exceeded the configured field size limit.
    #[error("Line {line}: Field {field_index} exceeds size limit of {limit} bytes (actual: {actual} bytes)")]
    FieldTooLarge {
        line: u64,
        field_index: usize,
        limit: usize,
        actual: usize,
    },

    /// A reader or writer was used after it was released.
    #[error("Handle already closed")]
    Closed,

    /// CSV formatting error from the write path.
    ///
    /// `csv::Error` already prefixes its message with "CSV error".
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// General I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error while loading dialect options.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CsvCodecError {
    /// Attaches an input line number to errors raised without one.
    pub(crate) fn at_line(self, at: u64) -> Self {
        match self {
            CsvCodecError::FieldCount {
                line: None,
                expected,
                actual,
            } => CsvCodecError::FieldCount {
                line: Some(at),
                expected,
                actual,
            },
            CsvCodecError::Decode {
                field,
                line: None,
                cell,
                message,
            } => CsvCodecError::Decode {
                field,
                line: Some(at),
                cell,
                message,
            },
            other => other,
        }
    }
}

fn raw_suffix(raw: &Option<String>) -> String {
    match raw {
        Some(text) => format!(" (raw: {:?})", text),
        None => String::new(),
    }
}

fn line_prefix(line: &Option<u64>) -> String {
    match line {
        Some(line) => format!("Line {}: ", line),
        None => String::new(),
    }
}
