//! CLI argument parsing module
//!
//! Handles command-line argument parsing using `clap` derive macros.
//! This module defines the `Mode` enum for operation modes and the `Args` struct
//! containing all CLI arguments with validation logic.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::error::CsvCodecError;
use crate::options::{CsvOptions, LineDelimiter};

/// Operation mode for the CSV table codec tool.
///
/// - **Recode**: Stream an input CSV to an output CSV in another dialect
/// - **Headers**: Print the header row of a CSV file
/// - **Check**: Validate the header row and decode every data row
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Rewrite a CSV file in another dialect
    Recode,
    /// Print the header row
    Headers,
    /// Validate the header row against --expect and decode every row
    Check,
}

/// Command-line arguments for the CSV table codec tool.
///
/// Use the `validate()` method after parsing to ensure argument combinations
/// are valid.
///
/// # Example
///
/// ```rust,ignore
/// use clap::Parser;
/// use csv_table_codec::cli::Args;
///
/// let args = Args::parse();
/// args.validate()?;
/// ```
#[derive(Parser, Debug)]
#[command(name = "csv-table-codec")]
#[command(about = "Read, check and rewrite CSV tables")]
#[command(version)]
pub struct Args {
    /// Operation mode: recode, headers, or check
    #[arg(long, value_enum)]
    pub mode: Mode,

    /// Input CSV file
    #[arg(long)]
    pub file: PathBuf,

    /// Output CSV file for recode mode (stdout when omitted)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Expected header row for check mode, comma separated
    #[arg(long, value_delimiter = ',')]
    pub expect: Vec<String>,

    /// JSON dialect file for the input
    #[arg(long)]
    pub dialect: Option<PathBuf>,

    /// Input field separator
    #[arg(long)]
    pub separator: Option<char>,

    /// Input quote character
    #[arg(long)]
    pub quote: Option<char>,

    /// Input line delimiter
    #[arg(long, value_enum)]
    pub line_delimiter: Option<LineDelimiter>,

    /// Largest accepted input cell, in bytes
    #[arg(long)]
    pub field_size_limit: Option<usize>,

    /// JSON dialect file for the output (defaults to the input dialect)
    #[arg(long)]
    pub output_dialect: Option<PathBuf>,

    /// Output field separator
    #[arg(long)]
    pub output_separator: Option<char>,

    /// Output quote character
    #[arg(long)]
    pub output_quote: Option<char>,

    /// Output line delimiter
    #[arg(long, value_enum)]
    pub output_line_delimiter: Option<LineDelimiter>,
}

impl Args {
    /// Validate argument combinations.
    ///
    /// - `--expect` is required for check mode and only valid there
    /// - `--output` and the `--output-*` dialect flags only apply to recode mode
    /// - `--field-size-limit` must be positive
    ///
    /// Dialect characters themselves are checked when the options are turned
    /// into handles.
    pub fn validate(&self) -> Result<(), String> {
        if self.field_size_limit == Some(0) {
            return Err("--field-size-limit must be greater than 0".to_string());
        }

        match self.mode {
            Mode::Check => {
                if self.expect.is_empty() {
                    return Err("--expect is required for check mode".to_string());
                }
                if let Some(pos) = self.expect.iter().position(|h| h.is_empty()) {
                    return Err(format!("--expect has an empty header at position {}", pos));
                }
            }
            Mode::Recode | Mode::Headers => {
                if !self.expect.is_empty() {
                    return Err("--expect is only valid in check mode".to_string());
                }
            }
        }

        if self.mode != Mode::Recode && self.has_output_flags() {
            return Err("--output options are only valid in recode mode".to_string());
        }

        Ok(())
    }

    fn has_output_flags(&self) -> bool {
        self.output.is_some()
            || self.output_dialect.is_some()
            || self.output_separator.is_some()
            || self.output_quote.is_some()
            || self.output_line_delimiter.is_some()
    }

    /// Options for reading the input: the `--dialect` file (or defaults)
    /// with individual flags applied on top.
    pub fn input_options(&self) -> Result<CsvOptions, CsvCodecError> {
        let mut options = match &self.dialect {
            Some(path) => CsvOptions::from_json_file(path)?,
            None => CsvOptions::default(),
        };
        apply(
            &mut options,
            self.separator,
            self.quote,
            self.line_delimiter,
        );
        if let Some(limit) = self.field_size_limit {
            options.field_size_limit = Some(limit);
        }
        Ok(options)
    }

    /// Options for writing the output: the `--output-dialect` file, or the
    /// input options when absent, with `--output-*` flags applied on top.
    pub fn output_options(&self) -> Result<CsvOptions, CsvCodecError> {
        let mut options = match &self.output_dialect {
            Some(path) => CsvOptions::from_json_file(path)?,
            None => self.input_options()?,
        };
        apply(
            &mut options,
            self.output_separator,
            self.output_quote,
            self.output_line_delimiter,
        );
        Ok(options)
    }
}

fn apply(
    options: &mut CsvOptions,
    separator: Option<char>,
    quote: Option<char>,
    line_delimiter: Option<LineDelimiter>,
) {
    if let Some(c) = separator {
        options.field_separator = c;
    }
    if let Some(c) = quote {
        options.quote_character = c;
    }
    if let Some(d) = line_delimiter {
        options.line_delimiter = d;
    }
}
