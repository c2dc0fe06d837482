//! CSV Table Codec - Read, check and rewrite CSV tables
//!
//! This CLI tool provides three operational modes:
//! - **Recode**: Stream an input CSV file to an output CSV in another dialect
//! - **Headers**: Print the header row of a CSV file
//! - **Check**: Validate the header row and decode every data row
//!
//! # Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 1 | Configuration/argument error |
//! | 3 | File I/O error or malformed CSV |
//! | 4 | Header mismatch or undecodable row |
//!
//! Set `RUST_LOG=debug` to see codec and handle diagnostics on stderr.

use clap::Parser;
use std::fs::File;
use std::io::{self, Write};
use std::process::ExitCode;

use csv_table_codec::cli::{Args, Mode};
use csv_table_codec::codec::{build_codec, FieldSpec};
use csv_table_codec::error::CsvCodecError;
use csv_table_codec::stream::{RowReader, RowWriter};
use csv_table_codec::{transport, typed};

/// Exit code for success
const EXIT_SUCCESS: u8 = 0;
/// Exit code for configuration/argument errors
const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code for file I/O errors and malformed input
const EXIT_IO_ERROR: u8 = 3;
/// Exit code for data that does not match the expected table
const EXIT_DATA_ERROR: u8 = 4;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = args.validate() {
        eprintln!("Error: Configuration error: {}", e);
        eprintln!("  Hint: Use --help for usage information");
        return ExitCode::from(EXIT_CONFIG_ERROR);
    }

    let result = match args.mode {
        Mode::Recode => run_recode_mode(&args),
        Mode::Headers => run_headers_mode(&args),
        Mode::Check => run_check_mode(&args),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(error_to_exit_code(&e))
        }
    }
}

/// Rewrites every row of the input in the output dialect.
fn run_recode_mode(args: &Args) -> Result<(), CsvCodecError> {
    let input_options = args.input_options()?;
    let output_options = args.output_options()?;

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };

    let mut reader = RowReader::from_path(&args.file, &input_options)?;
    let mut writer = RowWriter::open(sink, &output_options)?;

    for row in transport::read_all(&mut reader) {
        writer.write_row(&row?)?;
    }
    writer.close()?;
    reader.close();

    eprintln!(
        "Recoded {} rows from {:?}",
        writer.rows_written(),
        args.file
    );
    Ok(())
}

/// Prints the first row of the input in the input dialect.
fn run_headers_mode(args: &Args) -> Result<(), CsvCodecError> {
    let options = args.input_options()?;
    let mut reader = RowReader::from_path(&args.file, &options)?;

    match reader.read_row()? {
        Some(headers) => {
            let mut writer = RowWriter::open(io::stdout().lock(), &options)?;
            writer.write_row(&headers)?;
            writer.close()?;
        }
        None => eprintln!("{:?} is empty", args.file),
    }
    reader.close();
    Ok(())
}

/// Validates the header row against `--expect` and decodes every data row.
fn run_check_mode(args: &Args) -> Result<(), CsvCodecError> {
    let options = args.input_options()?;
    let codec = build_codec(args.expect.iter().map(FieldSpec::text))?;
    let mut reader = RowReader::from_path(&args.file, &options)?;

    let mut rows = 0u64;
    for value in typed::read_all(&mut reader, &codec)? {
        value?;
        rows += 1;
    }
    reader.close();

    println!("{}: header ok, {} data rows", args.file.display(), rows);
    Ok(())
}

/// Map an error to the process exit code.
fn error_to_exit_code(error: &CsvCodecError) -> u8 {
    match error {
        CsvCodecError::Configuration(_) => EXIT_CONFIG_ERROR,
        CsvCodecError::HeaderMismatch { .. }
        | CsvCodecError::FieldCount { .. }
        | CsvCodecError::MissingField { .. }
        | CsvCodecError::Encode { .. }
        | CsvCodecError::Decode { .. } => EXIT_DATA_ERROR,
        CsvCodecError::MalformedRow { .. }
        | CsvCodecError::FieldTooLarge { .. }
        | CsvCodecError::Closed
        | CsvCodecError::Csv(_)
        | CsvCodecError::Io(_)
        | CsvCodecError::Json(_) => EXIT_IO_ERROR,
    }
}
