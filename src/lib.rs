//! CSV Table Codec Library
//!
//! Streaming conversion between CSV files and structured values.
//! It includes modules for row-level reading and writing, untyped bulk
//! transport, declarative table codecs for open mappings and closed records,
//! and typed transport with header validation.
//!
//! # Example
//!
//! ```
//! use csv_table_codec::codec::{build_codec, FieldSpec};
//! use csv_table_codec::options::CsvOptions;
//! use csv_table_codec::stream::{with_reader, with_writer};
//! use csv_table_codec::typed;
//! use serde_json::{json, Map, Value};
//!
//! let codec = build_codec(vec![
//!     FieldSpec::text("date"),
//!     FieldSpec::text("kind"),
//!     FieldSpec::text("count"),
//! ])
//! .unwrap();
//! let sighting: Map<String, Value> = json!({"date": "2021-11-13", "kind": "cats", "count": "2"})
//!     .as_object()
//!     .unwrap()
//!     .clone();
//!
//! let mut bytes = Vec::new();
//! with_writer(&mut bytes, &CsvOptions::default(), |w| {
//!     typed::write_all(w, &codec, [&sighting])
//! })
//! .unwrap();
//! assert_eq!(bytes, b"date,kind,count\n2021-11-13,cats,2\n");
//!
//! let values = with_reader(&bytes[..], &CsvOptions::default(), |r| {
//!     typed::read_all_eager(r, &codec)
//! })
//! .unwrap();
//! assert_eq!(values, vec![sighting]);
//! ```

pub mod cli;
pub mod codec;
pub mod error;
pub mod options;
pub mod stream;
pub mod transport;
pub mod typed;

pub use codec::{build_codec, build_record_codec, FieldSpec, RecordType, RecordValue, TableCodec};
pub use error::CsvCodecError;
pub use options::{CsvOptions, LineDelimiter};
pub use stream::{Row, RowReader, RowWriter};
