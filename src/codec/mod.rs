//! Table codec module
//!
//! Declarative bidirectional mapping between structured values and rows of
//! text cells.

pub mod field;
pub mod record;
mod table;
pub mod target;
pub mod transforms;

pub use field::{DecodeFn, EncodeFn, FieldError, FieldSpec, Transform};
pub use record::{is_reserved, RecordType, RecordValue, RESERVED_NAMES};
pub use table::{build_codec, build_record_codec, TableCodec};
pub use target::{Access, ClosedRecord, OpenMapping, StructuredTarget};
