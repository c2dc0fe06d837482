//! Structured targets.
//!
//! A [`StructuredTarget`] tells a [`TableCodec`](super::TableCodec) how to
//! read a named field out of a structured value and how to assemble a fresh
//! value from decoded fields. The codec is written once against this trait;
//! [`OpenMapping`] and [`ClosedRecord`] differ only in field access.

use serde_json::{Map, Value};
use std::sync::Arc;

use super::record::{is_reserved, RecordType, RecordValue};
use crate::error::CsvCodecError;

/// How a field is read from a value, resolved once per field when a codec is
/// built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Generic keyed lookup by field name.
    Key(String),
    /// Direct positional accessor.
    Slot(usize),
}

/// The structured side of a table codec.
pub trait StructuredTarget {
    /// The structured value rows are converted to and from.
    type Value;

    /// Decides how the field `name` is read.
    fn resolve(&self, name: &str) -> Result<Access, CsvCodecError>;

    /// Checks the declared field order against the target's construction
    /// order.
    ///
    /// `assemble` receives decoded values in declaration order. Targets that
    /// cannot check their constructor leave this as is, and the caller must
    /// declare fields in constructor order.
    fn check_layout(&self, _names: &[String]) -> Result<(), CsvCodecError> {
        Ok(())
    }

    /// Checks once per value, before any field is read, that `value` can be
    /// encoded by this target.
    fn accepts(&self, _value: &Self::Value) -> Result<(), CsvCodecError> {
        Ok(())
    }

    /// Reads the field `name` through `access`.
    fn read<'v>(
        &self,
        value: &'v Self::Value,
        name: &str,
        access: &Access,
    ) -> Result<&'v Value, CsvCodecError>;

    /// Builds a value from decoded fields in declaration order.
    fn assemble(&self, names: &[String], values: Vec<Value>)
        -> Result<Self::Value, CsvCodecError>;
}

/// Open key/value mappings.
///
/// Decoded values are `serde_json::Map`s with keys inserted in declaration
/// order; map equality ignores that order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenMapping;

impl StructuredTarget for OpenMapping {
    type Value = Map<String, Value>;

    fn resolve(&self, name: &str) -> Result<Access, CsvCodecError> {
        Ok(Access::Key(name.to_string()))
    }

    fn read<'v>(
        &self,
        value: &'v Self::Value,
        name: &str,
        access: &Access,
    ) -> Result<&'v Value, CsvCodecError> {
        // Mappings have no positional slots
        let found = match access {
            Access::Key(key) => value.get(key),
            Access::Slot(_) => None,
        };
        found.ok_or_else(|| CsvCodecError::MissingField {
            field: name.to_string(),
        })
    }

    fn assemble(
        &self,
        names: &[String],
        values: Vec<Value>,
    ) -> Result<Self::Value, CsvCodecError> {
        Ok(names.iter().cloned().zip(values).collect())
    }
}

/// Closed records of one [`RecordType`].
///
/// Fields are read through their positional slot, except fields whose name
/// is in [`RESERVED_NAMES`](super::RESERVED_NAMES): those are read with the
/// keyed [`RecordValue::get`], never through attribute-style access, which
/// would silently yield the intrinsic accessor's value instead of the field.
#[derive(Debug, Clone)]
pub struct ClosedRecord {
    record_type: Arc<RecordType>,
}

impl ClosedRecord {
    pub fn new(record_type: Arc<RecordType>) -> Self {
        Self { record_type }
    }

    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.record_type
    }

    fn owns(&self, value: &RecordValue) -> bool {
        let ty = value.record_type();
        Arc::ptr_eq(ty, &self.record_type) || **ty == *self.record_type
    }
}

impl StructuredTarget for ClosedRecord {
    type Value = RecordValue;

    fn resolve(&self, name: &str) -> Result<Access, CsvCodecError> {
        let position = self.record_type.position(name).ok_or_else(|| {
            CsvCodecError::Configuration(format!(
                "record type '{}' has no field '{}'",
                self.record_type.name(),
                name
            ))
        })?;
        if is_reserved(name) {
            Ok(Access::Key(name.to_string()))
        } else {
            Ok(Access::Slot(position))
        }
    }

    fn check_layout(&self, names: &[String]) -> Result<(), CsvCodecError> {
        let expected = self.record_type.field_names();
        if names != expected {
            return Err(CsvCodecError::Configuration(format!(
                "record type '{}' is constructed from {:?} but the codec declares {:?}",
                self.record_type.name(),
                expected,
                names
            )));
        }
        Ok(())
    }

    fn accepts(&self, value: &Self::Value) -> Result<(), CsvCodecError> {
        if self.owns(value) {
            return Ok(());
        }
        Err(CsvCodecError::Encode {
            field: self
                .record_type
                .field_names()
                .first()
                .cloned()
                .unwrap_or_default(),
            message: format!(
                "value of record type '{}' given to a codec for '{}'",
                value.type_name(),
                self.record_type.name()
            ),
        })
    }

    fn read<'v>(
        &self,
        value: &'v Self::Value,
        name: &str,
        access: &Access,
    ) -> Result<&'v Value, CsvCodecError> {
        let found = match access {
            Access::Slot(index) => value.slot(*index),
            Access::Key(key) => value.get(key),
        };
        found.ok_or_else(|| CsvCodecError::MissingField {
            field: name.to_string(),
        })
    }

    fn assemble(
        &self,
        _names: &[String],
        values: Vec<Value>,
    ) -> Result<Self::Value, CsvCodecError> {
        RecordValue::new(&self.record_type, values)
    }
}
