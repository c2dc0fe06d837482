//! Closed record types.
//!
//! A [`RecordType`] is a runtime-declared record with a fixed, ordered set of
//! named fields; a [`RecordValue`] is an instance built positionally from one
//! value per field.
//!
//! Record values expose a few intrinsic accessors regardless of their declared
//! fields (`len`, `type_name`, ...). [`RecordValue::attr`] resolves those
//! before declared fields, the way attribute lookup on a record does, so a
//! field named `len` cannot be read through `attr`. [`RESERVED_NAMES`] lists
//! exactly those accessors; a codec reads fields with a reserved name through
//! the keyed [`RecordValue::get`] instead.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::CsvCodecError;

/// Intrinsic accessor names of [`RecordValue`] that shadow declared fields
/// in [`RecordValue::attr`]. Sorted.
pub const RESERVED_NAMES: &[&str] = &[
    "field_names",
    "is_empty",
    "len",
    "to_map",
    "type_name",
    "values",
];

/// Whether `name` collides with an intrinsic record accessor.
pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.binary_search(&name).is_ok()
}

/// A named record type with fields in constructor order.
#[derive(Debug, PartialEq, Eq)]
pub struct RecordType {
    name: String,
    fields: Vec<String>,
    index: HashMap<String, usize>,
}

impl RecordType {
    /// Declares a record type.
    ///
    /// # Errors
    ///
    /// `CsvCodecError::Configuration` if `fields` is empty or repeats a name.
    pub fn new<I, S>(name: impl Into<String>, fields: I) -> Result<Arc<Self>, CsvCodecError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            return Err(CsvCodecError::Configuration(format!(
                "record type '{}' has no fields",
                name
            )));
        }

        let mut index = HashMap::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            if index.insert(field.clone(), i).is_some() {
                return Err(CsvCodecError::Configuration(format!(
                    "record type '{}' declares field '{}' twice",
                    name, field
                )));
            }
        }

        Ok(Arc::new(Self {
            name,
            fields,
            index,
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_names(&self) -> &[String] {
        &self.fields
    }

    pub fn position(&self, field: &str) -> Option<usize> {
        self.index.get(field).copied()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// An instance of a [`RecordType`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordValue {
    ty: Arc<RecordType>,
    values: Vec<Value>,
}

impl RecordValue {
    /// Builds a record from one value per field, in constructor order.
    ///
    /// # Errors
    ///
    /// `CsvCodecError::FieldCount` if `values` does not match the field count.
    pub fn new(ty: &Arc<RecordType>, values: Vec<Value>) -> Result<Self, CsvCodecError> {
        if values.len() != ty.len() {
            return Err(CsvCodecError::FieldCount {
                line: None,
                expected: ty.len(),
                actual: values.len(),
            });
        }
        Ok(Self {
            ty: Arc::clone(ty),
            values,
        })
    }

    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.ty
    }

    /// Keyed lookup of a declared field. Never returns an intrinsic.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.ty.position(field).and_then(|i| self.values.get(i))
    }

    /// Positional access in constructor order.
    pub fn slot(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Attribute lookup: intrinsic accessors first, then declared fields.
    pub fn attr(&self, name: &str) -> Option<Value> {
        match name {
            "field_names" => Some(Value::Array(
                self.field_names().iter().cloned().map(Value::String).collect(),
            )),
            "is_empty" => Some(Value::Bool(self.is_empty())),
            "len" => Some(Value::from(self.len())),
            "to_map" => Some(Value::Object(self.to_map())),
            "type_name" => Some(Value::String(self.type_name().to_string())),
            "values" => Some(Value::Array(self.values.clone())),
            _ => self.get(name).cloned(),
        }
    }

    pub fn type_name(&self) -> &str {
        self.ty.name()
    }

    pub fn field_names(&self) -> &[String] {
        self.ty.field_names()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Field name to value, in constructor order.
    pub fn to_map(&self) -> Map<String, Value> {
        self.ty
            .field_names()
            .iter()
            .cloned()
            .zip(self.values.iter().cloned())
            .collect()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}
