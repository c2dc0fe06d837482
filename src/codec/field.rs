//! Field specifications.
//!
//! A [`FieldSpec`] names one column and carries its outbound (encode) and
//! inbound (decode) transforms. Transforms are a tagged [`Transform`] so the
//! pass-through case is a match arm rather than a call through a function
//! pointer; the codec applies transforms once per field per row.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Outbound transform: field value to cell text.
pub type EncodeFn = dyn Fn(&Value) -> Result<String, FieldError> + Send + Sync;

/// Inbound transform: cell text to field value.
pub type DecodeFn = dyn Fn(&str) -> Result<Value, FieldError> + Send + Sync;

/// A field transform: pass-through, or a user function.
pub enum Transform<F: ?Sized> {
    Identity,
    Custom(Arc<F>),
}

impl<F: ?Sized> Transform<F> {
    pub fn is_identity(&self) -> bool {
        matches!(self, Transform::Identity)
    }
}

impl<F: ?Sized> Clone for Transform<F> {
    fn clone(&self) -> Self {
        match self {
            Transform::Identity => Transform::Identity,
            Transform::Custom(f) => Transform::Custom(Arc::clone(f)),
        }
    }
}

impl<F: ?Sized> fmt::Debug for Transform<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Identity => write!(f, "Identity"),
            Transform::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Error returned by a user transform.
///
/// The codec wraps it into [`CsvCodecError::Encode`] or
/// [`CsvCodecError::Decode`] with the field name attached.
///
/// [`CsvCodecError::Encode`]: crate::error::CsvCodecError::Encode
/// [`CsvCodecError::Decode`]: crate::error::CsvCodecError::Decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    message: String,
}

impl FieldError {
    pub fn new(message: impl fmt::Display) -> Self {
        Self {
            message: message.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FieldError {}

macro_rules! field_error_from {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for FieldError {
                fn from(err: $source) -> Self {
                    FieldError::new(err)
                }
            }
        )*
    };
}

field_error_from!(
    std::num::ParseIntError,
    std::num::ParseFloatError,
    std::str::ParseBoolError,
    std::string::FromUtf8Error,
    serde_json::Error,
    chrono::ParseError,
    base64::DecodeError,
);

/// One column of a table codec.
///
/// # Example
///
/// ```
/// use csv_table_codec::codec::{FieldError, FieldSpec};
/// use serde_json::Value;
///
/// let name = FieldSpec::text("name");
/// let shouted = FieldSpec::text("shout")
///     .encode_with(|v| Ok(v.as_str().unwrap_or_default().to_uppercase()))
///     .decode_with(|cell| Ok(Value::String(cell.to_lowercase())));
/// assert!(name.encode().is_identity());
/// assert!(!shouted.decode().is_identity());
/// ```
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    encode: Transform<EncodeFn>,
    decode: Transform<DecodeFn>,
}

impl FieldSpec {
    pub fn new(
        name: impl Into<String>,
        encode: Transform<EncodeFn>,
        decode: Transform<DecodeFn>,
    ) -> Self {
        Self {
            name: name.into(),
            encode,
            decode,
        }
    }

    /// A field passed through unchanged in both directions.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, Transform::Identity, Transform::Identity)
    }

    /// A field with both transforms supplied.
    pub fn custom<E, D>(name: impl Into<String>, encode: E, decode: D) -> Self
    where
        E: Fn(&Value) -> Result<String, FieldError> + Send + Sync + 'static,
        D: Fn(&str) -> Result<Value, FieldError> + Send + Sync + 'static,
    {
        Self::new(
            name,
            Transform::Custom(Arc::new(encode)),
            Transform::Custom(Arc::new(decode)),
        )
    }

    pub fn encode_with<E>(mut self, encode: E) -> Self
    where
        E: Fn(&Value) -> Result<String, FieldError> + Send + Sync + 'static,
    {
        self.encode = Transform::Custom(Arc::new(encode));
        self
    }

    pub fn decode_with<D>(mut self, decode: D) -> Self
    where
        D: Fn(&str) -> Result<Value, FieldError> + Send + Sync + 'static,
    {
        self.decode = Transform::Custom(Arc::new(decode));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn encode(&self) -> &Transform<EncodeFn> {
        &self.encode
    }

    pub fn decode(&self) -> &Transform<DecodeFn> {
        &self.decode
    }

    #[inline]
    pub(crate) fn apply_encode(&self, value: &Value) -> Result<String, FieldError> {
        match &self.encode {
            Transform::Identity => Ok(identity_text(value)),
            Transform::Custom(f) => f(value),
        }
    }

    #[inline]
    pub(crate) fn apply_decode(&self, cell: &str) -> Result<Value, FieldError> {
        match &self.decode {
            Transform::Identity => Ok(Value::String(cell.to_owned())),
            Transform::Custom(f) => f(cell),
        }
    }
}

/// Pass-through rendering: strings as-is, null as empty, anything else as
/// its JSON text.
fn identity_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
