//! Ready-made field transforms.
//!
//! Each function returns a [`FieldSpec`] whose encode and decode transforms
//! are inverses over the values they accept: `decode(encode(x)) == x` for
//! every `x` the decode side produces.

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Number, Value};

use super::field::{FieldError, FieldSpec};

/// Timestamp text form: ISO 8601, millisecond precision, UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

fn expected(kind: &str, value: &Value) -> FieldError {
    FieldError::new(format!("expected {}, got {}", kind, value))
}

fn as_text<'v>(kind: &str, value: &'v Value) -> Result<&'v str, FieldError> {
    value.as_str().ok_or_else(|| expected(kind, value))
}

/// Signed or unsigned 64-bit integers.
pub fn integer(name: impl Into<String>) -> FieldSpec {
    FieldSpec::custom(
        name,
        |value| match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
            other => Err(expected("an integer", other)),
        },
        |cell| {
            let cell = cell.trim();
            match cell.parse::<i64>() {
                Ok(n) => Ok(Value::from(n)),
                Err(_) => Ok(Value::from(cell.parse::<u64>()?)),
            }
        },
    )
}

/// Finite 64-bit floats.
pub fn float(name: impl Into<String>) -> FieldSpec {
    FieldSpec::custom(
        name,
        |value| match value {
            Value::Number(n) => Ok(n.to_string()),
            other => Err(expected("a number", other)),
        },
        |cell| {
            let parsed = cell.trim().parse::<f64>()?;
            Number::from_f64(parsed)
                .map(Value::Number)
                .ok_or_else(|| FieldError::new(format!("{} is not finite", parsed)))
        },
    )
}

/// `true` / `false`.
pub fn boolean(name: impl Into<String>) -> FieldSpec {
    FieldSpec::custom(
        name,
        |value| match value {
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(expected("a boolean", other)),
        },
        |cell| Ok(Value::Bool(cell.trim().parse::<bool>()?)),
    )
}

/// Any JSON document, stored as compact JSON text.
pub fn json(name: impl Into<String>) -> FieldSpec {
    FieldSpec::custom(
        name,
        |value| Ok(serde_json::to_string(value)?),
        |cell| Ok(serde_json::from_str(cell)?),
    )
}

/// Calendar dates in `format` (a `chrono` format string). Values are date
/// strings normalised to `format`.
pub fn date(name: impl Into<String>, format: &str) -> FieldSpec {
    let encode_format = format.to_string();
    let decode_format = format.to_string();
    FieldSpec::custom(
        name,
        move |value| {
            let text = as_text("a date string", value)?;
            let date = NaiveDate::parse_from_str(text, &encode_format)?;
            Ok(date.format(&encode_format).to_string())
        },
        move |cell| {
            let date = NaiveDate::parse_from_str(cell.trim(), &decode_format)?;
            Ok(Value::String(date.format(&decode_format).to_string()))
        },
    )
}

/// UTC timestamps. Accepts RFC 3339 or [`TIMESTAMP_FORMAT`] text; values are
/// strings in [`TIMESTAMP_FORMAT`].
pub fn timestamp(name: impl Into<String>) -> FieldSpec {
    FieldSpec::custom(
        name,
        |value| {
            let parsed = parse_timestamp(as_text("a timestamp string", value)?)?;
            Ok(parsed.format(TIMESTAMP_FORMAT).to_string())
        },
        |cell| {
            let parsed = parse_timestamp(cell.trim())?;
            Ok(Value::String(parsed.format(TIMESTAMP_FORMAT).to_string()))
        },
    )
}

fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, FieldError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .map_err(|e| FieldError::new(format!("invalid timestamp '{}': {}", text, e)))?;
    Ok(naive.and_utc())
}

/// Text stored base64 encoded (standard alphabet, padded). Values are the
/// decoded UTF-8 strings.
pub fn base64(name: impl Into<String>) -> FieldSpec {
    FieldSpec::custom(
        name,
        |value| Ok(BASE64_STANDARD.encode(as_text("a string", value)?)),
        |cell| {
            let bytes = BASE64_STANDARD.decode(cell.trim())?;
            Ok(Value::String(String::from_utf8(bytes)?))
        },
    )
}
