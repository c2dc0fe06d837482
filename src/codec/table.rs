use std::sync::Arc;

use serde_json::Value;

use super::field::FieldSpec;
use super::record::RecordType;
use super::target::{Access, ClosedRecord, OpenMapping, StructuredTarget};
use crate::error::CsvCodecError;
use crate::stream::Row;

/// Bidirectional mapping between a structured value and a [`Row`].
///
/// Built once from an ordered, non-empty list of [`FieldSpec`]s. The
/// declaration order fixes the header sequence, the cell order produced by
/// [`encode`](Self::encode) and the positions [`decode`](Self::decode) reads.
/// Headers and field access paths are computed at construction and never per
/// row.
///
/// # Example
///
/// ```
/// use csv_table_codec::codec::{build_codec, transforms, FieldSpec};
/// use serde_json::json;
///
/// let codec = build_codec(vec![
///     FieldSpec::text("kind"),
///     transforms::integer("count"),
/// ])
/// .unwrap();
/// assert_eq!(codec.headers(), ["kind", "count"]);
///
/// let value = codec.decode(&["cats", "2"]).unwrap();
/// assert_eq!(value["count"], json!(2));
/// assert_eq!(codec.encode(&value).unwrap(), ["cats", "2"]);
/// ```
#[derive(Debug, Clone)]
pub struct TableCodec<T: StructuredTarget> {
    target: T,
    fields: Vec<FieldSpec>,
    access: Vec<Access>,
    headers: Vec<String>,
}

impl<T: StructuredTarget> TableCodec<T> {
    /// Builds a codec for `target`.
    ///
    /// # Errors
    ///
    /// `CsvCodecError::Configuration` if there are no fields, a field name
    /// repeats, or the target rejects the declared layout.
    pub fn new<I>(target: T, fields: I) -> Result<Self, CsvCodecError>
    where
        I: IntoIterator<Item = FieldSpec>,
    {
        let fields: Vec<FieldSpec> = fields.into_iter().collect();
        if fields.is_empty() {
            return Err(CsvCodecError::Configuration(
                "a table codec needs at least one field".to_string(),
            ));
        }

        let headers: Vec<String> = fields.iter().map(|f| f.name().to_string()).collect();
        for (i, name) in headers.iter().enumerate() {
            if headers[..i].contains(name) {
                return Err(CsvCodecError::Configuration(format!(
                    "field '{}' is declared twice",
                    name
                )));
            }
        }

        target.check_layout(&headers)?;
        let access = headers
            .iter()
            .map(|name| target.resolve(name))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            width = headers.len(),
            keyed = access.iter().filter(|a| matches!(a, Access::Key(_))).count(),
            identity_encodes = fields.iter().filter(|f| f.encode().is_identity()).count(),
            identity_decodes = fields.iter().filter(|f| f.decode().is_identity()).count(),
            "table codec built"
        );

        Ok(Self {
            target,
            fields,
            access,
            headers,
        })
    }

    /// Field names in declaration order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of fields, and so of cells per row.
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    /// Encodes `value` into a new row.
    pub fn encode(&self, value: &T::Value) -> Result<Row, CsvCodecError> {
        let mut row = Vec::with_capacity(self.width());
        self.encode_into(value, &mut row)?;
        Ok(row)
    }

    /// Encodes `value` into `row`, replacing its contents.
    ///
    /// The target checks `value` once before any field is read. On error
    /// `row` holds the cells encoded before the failing field.
    pub fn encode_into(&self, value: &T::Value, row: &mut Row) -> Result<(), CsvCodecError> {
        row.clear();
        self.target.accepts(value)?;
        for (field, access) in self.fields.iter().zip(&self.access) {
            let cell = self.target.read(value, field.name(), access)?;
            let text = field
                .apply_encode(cell)
                .map_err(|e| CsvCodecError::Encode {
                    field: field.name().to_string(),
                    message: e.to_string(),
                })?;
            row.push(text);
        }
        Ok(())
    }

    /// Decodes one row into a fresh value.
    ///
    /// # Errors
    ///
    /// - `CsvCodecError::FieldCount` if the row width differs from the codec
    /// - `CsvCodecError::Decode` if a decode transform rejects its cell
    pub fn decode<S: AsRef<str>>(&self, row: &[S]) -> Result<T::Value, CsvCodecError> {
        if row.len() != self.width() {
            return Err(CsvCodecError::FieldCount {
                line: None,
                expected: self.width(),
                actual: row.len(),
            });
        }

        let mut values: Vec<Value> = Vec::with_capacity(self.width());
        for (field, cell) in self.fields.iter().zip(row) {
            let cell = cell.as_ref();
            let value = field
                .apply_decode(cell)
                .map_err(|e| CsvCodecError::Decode {
                    field: field.name().to_string(),
                    line: None,
                    cell: cell.to_string(),
                    message: e.to_string(),
                })?;
            values.push(value);
        }
        self.target.assemble(&self.headers, values)
    }
}

/// Builds a codec whose structured values are open mappings.
pub fn build_codec<I>(fields: I) -> Result<TableCodec<OpenMapping>, CsvCodecError>
where
    I: IntoIterator<Item = FieldSpec>,
{
    TableCodec::new(OpenMapping, fields)
}

/// Builds a codec whose structured values are records of `record_type`.
///
/// Fields must be declared in the record type's constructor order.
pub fn build_record_codec<I>(
    record_type: &Arc<RecordType>,
    fields: I,
) -> Result<TableCodec<ClosedRecord>, CsvCodecError>
where
    I: IntoIterator<Item = FieldSpec>,
{
    TableCodec::new(ClosedRecord::new(Arc::clone(record_type)), fields)
}
