use serde_json::Value;
use thiserror::Error;

use crate::source::{ColumnMetadata, ColumnShape, DEFAULT_LOOKUP_FIELD, Record};

/// Why a column produced no value for a record. A gap is never surfaced to the
/// user; it only truncates the record's branch or omits a tooltip line.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Gap {
    #[error("record has no value for `{0}`")]
    MissingValue(String),
    #[error("`{0}` is empty")]
    EmptyValue(String),
    #[error("`{0}` holds a value that cannot be displayed")]
    UnsupportedValue(String),
    #[error("reference `{0}` was not expanded on the record")]
    MissingSubObject(String),
    #[error("expanded `{column}` has no `{field}` field")]
    MissingField { column: String, field: String },
    #[error("projected column `{column}` has no metadata for base column `{base}`")]
    MissingBaseColumn { column: String, base: String },
    #[error("base column `{base}` of `{column}` is not a reference")]
    BaseNotReference { column: String, base: String },
}

pub type Resolution = Result<String, Gap>;

/// Resolves the display string of `column` for one record.
pub fn resolve(record: &Record, column: &str, metadata: &ColumnMetadata) -> Resolution {
    match metadata.shape(column) {
        ColumnShape::Direct => {
            let value = record
                .get(column)
                .ok_or_else(|| Gap::MissingValue(column.to_owned()))?;
            display_value(column, value)
        }
        ColumnShape::Reference { field, .. } => resolve_reference(record, column, field),
        ColumnShape::Derived { base, field } => {
            let base_descriptor = metadata.get(base).ok_or_else(|| Gap::MissingBaseColumn {
                column: column.to_owned(),
                base: base.to_owned(),
            })?;
            if !base_descriptor.is_reference() {
                return Err(Gap::BaseNotReference {
                    column: column.to_owned(),
                    base: base.to_owned(),
                });
            }

            let field = field
                .or_else(|| base_descriptor.lookup_field())
                .unwrap_or(DEFAULT_LOOKUP_FIELD);
            resolve_reference(record, base, field)
        }
    }
}

/// Same as [`resolve`] with gaps collapsed to an empty string.
pub fn resolve_or_empty(record: &Record, column: &str, metadata: &ColumnMetadata) -> String {
    resolve(record, column, metadata).unwrap_or_default()
}

fn resolve_reference(record: &Record, column: &str, field: &str) -> Resolution {
    let flattened = format!("{column}/{field}");
    if let Some(value) = record.get(&flattened)
        && let Ok(text) = display_value(&flattened, value)
    {
        return Ok(text);
    }

    let expanded = record
        .get(column)
        .and_then(Value::as_object)
        .ok_or_else(|| Gap::MissingSubObject(column.to_owned()))?;
    let value = expanded.get(field).ok_or_else(|| Gap::MissingField {
        column: column.to_owned(),
        field: field.to_owned(),
    })?;

    display_value(&flattened, value)
}

fn display_value(name: &str, value: &Value) -> Resolution {
    let text = match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null => return Err(Gap::MissingValue(name.to_owned())),
        Value::Array(_) | Value::Object(_) => return Err(Gap::UnsupportedValue(name.to_owned())),
    };

    if text.is_empty() {
        Err(Gap::EmptyValue(name.to_owned()))
    } else {
        Ok(text)
    }
}
