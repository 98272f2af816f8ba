//! Exact-shape validation of request payloads.
//!
//! Every handler owns a small schema (field name → expected primitive type)
//! and runs its payload through [`validate`] before touching storage. The
//! check is strict: missing fields, extra fields, and mistyped fields are
//! all rejected as `invalid-argument`.

use serde_json::{Map, Value};

use crate::errors::AppError;

/// Expected primitive type of a payload field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
}

impl FieldType {
    fn matches(self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
        }
    }
}

/// A handler's expected payload shape.
pub type Schema = [(&'static str, FieldType)];

/// Check `payload` against `schema`: the key counts must match, and every
/// payload key must name a schema entry of the matching primitive type.
/// Together the two checks reject mismatched keysets, since an unknown key
/// has no schema entry.
pub fn validate(payload: &Map<String, Value>, schema: &Schema) -> Result<(), AppError> {
    if payload.len() != schema.len() {
        return Err(AppError::invalid_argument(
            "payload contains an invalid number of fields",
        ));
    }

    for (key, value) in payload {
        let expected = schema.iter().find(|(name, _)| *name == key.as_str());
        match expected {
            Some((_, field_type)) if field_type.matches(value) => {}
            _ => {
                return Err(AppError::invalid_argument(
                    "payload contains invalid fields",
                ));
            }
        }
    }

    Ok(())
}

/// The request body must be a JSON object to be validated at all.
pub fn as_object(body: &Value) -> Result<&Map<String, Value>, AppError> {
    body.as_object()
        .ok_or_else(|| AppError::invalid_argument("payload must be a JSON object"))
}

/// Read a string field out of a payload that already passed [`validate`].
pub fn str_field<'a>(payload: &'a Map<String, Value>, key: &str) -> Result<&'a str, AppError> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::invalid_argument(format!("field `{key}` must be a string")))
}
