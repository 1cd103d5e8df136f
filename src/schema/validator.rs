//! Descriptor validation.
//!
//! Validation semantics:
//! - All required fields are present
//! - Field types exactly match the descriptor (no implicit coercion between
//!   primitives; the one exception is `date`, which accepts an RFC 3339
//!   string or integer epoch-milliseconds and normalizes to RFC 3339)
//! - Null is never a valid field value
//! - Refinements run after structural validation, against the parsed output
//! - Union validation selects a branch by the discriminator value and applies
//!   that branch's intersected rules
//!
//! Validation returns the *parsed output*: declared fields only. Undeclared
//! input keys are dropped without error — a layered constructor passes one
//! raw input through every ancestor layer, so each layer must tolerate the
//! fields that belong to the layers above it.
//!
//! Validation is deterministic and mutates nothing.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::errors::{SchemaError, SchemaResult};
use super::types::{Descriptor, FieldDef, FieldType, ObjectDescriptor, UnionDescriptor};

/// Validates a value against a descriptor and returns the parsed field map.
///
/// # Errors
///
/// Returns `SchemaError::ValidationFailed` when the value violates the
/// descriptor, or `SchemaError::UnknownTag` when a union discriminator is
/// absent or unknown. Nothing is returned on failure.
pub fn validate(descriptor: &Descriptor, value: &Value) -> SchemaResult<Map<String, Value>> {
    match descriptor {
        Descriptor::Object(object) => {
            let obj = require_object(value)?;
            validate_shape(obj, object, "")
        }
        Descriptor::Union(union) => validate_union(union, value),
    }
}

/// Parses a date value: an RFC 3339 string or integer epoch-milliseconds.
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|parsed| parsed.with_timezone(&Utc)),
        Value::Number(number) => number.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

/// Requires the value to be a JSON object; `$root` error otherwise.
pub(crate) fn require_object(value: &Value) -> SchemaResult<&Map<String, Value>> {
    value.as_object().ok_or_else(|| {
        SchemaError::type_mismatch("$root", "object", json_type_name(value))
    })
}

fn validate_union(union: &UnionDescriptor, value: &Value) -> SchemaResult<Map<String, Value>> {
    let obj = require_object(value)?;

    let tag = match obj.get(union.discriminator()) {
        None => return Err(SchemaError::unknown_tag(union.discriminator(), None)),
        Some(Value::String(tag)) => tag,
        Some(other) => {
            return Err(SchemaError::unknown_tag(
                union.discriminator(),
                Some(json_type_name(other)),
            ))
        }
    };

    let branch = union
        .branch(tag)
        .ok_or_else(|| SchemaError::unknown_tag(union.discriminator(), Some(tag)))?;

    validate_shape(obj, branch, "")
}

/// Validates an object against a full shape: fields, then refinements.
fn validate_shape(
    obj: &Map<String, Value>,
    descriptor: &ObjectDescriptor,
    path_prefix: &str,
) -> SchemaResult<Map<String, Value>> {
    let parsed = validate_fields(obj, descriptor.fields(), path_prefix)?;

    for refinement in descriptor.refinements() {
        if !refinement.holds(&parsed) {
            return Err(SchemaError::refinement_failed(refinement.rule()));
        }
    }

    Ok(parsed)
}

/// Validates each declared field and collects the parsed output.
fn validate_fields(
    obj: &Map<String, Value>,
    fields: &HashMap<String, FieldDef>,
    path_prefix: &str,
) -> SchemaResult<Map<String, Value>> {
    let mut parsed = Map::new();

    for (field_name, field_def) in fields {
        let field_path = make_path(path_prefix, field_name);

        match obj.get(field_name) {
            Some(Value::Null) => return Err(SchemaError::null_value(&field_path)),
            Some(value) => {
                let output = validate_value(value, &field_def.field_type, &field_path)?;
                parsed.insert(field_name.clone(), output);
            }
            None if field_def.required => return Err(SchemaError::missing_field(field_path)),
            None => {}
        }
    }

    Ok(parsed)
}

/// Validates a single value against a field type and returns its parsed form.
fn validate_value(
    value: &Value,
    expected_type: &FieldType,
    field_path: &str,
) -> SchemaResult<Value> {
    match expected_type {
        FieldType::String => {
            if !value.is_string() {
                return Err(type_error(field_path, "string", value));
            }
            Ok(value.clone())
        }
        FieldType::Int => {
            // Must be an integer (not a float)
            if !value.is_i64() && !value.is_u64() {
                return Err(type_error(field_path, "int", value));
            }
            Ok(value.clone())
        }
        FieldType::Bool => {
            if !value.is_boolean() {
                return Err(type_error(field_path, "bool", value));
            }
            Ok(value.clone())
        }
        FieldType::Float => {
            // Accept both integers and floats as float
            if !value.is_number() {
                return Err(type_error(field_path, "float", value));
            }
            Ok(value.clone())
        }
        FieldType::Date => match parse_date(value) {
            Some(parsed) => Ok(Value::String(parsed.to_rfc3339())),
            None => Err(type_error(field_path, "date", value)),
        },
        FieldType::Literal { value: literal } => {
            if value.as_str() != Some(literal.as_str()) {
                return Err(type_error(
                    field_path,
                    format!("literal '{}'", literal),
                    value,
                ));
            }
            Ok(value.clone())
        }
        FieldType::Object { fields } => {
            let obj = value
                .as_object()
                .ok_or_else(|| type_error(field_path, "object", value))?;
            let parsed = validate_fields(obj, fields, field_path)?;
            Ok(Value::Object(parsed))
        }
        FieldType::Array { element_type } => {
            let arr = value
                .as_array()
                .ok_or_else(|| type_error(field_path, "array", value))?;

            let mut parsed = Vec::with_capacity(arr.len());
            for (i, elem) in arr.iter().enumerate() {
                let elem_path = format!("{}[{}]", field_path, i);

                if elem.is_null() {
                    return Err(SchemaError::null_value(&elem_path));
                }

                parsed.push(validate_value(elem, element_type, &elem_path)?);
            }
            Ok(Value::Array(parsed))
        }
    }
}

/// Returns the JSON type name for error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Creates a field path from prefix and field name.
fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

/// Creates a type mismatch error.
fn type_error(field_path: &str, expected: impl Into<String>, actual: &Value) -> SchemaError {
    SchemaError::type_mismatch(field_path, expected, json_type_name(actual))
}
