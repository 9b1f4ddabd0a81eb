//! Response conformance checks and context filtering
//!
//! Validation semantics:
//! - Every declared field is present (null only where the field is nullable)
//! - No undeclared fields exist
//! - Field types match the declared JSON type
//!
//! Validation never mutates the response and is deterministic.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::errors::{SchemaResult, SchemaViolation, ViolationKind};
use super::types::{Context, ItemSchema, SchemaProperty};

/// Checks rendered responses against a resource schema
pub struct SchemaValidator<'a> {
    schema: &'a ItemSchema,
}

impl<'a> SchemaValidator<'a> {
    pub fn new(schema: &'a ItemSchema) -> Self {
        Self { schema }
    }

    /// Validate a full (unfiltered) response
    pub fn validate(&self, response: &Value) -> SchemaResult<()> {
        let obj = response.as_object().ok_or_else(|| {
            SchemaViolation::new(
                "$root",
                ViolationKind::TypeMismatch {
                    expected: "object",
                    actual: json_type_name(response),
                },
            )
        })?;
        validate_object(obj, &self.schema.properties, "")
    }
}

fn validate_object(
    obj: &Map<String, Value>,
    fields: &BTreeMap<String, SchemaProperty>,
    path_prefix: &str,
) -> SchemaResult<()> {
    for key in obj.keys() {
        if !fields.contains_key(key) {
            return Err(SchemaViolation::new(
                make_path(path_prefix, key),
                ViolationKind::ExtraField,
            ));
        }
    }

    for (name, prop) in fields {
        let path = make_path(path_prefix, name);
        match obj.get(name) {
            Some(value) => validate_value(value, prop, &path)?,
            None => return Err(SchemaViolation::new(path, ViolationKind::MissingField)),
        }
    }

    Ok(())
}

fn validate_value(value: &Value, prop: &SchemaProperty, path: &str) -> SchemaResult<()> {
    if value.is_null() {
        return if prop.nullable {
            Ok(())
        } else {
            Err(SchemaViolation::new(path, ViolationKind::NullValue))
        };
    }

    if !prop.kind.accepts(value) {
        return Err(SchemaViolation::new(
            path,
            ViolationKind::TypeMismatch {
                expected: prop.kind.as_str(),
                actual: json_type_name(value),
            },
        ));
    }

    if let (Some(obj), false) = (value.as_object(), prop.properties.is_empty()) {
        validate_object(obj, &prop.properties, path)?;
    }

    if let (Some(items), Some(element)) = (value.as_array(), prop.items.as_deref()) {
        for (i, item) in items.iter().enumerate() {
            validate_value(item, element, &format!("{}[{}]", path, i))?;
        }
    }

    Ok(())
}

/// Drop every field whose schema does not list `context`, recursing into
/// nested objects and array elements.
pub fn filter_by_context(response: Value, schema: &ItemSchema, context: Context) -> Value {
    match response {
        Value::Object(obj) => Value::Object(filter_object(obj, &schema.properties, context)),
        other => other,
    }
}

fn filter_object(
    obj: Map<String, Value>,
    fields: &BTreeMap<String, SchemaProperty>,
    context: Context,
) -> Map<String, Value> {
    obj.into_iter()
        .filter_map(|(key, value)| match fields.get(&key) {
            Some(prop) if !prop.allows(context) => None,
            Some(prop) => Some((key, filter_value(value, prop, context))),
            // Undeclared fields are left for the validator to report
            None => Some((key, value)),
        })
        .collect()
}

fn filter_value(value: Value, prop: &SchemaProperty, context: Context) -> Value {
    match value {
        Value::Object(obj) if !prop.properties.is_empty() => {
            Value::Object(filter_object(obj, &prop.properties, context))
        }
        Value::Array(items) => match prop.items.as_deref() {
            Some(element) => Value::Array(
                items
                    .into_iter()
                    .map(|item| filter_value(item, element, context))
                    .collect(),
            ),
            None => Value::Array(items),
        },
        other => other,
    }
}

fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
