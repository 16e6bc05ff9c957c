//! Lowering of [`TypeDescriptor`]s into JSON-Schema-shaped documents.
//!
//! Only the subset the structured-output endpoint understands is emitted:
//! `type`, `properties`, `items`, `additionalProperties` and `enum`.
//!
//! Requiredness is NOT part of the output. `Optional` lowers transparently and
//! records carry `properties` only; callers that need a `required` list take
//! it from [`crate::descriptor::classify`].

use std::collections::HashSet;

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::descriptor::{EnumDescriptor, RecordDescriptor, TypeDescriptor};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
  #[error("unsupported type at `{path}`: {reason}")]
  UnsupportedType { path: String, reason: &'static str },
}

/// Lower a descriptor into a schema document.
pub fn to_schema(ty: &TypeDescriptor) -> Result<Value, SchemaError> {
  let mut path = Vec::new();
  lower(ty, &mut path)
}

/// Lower a record; the path of any error starts with the record name.
pub fn record_to_schema(record: &RecordDescriptor) -> Result<Value, SchemaError> {
  let mut path = vec![record.name.clone()];
  lower_record(record, &mut path)
}

fn lower(ty: &TypeDescriptor, path: &mut Vec<String>) -> Result<Value, SchemaError> {
  match ty {
    TypeDescriptor::Primitive(p) => Ok(json!({ "type": p.schema_type() })),
    TypeDescriptor::Enum(e) => Ok(lower_enum(e)),
    TypeDescriptor::Optional(inner) => {
      if inner.is_optional() {
        return Err(unsupported(path, "optional wrapping another optional"));
      }
      lower(inner, path)
    }
    TypeDescriptor::ListOf(element) => {
      path.push("[]".into());
      let items = lower(element, path)?;
      path.pop();
      Ok(json!({ "type": "array", "items": items }))
    }
    TypeDescriptor::MapOf(value) => {
      path.push("{}".into());
      let values = lower(value, path)?;
      path.pop();
      Ok(json!({ "type": "object", "additionalProperties": values }))
    }
    TypeDescriptor::Record(r) => lower_record(r, path),
  }
}

fn lower_enum(e: &EnumDescriptor) -> Value {
  json!({ "type": e.member_kind().schema_type(), "enum": e.members() })
}

fn lower_record(record: &RecordDescriptor, path: &mut Vec<String>) -> Result<Value, SchemaError> {
  let mut seen = HashSet::new();
  let mut properties = Map::new();
  for field in &record.fields {
    path.push(field.name.clone());
    if !seen.insert(field.name.as_str()) {
      return Err(unsupported(path, "duplicate field name"));
    }
    let schema = lower(&field.ty, path)?;
    path.pop();
    properties.insert(field.name.clone(), schema);
  }
  Ok(json!({ "type": "object", "properties": properties }))
}

fn unsupported(path: &[String], reason: &'static str) -> SchemaError {
  let path = if path.is_empty() { "<root>".to_string() } else { path.join(".") };
  SchemaError::UnsupportedType { path, reason }
}
