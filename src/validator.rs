//! Validation of the caller-supplied field bag before any schema is built.
//!
//! Every field is checked independently and all failures are reported
//! together. Unknown keys are ignored.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::descriptor::{classify, Field, FieldPartition, RecordDescriptor, TypeDescriptor};
use crate::question::{Difficulty, QuestionType};
use crate::registry::VariantRegistry;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid fields: {}", .fields.join(", "))]
pub struct ValidationError {
  pub fields: Vec<String>,
}

/// Caller input after validation.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ValidatedInput {
  pub category: QuestionType,
  pub difficulty: Difficulty,
  pub topic: String,
  #[serde(skip_serializing_if = "String::is_empty")]
  pub instructions: String,
}

/// Record describing what a caller may supply.
pub fn user_input_record(registry: &VariantRegistry) -> RecordDescriptor {
  RecordDescriptor::new("UserInput", vec![
    Field::new("category", registry.question_types().clone()),
    Field::new("difficulty", registry.difficulties().clone()),
    Field::new("topic", TypeDescriptor::string()),
    Field::new("instructions", TypeDescriptor::optional(TypeDescriptor::string())),
  ])
}

pub fn describe_input_fields(registry: &VariantRegistry) -> FieldPartition {
  classify(&user_input_record(registry))
}

/// Check `raw` for the variant named by `tag`.
#[instrument(level = "debug", skip(registry, raw), fields(%tag, keys = raw.len()))]
pub fn validate(
  registry: &VariantRegistry,
  tag: &str,
  raw: &Map<String, Value>,
) -> Result<ValidatedInput, ValidationError> {
  let mut invalid = Vec::new();

  let category = match registry.resolve(tag) {
    Ok(shape) if registry.question_types().contains_str(tag) => Some(shape.tag),
    _ => None,
  };
  if category.is_none() {
    invalid.push("category");
  }

  let difficulty = raw
    .get("difficulty")
    .and_then(Value::as_str)
    .filter(|d| registry.difficulties().contains_str(d))
    .and_then(Difficulty::parse);
  if difficulty.is_none() {
    invalid.push("difficulty");
  }

  // Empty-string check only; whitespace is not trimmed.
  let topic = raw.get("topic").and_then(Value::as_str).filter(|t| !t.is_empty());
  if topic.is_none() {
    invalid.push("topic");
  }

  let instructions = match raw.get("instructions") {
    None | Some(Value::Null) => Some(String::new()),
    Some(Value::String(s)) => Some(s.clone()),
    Some(_) => None,
  };
  if instructions.is_none() {
    invalid.push("instructions");
  }

  match (category, difficulty, topic, instructions) {
    (Some(category), Some(difficulty), Some(topic), Some(instructions)) => Ok(ValidatedInput {
      category,
      difficulty,
      topic: topic.to_string(),
      instructions,
    }),
    _ => {
      debug!(target: "question", ?invalid, "Input rejected");
      Err(ValidationError { fields: invalid.into_iter().map(String::from).collect() })
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn bag(v: Value) -> Map<String, Value> {
    match v {
      Value::Object(m) => m,
      _ => panic!("expected object"),
    }
  }

  #[test]
  fn reports_every_invalid_field() {
    let reg = VariantRegistry::new().unwrap();
    let err = validate(&reg, "mcq", &bag(json!({"difficulty": "impossible", "topic": ""}))).unwrap_err();
    assert_eq!(err.fields, vec!["difficulty", "topic"]);
    assert_eq!(err.to_string(), "invalid fields: difficulty, topic");
  }

  #[test]
  fn accepts_valid_input_and_carries_tag() {
    let reg = VariantRegistry::new().unwrap();
    let ok = validate(&reg, "mcq", &bag(json!({"difficulty": "easy", "topic": "geography"}))).unwrap();
    assert_eq!(ok.category, QuestionType::Mcq);
    assert_eq!(ok.difficulty, Difficulty::Easy);
    assert_eq!(ok.topic, "geography");
    assert_eq!(ok.instructions, "");
    assert_eq!(serde_json::to_value(&ok).unwrap(), json!({"category": "mcq", "difficulty": "easy", "topic": "geography"}));
  }

  #[test]
  fn unknown_tag_and_missing_fields() {
    let reg = VariantRegistry::new().unwrap();
    let err = validate(&reg, "essay", &Map::new()).unwrap_err();
    assert_eq!(err.fields, vec!["category", "difficulty", "topic"]);
  }

  #[test]
  fn whitespace_topic_is_not_trimmed() {
    let reg = VariantRegistry::new().unwrap();
    assert!(validate(&reg, "fill", &bag(json!({"difficulty": "hard", "topic": "  "}))).is_ok());
  }

  #[test]
  fn non_string_values_are_invalid() {
    let reg = VariantRegistry::new().unwrap();
    let err = validate(&reg, "fill", &bag(json!({"difficulty": 2, "topic": 5, "instructions": ["x"]}))).unwrap_err();
    assert_eq!(err.fields, vec!["difficulty", "topic", "instructions"]);
  }

  #[test]
  fn instructions_and_extra_keys() {
    let reg = VariantRegistry::new().unwrap();
    let raw = bag(json!({
      "difficulty": "medium", "topic": "jazz", "instructions": "keep it short", "whatever": 42
    }));
    let ok = validate(&reg, "multi_select", &raw).unwrap();
    assert_eq!(ok.instructions, "keep it short");
    let empty = bag(json!({"difficulty": "medium", "topic": "jazz", "instructions": ""}));
    assert!(validate(&reg, "multi_select", &empty).is_ok());
  }

  #[test]
  fn input_fields_description() {
    let reg = VariantRegistry::new().unwrap();
    let parts = describe_input_fields(&reg);
    assert_eq!(parts.mandatory, vec!["category", "difficulty", "topic"]);
    assert_eq!(parts.optional, vec!["instructions"]);
  }
}
