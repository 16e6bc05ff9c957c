//! End-to-end entry points used by the HTTP handlers.
//!
//! resolve tag -> validate bag -> lower shape to schema -> ask the requester.
//! Everything before the requester call is synchronous and touches no shared
//! mutable state.

use serde_json::{json, Map, Value};
use tracing::{info, instrument, warn};

use crate::descriptor::FieldPartition;
use crate::errors::QuizError;
use crate::requester::PromptContext;
use crate::seeds::seed_question_fields;
use crate::state::AppState;
use crate::registry::VariantRegistry;
use crate::validator::{self, ValidatedInput};

/// Schema plus validated input, ready for the requester.
#[derive(Debug)]
pub struct QuestionRequest {
  pub schema: Value,
  pub input: ValidatedInput,
}

pub fn describe_input_fields(registry: &VariantRegistry) -> FieldPartition {
  validator::describe_input_fields(registry)
}

#[instrument(level = "info", skip(registry, raw), fields(%tag))]
pub fn build_request(
  registry: &VariantRegistry,
  tag: &str,
  raw: &Map<String, Value>,
) -> Result<QuestionRequest, QuizError> {
  let input = validator::validate(registry, tag, raw)?;
  let shape = registry.resolve(input.category.as_str())?;
  let schema = shape.schema()?;
  Ok(QuestionRequest { schema, input })
}

/// Produce a question for the bag. `category` in the bag names the variant.
/// Returns the question value and where it came from.
#[instrument(level = "info", skip(state, raw), fields(keys = raw.len()))]
pub async fn generate_question(
  state: &AppState,
  raw: &Map<String, Value>,
) -> Result<(Value, &'static str), QuizError> {
  let tag = raw.get("category").and_then(Value::as_str).unwrap_or_default();
  let req = build_request(&state.registry, tag, raw)?;

  match &state.requester {
    Some(requester) => {
      let context = PromptContext::from(&req.input);
      let question = requester.request(&req.schema, &context).await?;
      info!(target: "question", %tag, requester = %requester.describe(), "Question generated");
      Ok((question, "model"))
    }
    None => {
      let question = fallback_question(&state.registry, &req.input)?;
      warn!(target: "question", %tag, "No requester configured; served built-in question");
      Ok((question, "seed"))
    }
  }
}

fn fallback_question(registry: &VariantRegistry, input: &ValidatedInput) -> Result<Value, QuizError> {
  let shape = registry.resolve(input.category.as_str())?;
  let question = shape.instantiate(&seed_question_fields(input), &mut rand::thread_rng());
  Ok(json!({ "question": question }))
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::{Arc, Mutex};

  use async_trait::async_trait;

  use crate::requester::{RequestError, StructuredOutputRequester};

  fn bag(v: Value) -> Map<String, Value> {
    match v {
      Value::Object(m) => m,
      _ => panic!("expected object"),
    }
  }

  #[derive(Default)]
  struct Recording {
    seen: Mutex<Vec<(Value, String)>>,
    fail: bool,
  }

  #[async_trait]
  impl StructuredOutputRequester for Recording {
    async fn request(&self, schema: &Value, context: &PromptContext) -> Result<Value, RequestError> {
      self.seen.lock().unwrap().push((schema.clone(), context.topic.clone()));
      if self.fail {
        return Err(RequestError::MissingToolCall);
      }
      Ok(json!({"question": {"statement": "opaque", "extra": [1, 2, 3]}}))
    }

    fn describe(&self) -> String { "recording".into() }
  }

  #[test]
  fn build_request_returns_variant_schema() {
    let reg = VariantRegistry::new().unwrap();
    let req = build_request(&reg, "fill", &bag(json!({"difficulty": "easy", "topic": "chemistry"}))).unwrap();
    assert_eq!(req.schema, reg.resolve("fill").unwrap().schema().unwrap());
    assert_eq!(req.input.topic, "chemistry");
  }

  #[test]
  fn build_request_rejects_with_all_fields() {
    let reg = VariantRegistry::new().unwrap();
    let err = build_request(&reg, "nope", &bag(json!({"topic": ""}))).unwrap_err();
    match err {
      QuizError::Validation(e) => assert_eq!(e.fields, vec!["category", "difficulty", "topic"]),
      other => panic!("unexpected error: {other}"),
    }
  }

  #[tokio::test]
  async fn requester_value_passes_through_unmodified() {
    let rec = Arc::new(Recording::default());
    let state = AppState::with_requester(VariantRegistry::new().unwrap(), Some(rec.clone()));
    let raw = bag(json!({"category": "mcq", "difficulty": "medium", "topic": "tides"}));
    let (value, origin) = generate_question(&state, &raw).await.unwrap();
    assert_eq!(origin, "model");
    assert_eq!(value, json!({"question": {"statement": "opaque", "extra": [1, 2, 3]}}));
    let seen = rec.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].1, "tides");
    assert_eq!(seen[0].0["properties"]["num_selectable"], json!({"type": "integer"}));
  }

  #[tokio::test]
  async fn requester_failure_propagates() {
    let rec = Arc::new(Recording { fail: true, ..Default::default() });
    let state = AppState::with_requester(VariantRegistry::new().unwrap(), Some(rec));
    let raw = bag(json!({"category": "fill", "difficulty": "hard", "topic": "tides"}));
    let err = generate_question(&state, &raw).await.unwrap_err();
    assert!(matches!(err, QuizError::Request(RequestError::MissingToolCall)));
  }

  #[tokio::test]
  async fn validation_happens_before_any_request() {
    let rec = Arc::new(Recording::default());
    let state = AppState::with_requester(VariantRegistry::new().unwrap(), Some(rec.clone()));
    let raw = bag(json!({"category": "mcq", "difficulty": "impossible", "topic": ""}));
    assert!(matches!(generate_question(&state, &raw).await, Err(QuizError::Validation(_))));
    assert!(rec.seen.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn seed_fallback_carries_input_and_defaults() {
    let state = AppState::with_requester(VariantRegistry::new().unwrap(), None);
    let raw = bag(json!({"category": "mcq", "difficulty": "easy", "topic": "space"}));
    let (value, origin) = generate_question(&state, &raw).await.unwrap();
    assert_eq!(origin, "seed");
    let q = &value["question"];
    assert_eq!(q["category"], "mcq");
    assert_eq!(q["num_selectable"], 1);
    assert_eq!(q["topic"], "space");
    assert_eq!(q["scoring_rules"]["allowed_duration_secs"], 60);
    let mut choices: Vec<String> = serde_json::from_value(q["choices"].clone()).unwrap();
    choices.sort();
    assert_eq!(choices, vec!["Jupiter", "Mars", "Mercury", "Venus"]);
  }
}
