//! Built-in questions served when no model is configured.

use serde_json::{json, Map, Value};

use crate::question::QuestionType;
use crate::validator::ValidatedInput;

/// Raw field bag for a built-in question of the requested type. The caller's
/// difficulty and topic are carried over; the content itself is fixed.
pub fn seed_question_fields(input: &ValidatedInput) -> Map<String, Value> {
  let body = match input.category {
    QuestionType::Mcq => json!({
      "statement": "Which planet is known as the Red Planet?",
      "solution": ["Mars"],
      "choices": ["Mars", "Venus", "Jupiter", "Mercury"],
    }),
    QuestionType::MultiSelect => json!({
      "statement": "Which of these are primary colours of light?",
      "solution": ["Red", "Green", "Blue"],
      "choices": ["Red", "Green", "Blue", "Yellow", "Purple"],
      "num_selectable": 3,
    }),
    QuestionType::Fill => json!({
      "statement": "Water boils at ___ degrees Celsius at sea level.",
      "solution": "100",
    }),
  };

  let mut fields = match body {
    Value::Object(m) => m,
    _ => Map::new(),
  };
  fields.insert("difficulty".into(), Value::from(input.difficulty.as_str()));
  fields.insert("topic".into(), Value::from(input.topic.as_str()));
  fields
}
