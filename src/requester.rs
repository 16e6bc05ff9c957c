//! Seam to the generative model: hand it a schema and prompt context, get a
//! value back. The value is never inspected.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::validator::ValidatedInput;

#[derive(Debug, Error)]
pub enum RequestError {
  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),
  #[error("model endpoint returned HTTP {status}: {message}")]
  Status { status: u16, message: String },
  #[error("model reply carried no function call")]
  MissingToolCall,
  #[error("function arguments are not valid JSON: {0}")]
  Decode(#[from] serde_json::Error),
}

/// Free-form context for the prompt. The core builds it but never reads it.
#[derive(Clone, Debug, Serialize)]
pub struct PromptContext {
  pub category: String,
  pub difficulty: String,
  pub topic: String,
  #[serde(skip)]
  pub instructions: String,
}

impl From<&ValidatedInput> for PromptContext {
  fn from(input: &ValidatedInput) -> Self {
    Self {
      category: input.category.as_str().to_string(),
      difficulty: input.difficulty.as_str().to_string(),
      topic: input.topic.clone(),
      instructions: input.instructions.clone(),
    }
  }
}

#[async_trait]
pub trait StructuredOutputRequester: Send + Sync {
  async fn request(&self, schema: &Value, context: &PromptContext) -> Result<Value, RequestError>;

  /// Name used in logs.
  fn describe(&self) -> String;
}
