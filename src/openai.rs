//! Minimal OpenAI client implementing [`StructuredOutputRequester`].
//!
//! One chat completion per question, with a single function tool the model is
//! forced to call. The tool parameters wrap the question schema under a
//! required `question` key and the parsed call arguments are returned as is.
//!
//! NOTE: We never log the API key or prompt contents.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument};

use crate::config::{Prompts, Sampling};
use crate::requester::{PromptContext, RequestError, StructuredOutputRequester};
use crate::util::{fill_template, trunc_for_log};

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
  pub prompts: Prompts,
  pub sampling: Sampling,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY (or GPT_API_KEY); otherwise return None.
  pub fn from_env(prompts: Prompts, sampling: Sampling) -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY")
      .or_else(|_| std::env::var("GPT_API_KEY"))
      .ok()
      .filter(|k| !k.is_empty())?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model = std::env::var("OPENAI_MODEL")
      .or_else(|_| std::env::var("GPT_MODEL"))
      .unwrap_or_else(|_| "gpt-3.5-turbo".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, model, prompts, sampling })
  }

  fn user_message(&self, context: &PromptContext, nonce: u32) -> String {
    let inputs = serde_json::to_string(context).unwrap_or_default();
    let nonce = nonce.to_string();
    fill_template(
      &self.prompts.user_template,
      &[("inputs", inputs.as_str()), ("instructions", context.instructions.as_str()), ("nonce", nonce.as_str())],
    )
  }

  fn request_body(&self, schema: &Value, context: &PromptContext, nonce: u32) -> ChatCompletionRequest {
    ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: self.prompts.system.clone() },
        ChatMessageReq { role: "user".into(), content: self.user_message(context, nonce) },
      ],
      tools: vec![json!({
        "type": "function",
        "function": {
          "name": self.prompts.function_name,
          "description": self.prompts.function_description,
          "parameters": {
            "type": "object",
            "properties": { "question": schema },
            "required": ["question"]
          }
        }
      })],
      tool_choice: json!({ "type": "function", "function": { "name": self.prompts.function_name } }),
      temperature: self.sampling.temperature,
      top_p: self.sampling.top_p,
      presence_penalty: self.sampling.presence_penalty,
    }
  }
}

#[async_trait]
impl StructuredOutputRequester for OpenAI {
  #[instrument(level = "info", skip(self, schema, context), fields(model = %self.model, topic_len = context.topic.len()))]
  async fn request(&self, schema: &Value, context: &PromptContext) -> Result<Value, RequestError> {
    let url = format!("{}/chat/completions", self.base_url);
    let nonce = rand::thread_rng().gen_range(0..=1000);
    let req = self.request_body(schema, context, nonce);

    let start = std::time::Instant::now();
    let res = self.client.post(&url)
      .header(USER_AGENT, "quizmaster-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let message = extract_openai_error(&body).unwrap_or_else(|| trunc_for_log(&body, 200));
      error!(elapsed = ?start.elapsed(), status = status.as_u16(), "Model call failed");
      return Err(RequestError::Status { status: status.as_u16(), message });
    }

    let body: ChatCompletionResponse = res.json().await?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    let value = function_arguments(body)?;
    info!(elapsed = ?start.elapsed(), "Model response received successfully");
    Ok(value)
  }

  fn describe(&self) -> String {
    format!("openai:{}", self.model)
  }
}

/// Parse the first tool call's arguments into JSON.
fn function_arguments(body: ChatCompletionResponse) -> Result<Value, RequestError> {
  let args = body.choices.into_iter().next()
    .and_then(|c| c.message.tool_calls.into_iter().next())
    .map(|call| call.function.arguments)
    .ok_or(RequestError::MissingToolCall)?;
  debug!(args_len = args.len(), preview = %trunc_for_log(&args, 80), "Function call arguments");
  Ok(serde_json::from_str(&args)?)
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  tools: Vec<Value>,
  tool_choice: Value,
  temperature: f32,
  top_p: f32,
  presence_penalty: f32,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp {
  #[serde(default)] tool_calls: Vec<ToolCall>,
}
#[derive(Deserialize)]
struct ToolCall { function: FunctionCall }
#[derive(Deserialize)]
struct FunctionCall { arguments: String }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}
