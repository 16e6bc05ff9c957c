//! Loading agent configuration (prompts + sampling parameters) from TOML.
//!
//! Every section and key is optional; missing values fall back to defaults.

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AgentConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub sampling: Sampling,
}

/// Prompts and function metadata sent with every question request.
/// `user_template` understands `{inputs}`, `{instructions}` and `{nonce}`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub system: String,
  pub user_template: String,
  pub function_name: String,
  pub function_description: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      system: "You are a quiz master capable of generating different kinds of questions. \
        You just need to know the type of question, difficulty and topic you need to ask. \
        You need to keep asking different questions even if the inputs are the same."
        .into(),
      user_template: "Get me a question from the inputs provided:\n{inputs}\n{instructions}\nQuestion Number: {nonce}".into(),
      function_name: "get_random_question".into(),
      function_description: "Get a random question from the given inputs.".into(),
    }
  }
}

/// High temperature keeps repeated requests for the same topic varied.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Sampling {
  pub temperature: f32,
  pub top_p: f32,
  pub presence_penalty: f32,
}

impl Default for Sampling {
  fn default() -> Self {
    Self { temperature: 1.9, top_p: 0.25, presence_penalty: 1.9 }
  }
}

/// Attempt to load `AgentConfig` from AGENT_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_agent_config_from_env() -> Option<AgentConfig> {
  let path = std::env::var("AGENT_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_agent_config(&s) {
      Ok(cfg) => {
        info!(target: "quizmaster_backend", %path, "Loaded agent config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "quizmaster_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "quizmaster_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

pub fn parse_agent_config(s: &str) -> Result<AgentConfig, toml::de::Error> {
  toml::from_str::<AgentConfig>(s)
}
