//! Quiz Master · question generation backend
//!
//! - Axum HTTP API around a type-to-schema compiler for question variants
//! - Optional OpenAI integration (via environment variables)
//!
//! Important env variables:
//!   PORT              : u16 (default 8080)
//!   OPENAI_API_KEY    : enables OpenAI integration if present (GPT_API_KEY also accepted)
//!   OPENAI_BASE_URL   : default "https://api.openai.com/v1"
//!   OPENAI_MODEL      : default "gpt-3.5-turbo" (GPT_MODEL also accepted)
//!   AGENT_CONFIG_PATH : path to TOML config (prompts + sampling)
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"

mod config;
mod descriptor;
mod errors;
mod logic;
mod openai;
mod protocol;
mod question;
mod registry;
mod requester;
mod routes;
mod schema;
mod seeds;
mod state;
mod telemetry;
mod util;
mod validator;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Registry, descriptors and the optional OpenAI client are built once here.
  let state = Arc::new(AppState::new()?);

  let app = build_router(state);

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "quizmaster_backend", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "quizmaster_backend", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "quizmaster_backend", error = %e, "Failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
}
