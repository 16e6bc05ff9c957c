//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs a request id plus basic result info.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::{Map, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::QuizError;
use crate::logic::{describe_input_fields, generate_question};
use crate::protocol::{DiscoveryOut, HealthOut};
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
    Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state))]
pub async fn http_options_question(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(DiscoveryOut::new(describe_input_fields(&state.registry)))
}

#[instrument(level = "info", skip(state, q), fields(request_id = %Uuid::new_v4(), keys = q.len()))]
pub async fn http_get_question(
    State(state): State<Arc<AppState>>,
    Query(q): Query<HashMap<String, String>>,
) -> Result<Json<Value>, QuizError> {
    let raw: Map<String, Value> = q.into_iter().map(|(k, v)| (k, Value::String(v))).collect();
    serve_question(&state, raw).await
}

#[instrument(level = "info", skip(state, body), fields(request_id = %Uuid::new_v4(), keys = body.len()))]
pub async fn http_post_question(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<Value>, QuizError> {
    serve_question(&state, body).await
}

async fn serve_question(state: &AppState, raw: Map<String, Value>) -> Result<Json<Value>, QuizError> {
    let (question, origin) = generate_question(state, &raw).await?;
    info!(target: "question", %origin, "HTTP question served");
    Ok(Json(question))
}
