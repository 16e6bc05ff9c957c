//! Router assembly: HTTP endpoints, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, Method},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use tower::ServiceExt;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - `/get_question` (GET query string, POST JSON body, OPTIONS discovery)
/// - `/api/v1/health`
/// - CORS (allow any origin/method/headers), adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route(
            "/get_question",
            get(http::http_get_question)
                .post(http::http_post_question)
                .options(http::http_options_question),
        )
        .route("/api/v1/health", get(http::http_health))
        .with_state(state);

    api.clone()
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(middleware::from_fn_with_state(api, discovery_bypass))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// `CorsLayer` answers every OPTIONS request itself. Only a preflight (one
/// carrying `Access-Control-Request-Method`) may go through it; a plain
/// OPTIONS is input discovery and is served by the bare router.
async fn discovery_bypass(State(api): State<Router>, req: Request, next: Next) -> Response {
    let preflight = req.headers().contains_key(header::ACCESS_CONTROL_REQUEST_METHOD);
    if req.method() == Method::OPTIONS && !preflight {
        return api.oneshot(req).await.unwrap_or_else(|never| match never {});
    }
    next.run(req).await
}
