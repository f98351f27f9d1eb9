//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the HTTP endpoints and the realtime websocket under a
//! single Axum router. The static viewer is served from `STATIC_DIR` as the
//! fallback, so any path not claimed by the API resolves to a file.

pub mod account;
pub mod pixel;
pub mod ws;

use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_files = ServeDir::new(&state.config.static_dir).append_index_html_on_directories(true);

    Router::new()
        .route("/create-account", get(account::create_account))
        .route("/token", get(account::token))
        .route("/login", get(account::login))
        .route("/me", get(account::me))
        .route("/put-pixel", get(pixel::put_pixel))
        .route("/ws", get(ws::handle_ws))
        .route("/healthz", get(healthz))
        .fallback_service(static_files)
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `{"errors": [...]}` with the given status.
pub(crate) fn errors_response(status: StatusCode, errors: Vec<String>) -> Response {
    (status, Json(serde_json::json!({ "errors": errors }))).into_response()
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
