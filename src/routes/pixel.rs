//! Pixel route — `GET /put-pixel`.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::services::placement::{self, PlacementError, PlacementRequest};
use crate::state::AppState;

use super::errors_response;

/// `GET /put-pixel?token=&x=&y=&color=` — place one pixel.
///
/// Replies `success` as plain text, or `{"errors": [...]}` with 400 for
/// invalid fields and 429 while the session is cooling down.
pub async fn put_pixel(State(state): State<AppState>, Query(req): Query<PlacementRequest>) -> Response {
    match placement::place_pixel(&state, &req).await {
        Ok(_) => "success".into_response(),
        Err(err) => {
            let status = match &err {
                PlacementError::InvalidFields(_) => StatusCode::BAD_REQUEST,
                PlacementError::CooldownActive { .. } => StatusCode::TOO_MANY_REQUESTS,
            };
            errors_response(status, err.messages())
        }
    }
}
