//! Account routes — display-name accounts, Discord OAuth, session lookup.

use std::time::Instant;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Redirect, Response};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::services::identity::ExternalIdentity;
use crate::services::oauth;
use crate::services::placement::cooldown_remaining;
use crate::state::AppState;
use crate::validate::{validate_string, validate_token};

use super::errors_response;

/// Returned for every upstream OAuth failure; details stay in the logs.
const AUTH_FAILED: &str = "authentication failed";

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub name: String,
    /// Seconds until the next placement is allowed; `0.0` when ready.
    pub cooldown_remaining: f64,
}

#[derive(Deserialize)]
pub struct CreateAccountQuery {
    name: Option<String>,
}

#[derive(Deserialize)]
pub struct TokenQuery {
    code: Option<String>,
}

#[derive(Deserialize)]
pub struct MeQuery {
    token: Option<String>,
}

async fn issue_session(state: &AppState, identity: ExternalIdentity, name: String) -> SessionResponse {
    let mut store = state.identity.write().await;
    let token = store.create_session(identity.clone(), name.clone());
    info!(%identity, sessions = store.len(), "session issued");
    SessionResponse { token, name }
}

/// `GET /create-account?name=` — issue a session for a display name.
pub async fn create_account(State(state): State<AppState>, Query(q): Query<CreateAccountQuery>) -> Response {
    let Ok(name) = validate_string(q.name.as_deref()) else {
        return errors_response(StatusCode::BAD_REQUEST, vec!["Invalid or missing parameter 'name'.".into()]);
    };
    let name = name.to_owned();
    let resp = issue_session(&state, ExternalIdentity::DisplayName(name.clone()), name).await;
    Json(resp).into_response()
}

/// `GET /login` — redirect to the Discord authorization page.
pub async fn login(State(state): State<AppState>) -> Response {
    let Some(config) = &state.config.discord else {
        return errors_response(StatusCode::SERVICE_UNAVAILABLE, vec!["OAuth not configured".into()]);
    };
    match config.authorize_url() {
        Ok(url) => Redirect::temporary(url.as_str()).into_response(),
        Err(e) => {
            error!(error = %e, "authorize url build failed");
            errors_response(StatusCode::SERVICE_UNAVAILABLE, vec!["OAuth not configured".into()])
        }
    }
}

/// `GET /token?code=` — exchange an OAuth code for a session.
pub async fn token(State(state): State<AppState>, Query(q): Query<TokenQuery>) -> Response {
    let Some(config) = &state.config.discord else {
        return errors_response(StatusCode::SERVICE_UNAVAILABLE, vec!["OAuth not configured".into()]);
    };
    let Ok(code) = validate_string(q.code.as_deref()) else {
        return errors_response(StatusCode::BAD_REQUEST, vec!["Invalid or missing parameter 'code'.".into()]);
    };

    match oauth::resolve_identity(&state.http, config, code).await {
        Ok((identity, name)) => Json(issue_session(&state, identity, name).await).into_response(),
        Err(e) => {
            error!(error = %e, "oauth login failed");
            errors_response(StatusCode::BAD_GATEWAY, vec![AUTH_FAILED.into()])
        }
    }
}

/// `GET /me?token=` — who a token belongs to and how long until it may place.
pub async fn me(State(state): State<AppState>, Query(q): Query<MeQuery>) -> Response {
    let identity = state.identity.read().await;
    let Ok(session) = validate_token(q.token.as_deref(), &identity) else {
        return errors_response(StatusCode::UNAUTHORIZED, vec!["Invalid or missing parameter 'token'.".into()]);
    };
    let remaining = cooldown_remaining(session.last_placement, Instant::now(), state.config.cooldown);
    Json(MeResponse {
        name: session.name.clone(),
        cooldown_remaining: remaining.map_or(0.0, |d| d.as_secs_f64()),
    })
    .into_response()
}

#[cfg(test)]
#[path = "account_test.rs"]
mod tests;
