//! Discord OAuth service — authorize URL, code exchange, profile fetch.
//!
//! Only token exchange correctness matters here. The resulting session is
//! keyed by the Discord account id, so logging in again from anywhere
//! replaces the previous token.

use reqwest::Url;

use crate::services::identity::ExternalIdentity;

pub const DEFAULT_DISCORD_API_BASE: &str = "https://discord.com/api";
const AUTHORIZE_URL: &str = "https://discord.com/oauth2/authorize";

/// Discord OAuth configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Base for token and profile endpoints; overridable for tests.
    pub api_base: String,
}

impl DiscordConfig {
    /// Load from `DISCORD_CLIENT_ID`, `DISCORD_CLIENT_SECRET`,
    /// `DISCORD_REDIRECT_URI` and optional `DISCORD_API_BASE`.
    /// Returns `None` if any required variable is missing (OAuth disabled).
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let client_id = std::env::var("DISCORD_CLIENT_ID").ok()?;
        let client_secret = std::env::var("DISCORD_CLIENT_SECRET").ok()?;
        let redirect_uri = std::env::var("DISCORD_REDIRECT_URI").ok()?;
        let api_base = std::env::var("DISCORD_API_BASE").unwrap_or_else(|_| DEFAULT_DISCORD_API_BASE.into());
        Some(Self { client_id, client_secret, redirect_uri, api_base })
    }

    /// Build the Discord authorization URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be assembled.
    pub fn authorize_url(&self) -> Result<Url, AuthError> {
        Url::parse_with_params(
            AUTHORIZE_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", "identify"),
            ],
        )
        .map_err(|e| AuthError::NotConfigured(e.to_string()))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.api_base.trim_end_matches('/'))
    }
}

#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, serde::Deserialize)]
pub struct DiscordUser {
    pub id: String,
    pub username: String,
    pub global_name: Option<String>,
}

impl DiscordUser {
    /// Preferred display name: the global name when set, else the username.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.global_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("oauth not configured: {0}")]
    NotConfigured(String),
    #[error("discord token exchange failed: {0}")]
    TokenExchange(String),
    #[error("discord api error: {0}")]
    ProviderApi(String),
}

/// Exchange an OAuth code for an access token.
///
/// # Errors
///
/// Returns `TokenExchange` on transport failure or an unexpected response.
pub async fn exchange_code(http: &reqwest::Client, config: &DiscordConfig, code: &str) -> Result<String, AuthError> {
    let resp = http
        .post(config.endpoint("oauth2/token"))
        .form(&[
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", config.redirect_uri.as_str()),
        ])
        .send()
        .await
        .map_err(|e| AuthError::TokenExchange(e.to_string()))?;

    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| AuthError::TokenExchange(e.to_string()))?;
    if !status.is_success() {
        return Err(AuthError::TokenExchange(format!("{status}: {body}")));
    }
    let token_resp: TokenResponse =
        serde_json::from_str(&body).map_err(|_| AuthError::TokenExchange(format!("unexpected response: {body}")))?;
    Ok(token_resp.access_token)
}

/// Fetch the authenticated Discord user's profile.
///
/// # Errors
///
/// Returns `ProviderApi` on transport failure or a non-success status.
pub async fn fetch_user(
    http: &reqwest::Client,
    config: &DiscordConfig,
    access_token: &str,
) -> Result<DiscordUser, AuthError> {
    let resp = http
        .get(config.endpoint("users/@me"))
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| AuthError::ProviderApi(e.to_string()))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(AuthError::ProviderApi(format!("{status}: {body}")));
    }

    resp.json::<DiscordUser>()
        .await
        .map_err(|e| AuthError::ProviderApi(e.to_string()))
}

/// Resolve an OAuth code to the identity and display name a session is issued for.
///
/// # Errors
///
/// Propagates any exchange or profile failure.
pub async fn resolve_identity(
    http: &reqwest::Client,
    config: &DiscordConfig,
    code: &str,
) -> Result<(ExternalIdentity, String), AuthError> {
    let access_token = exchange_code(http, config, code).await?;
    let user = fetch_user(http, config, &access_token).await?;
    let name = user.display_name().to_owned();
    Ok((ExternalIdentity::Discord { user_id: user.id }, name))
}

#[cfg(test)]
#[path = "oauth_test.rs"]
mod tests;
