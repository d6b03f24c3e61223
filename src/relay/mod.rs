//! OAuth relay between the plugin and the upstream provider.
//!
//! The plugin has no secure storage, so it never sees the client secret.
//! Instead it takes part in a polling handshake:
//! 1. Plugin calls POST /authorize → `{url, readKey}`
//! 2. Plugin opens `url`; the user authorizes on the provider's site
//! 3. Provider redirects to GET /callback?code&state (state = writeKey)
//! 4. Relay exchanges the code and stores the token under writeKey
//! 5. Plugin polls POST /poll `{readKey}` until the token is handed over
//!
//! CORS is wide open: there is no session, only capability keys.

mod exchange;
mod handoff;
mod provider;

pub use exchange::{exchange_code_for_token, TokenPayload};
pub use handoff::{HandoffKeys, HandoffManager, PollOutcome};
pub use provider::OAuthProvider;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, Method, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info, warn};

/// Relay error types, mapped to HTTP statuses.
#[derive(Debug)]
pub enum RelayError {
    /// Missing or malformed request parameters
    BadRequest(String),
    /// Unknown or expired readKey
    NotFound(String),
    /// Provider rejected the code exchange
    TokenExchange(String),
    /// Anything unexpected; details are logged, never returned
    Internal(anyhow::Error),
}

impl std::fmt::Display for RelayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelayError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            RelayError::NotFound(msg) => write!(f, "Not found: {}", msg),
            RelayError::TokenExchange(msg) => write!(f, "Token exchange failed: {}", msg),
            RelayError::Internal(e) => write!(f, "Internal error: {:#}", e),
        }
    }
}

impl std::error::Error for RelayError {}

impl From<anyhow::Error> for RelayError {
    fn from(e: anyhow::Error) -> Self {
        RelayError::Internal(e)
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match self {
            RelayError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            RelayError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            RelayError::TokenExchange(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to get access token: {}", msg),
            )
                .into_response(),
            RelayError::Internal(e) => {
                error!(error = %format!("{:#}", e), "Unhandled relay error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

/// Shared application state for the relay
#[derive(Clone)]
pub struct RelayAppState {
    pub handoffs: HandoffManager,
    pub provider: OAuthProvider,
    pub http_client: reqwest::Client,
}

/// POST /authorize response
#[derive(Serialize, Deserialize, Debug)]
pub struct AuthorizeResponse {
    pub url: String,
    #[serde(rename = "readKey")]
    pub read_key: String,
}

/// POST /poll body
#[derive(Deserialize, Serialize, Debug)]
pub struct PollRequest {
    #[serde(rename = "readKey", default)]
    pub read_key: Option<String>,
}

/// OAuth callback query parameters
#[derive(Deserialize)]
pub struct OAuthCallback {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

const CALLBACK_HTML: &str = "<!DOCTYPE html>\
<html><head><title>Authenticated</title></head>\
<body><p>Authentication successful! You can now close this window.</p></body></html>";

/// Create relay router
pub fn create_relay_router(state: RelayAppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/authorize", post(authorize))
        .route("/callback", get(callback))
        .route("/poll", post(poll))
        .with_state(Arc::new(state))
        .layer(CatchPanicLayer::new())
        .layer(cors)
}

/// POST /authorize
///
/// Starts a handoff and returns the provider URL plus the readKey.
async fn authorize(
    State(state): State<Arc<RelayAppState>>,
) -> Result<Json<AuthorizeResponse>, RelayError> {
    let keys = state.handoffs.begin().await?;
    let url = state.provider.build_auth_url(&keys.write_key);

    info!("OAuth handoff started");

    Ok(Json(AuthorizeResponse {
        url,
        read_key: keys.read_key,
    }))
}

/// GET /callback
///
/// Invoked by the provider's redirect. `state` is the writeKey.
async fn callback(
    State(state): State<Arc<RelayAppState>>,
    Query(callback): Query<OAuthCallback>,
) -> Result<Html<&'static str>, RelayError> {
    if let Some(error) = callback.error {
        let description = callback
            .error_description
            .unwrap_or_else(|| "Unknown error".to_string());
        warn!(error = %error, description = %description, "OAuth authorization denied");
        return Err(RelayError::BadRequest(format!(
            "OAuth authorization failed: {} - {}",
            error, description
        )));
    }

    let (Some(code), Some(write_key)) = (
        callback.code.filter(|c| !c.is_empty()),
        callback.state.filter(|s| !s.is_empty()),
    ) else {
        return Err(RelayError::BadRequest(
            "Missing authorization code or state.".to_string(),
        ));
    };

    debug!("Exchanging authorization code for token");
    let token = exchange_code_for_token(&state.http_client, &state.provider, &code)
        .await
        .map_err(|e| {
            error!(error = %format!("{:#}", e), "Token exchange failed");
            RelayError::TokenExchange(format!("{:#}", e))
        })?;

    state.handoffs.complete(&write_key, &token).await?;

    info!("OAuth handoff token ready");

    Ok(Html(CALLBACK_HTML))
}

/// POST /poll
///
/// 200 with the token (consumed), 204 while pending, 404 once unknown.
async fn poll(State(state): State<Arc<RelayAppState>>, body: Bytes) -> Result<Response, RelayError> {
    let request: PollRequest = serde_json::from_slice(&body)
        .map_err(|_| RelayError::BadRequest("Missing readKey".to_string()))?;
    let read_key = request
        .read_key
        .filter(|k| !k.is_empty())
        .ok_or_else(|| RelayError::BadRequest("Missing readKey".to_string()))?;

    match state.handoffs.poll(&read_key).await? {
        PollOutcome::Unknown => Err(RelayError::NotFound(
            "Invalid or expired readKey".to_string(),
        )),
        PollOutcome::Pending => Ok(StatusCode::NO_CONTENT.into_response()),
        PollOutcome::Ready(token) => {
            info!("OAuth handoff consumed");
            Ok(Json(token).into_response())
        }
    }
}
