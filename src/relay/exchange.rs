//! OAuth token exchange logic.
//!
//! Handles exchanging authorization codes for access tokens. The client
//! secret travels only on this server-to-server request.

use super::provider::OAuthProvider;
use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

/// Token payload handed to the plugin through `/poll`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenPayload {
    pub access_token: String,
}

/// Exchange authorization code for access token
///
/// Sends `grant_type=authorization_code` as a form body, authenticated with
/// HTTP Basic `client_id:client_secret`.
pub async fn exchange_code_for_token(
    client: &reqwest::Client,
    provider: &OAuthProvider,
    code: &str,
) -> Result<TokenPayload> {
    let credentials = BASE64.encode(format!("{}:{}", provider.client_id, provider.client_secret));
    let redirect_uri = provider.redirect_uri();
    let form_data = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", redirect_uri.as_str()),
    ];

    tracing::debug!("Exchanging authorization code for token at {}", provider.token_url);

    let response = client
        .post(&provider.token_url)
        .header("Authorization", format!("Basic {}", credentials))
        .header("Accept", "application/json")
        .form(&form_data)
        .send()
        .await
        .context("Failed to send token exchange request")?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(anyhow!(
            "Token exchange failed with status {}: {}",
            status,
            body
        ));
    }

    response
        .json::<TokenPayload>()
        .await
        .context("Failed to parse token response")
}
