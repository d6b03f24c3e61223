//! Upstream OAuth provider description.

use crate::config::PinterestConfig;

/// Everything the relay needs to talk to the provider.
#[derive(Clone, Debug)]
pub struct OAuthProvider {
    /// OAuth authorization endpoint URL
    pub auth_url: String,

    /// OAuth token exchange endpoint URL
    pub token_url: String,

    /// Required OAuth scopes
    pub scopes: Vec<String>,

    /// Client ID (from environment variable)
    pub client_id: String,

    /// Client secret (from environment variable, never sent to the plugin)
    pub client_secret: String,

    /// Public base URL of the relay
    pub plugin_uri: String,
}

impl OAuthProvider {
    /// Redirect URI registered with the provider.
    pub fn redirect_uri(&self) -> String {
        format!("{}/callback", self.plugin_uri.trim_end_matches('/'))
    }

    /// Build the authorization URL, binding the flow to `state`.
    ///
    /// Pinterest expects comma-separated scopes.
    pub fn build_auth_url(&self, state: &str) -> String {
        let scopes = self.scopes.join(",");
        let separator = if self.auth_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            self.auth_url,
            separator,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri()),
            urlencoding::encode(&scopes),
            urlencoding::encode(state)
        )
    }
}

impl From<&PinterestConfig> for OAuthProvider {
    fn from(config: &PinterestConfig) -> Self {
        Self {
            auth_url: config.auth_url.clone(),
            token_url: config.token_url.clone(),
            scopes: config.scopes.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            plugin_uri: config.plugin_uri.clone(),
        }
    }
}
