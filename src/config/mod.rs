use anyhow::{Context, Result};
use serde::Deserialize;

/// Complete relay configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub handoff: HandoffConfig,
    #[serde(default)]
    pub pinterest: PinterestConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

fn default_bind_address() -> String {
    "0.0.0.0:8787".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

/// Handoff lifetime configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HandoffConfig {
    /// How long readKey and writeKey entries live (seconds)
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
    /// How often expired entries are swept from the in-memory store (seconds)
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
}

fn default_ttl_seconds() -> u64 {
    300
}

fn default_cleanup_interval() -> u64 {
    60
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl_seconds(),
            cleanup_interval_seconds: default_cleanup_interval(),
        }
    }
}

/// Upstream OAuth provider configuration.
///
/// `client_id` and `client_secret` are never read from the file; see
/// [`RelayConfig::apply_env`].
#[derive(Debug, Clone, Deserialize)]
pub struct PinterestConfig {
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    /// Public base URL of this relay; the provider redirects to `{plugin_uri}/callback`
    #[serde(default = "default_plugin_uri")]
    pub plugin_uri: String,
    #[serde(skip)]
    pub client_id: String,
    #[serde(skip)]
    pub client_secret: String,
}

fn default_auth_url() -> String {
    "https://www.pinterest.com/oauth/".to_string()
}

fn default_token_url() -> String {
    "https://api.pinterest.com/v5/oauth/token".to_string()
}

fn default_scopes() -> Vec<String> {
    vec!["boards:read".to_string(), "pins:read".to_string()]
}

fn default_plugin_uri() -> String {
    "http://localhost:8787".to_string()
}

impl Default for PinterestConfig {
    fn default() -> Self {
        Self {
            auth_url: default_auth_url(),
            token_url: default_token_url(),
            scopes: default_scopes(),
            plugin_uri: default_plugin_uri(),
            client_id: String::new(),
            client_secret: String::new(),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            handoff: HandoffConfig::default(),
            pinterest: PinterestConfig::default(),
        }
    }
}

impl RelayConfig {
    /// Fill in secrets and deployment overrides from the environment.
    ///
    /// - `PINTEREST_CLIENT_ID` (required)
    /// - `PINTEREST_CLIENT_SECRET` (required)
    /// - `PLUGIN_URI` (optional, overrides `[pinterest] plugin_uri`)
    pub fn apply_env(&mut self) -> Result<()> {
        self.pinterest.client_id =
            std::env::var("PINTEREST_CLIENT_ID").context("PINTEREST_CLIENT_ID not set")?;
        self.pinterest.client_secret =
            std::env::var("PINTEREST_CLIENT_SECRET").context("PINTEREST_CLIENT_SECRET not set")?;
        if let Ok(plugin_uri) = std::env::var("PLUGIN_URI") {
            self.pinterest.plugin_uri = plugin_uri;
        }
        Ok(())
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> Result<RelayConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path))?;
    let config: RelayConfig =
        toml::from_str(&contents).with_context(|| format!("Failed to parse config file {}", path))?;
    Ok(config)
}
