//! Environment configuration for the `cms-sync` binary.

use crate::connectors::pinterest::config::BASE_URL;

const DEFAULT_DB_PATH: &str = "collection.db";
const DEFAULT_RELAY_URL: &str = "http://localhost:8787";

#[derive(Debug, Clone, PartialEq)]
pub struct SyncCliConfig {
    /// SQLite file backing the managed collection
    pub db_path: String,
    /// Pinterest API base URL
    pub api_url: String,
    /// OAuth relay base URL
    pub relay_url: String,
}

impl SyncCliConfig {
    /// Read `CMS_SYNC_DB`, `PINTEREST_API_URL` and `PINSYNC_RELAY_URL`.
    pub fn from_env() -> Self {
        Self {
            db_path: std::env::var("CMS_SYNC_DB").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string()),
            api_url: std::env::var("PINTEREST_API_URL").unwrap_or_else(|_| BASE_URL.to_string()),
            relay_url: std::env::var("PINSYNC_RELAY_URL")
                .unwrap_or_else(|_| DEFAULT_RELAY_URL.to_string()),
        }
    }
}
