//! Two-key token handoff.
//!
//! A handoff pairs a public `readKey` (given to the plugin) with a private
//! `writeKey` (sent to the provider as the OAuth `state`):
//!
//! ```text
//! begin()     readKey → writeKey                    PENDING_AUTH
//! complete()  writeKey → {"access_token": ...}      TOKEN_READY
//! poll()      both entries deleted                  CONSUMED
//! (ttl)       entries vanish                        EXPIRED
//! ```

use super::exchange::TokenPayload;
use crate::store::EphemeralStore;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Keys generated for a new handoff.
#[derive(Clone, Debug)]
pub struct HandoffKeys {
    pub read_key: String,
    pub write_key: String,
}

/// Result of polling a readKey.
#[derive(Debug, PartialEq)]
pub enum PollOutcome {
    /// Unknown or expired readKey; the caller should give up.
    Unknown,
    /// The user has not finished authorizing yet.
    Pending,
    /// Token delivered; both keys are gone.
    Ready(TokenPayload),
}

/// Handoff state machine over an [`EphemeralStore`].
#[derive(Clone)]
pub struct HandoffManager {
    store: Arc<dyn EphemeralStore>,
    ttl: Duration,
}

impl HandoffManager {
    pub fn new(store: Arc<dyn EphemeralStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Generate a fresh key pair and record `readKey → writeKey`.
    pub async fn begin(&self) -> Result<HandoffKeys> {
        let keys = HandoffKeys {
            read_key: Uuid::new_v4().to_string(),
            write_key: Uuid::new_v4().to_string(),
        };

        self.store
            .put(&keys.read_key, keys.write_key.clone(), self.ttl)
            .await
            .context("Failed to store readKey")?;

        Ok(keys)
    }

    /// Attach a token to `writeKey`.
    ///
    /// The writeKey is not checked against a pending readKey; a token stored
    /// under a key nobody polls for simply expires.
    pub async fn complete(&self, write_key: &str, token: &TokenPayload) -> Result<()> {
        let value = serde_json::to_string(token).context("Failed to serialize token")?;
        self.store
            .put(write_key, value, self.ttl)
            .await
            .context("Failed to store token")
    }

    /// Look up the token for `readKey`, consuming the handoff when ready.
    pub async fn poll(&self, read_key: &str) -> Result<PollOutcome> {
        let Some(write_key) = self
            .store
            .get(read_key)
            .await
            .context("Failed to read readKey")?
        else {
            return Ok(PollOutcome::Unknown);
        };

        let Some(token_data) = self
            .store
            .take(&write_key)
            .await
            .context("Failed to read token")?
        else {
            return Ok(PollOutcome::Pending);
        };

        self.store
            .delete(read_key)
            .await
            .context("Failed to delete readKey")?;

        let token: TokenPayload =
            serde_json::from_str(&token_data).context("Stored token is not valid JSON")?;
        Ok(PollOutcome::Ready(token))
    }
}
