//! Client side of the OAuth relay handshake.
//!
//! 1. [`RelayClient::authorize`] → provider URL for the user + readKey
//! 2. [`RelayClient::wait_for_token`] polls `/poll` with the readKey until
//!    the relay hands over the token, the readKey expires, the timeout
//!    passes, or the cancellation token fires

use crate::error::SyncError;
use pinsync::relay::{AuthorizeResponse, PollRequest};
use pinsync::TokenPayload;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1500);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Result of a single `/poll` call.
#[derive(Debug, PartialEq)]
pub enum PollStatus {
    Pending,
    Ready(String),
    Expired,
}

/// HTTP client for the OAuth relay.
pub struct RelayClient {
    http_client: Client,
    base_url: String,
    poll_interval: Duration,
    timeout: Duration,
}

impl RelayClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override polling cadence and overall deadline.
    pub fn with_timing(mut self, poll_interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.timeout = timeout;
        self
    }

    /// Start a handoff.
    pub async fn authorize(&self) -> Result<AuthorizeResponse, SyncError> {
        let response = self
            .http_client
            .post(format!("{}/authorize", self.base_url))
            .send()
            .await
            .map_err(|e| SyncError::Fetch(format!("Failed to reach relay: {}", e)))?;

        if !response.status().is_success() {
            return Err(SyncError::Fetch(format!(
                "Relay /authorize failed with status {}",
                response.status()
            )));
        }

        response
            .json::<AuthorizeResponse>()
            .await
            .map_err(|e| SyncError::Fetch(format!("Failed to parse /authorize response: {}", e)))
    }

    /// Poll once.
    pub async fn poll_once(&self, read_key: &str) -> Result<PollStatus, SyncError> {
        let request = PollRequest {
            read_key: Some(read_key.to_string()),
        };
        let response = self
            .http_client
            .post(format!("{}/poll", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| SyncError::Fetch(format!("Failed to reach relay: {}", e)))?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(PollStatus::Pending),
            StatusCode::NOT_FOUND => Ok(PollStatus::Expired),
            StatusCode::OK => {
                let payload = response.json::<TokenPayload>().await.map_err(|e| {
                    SyncError::Fetch(format!("Failed to parse /poll response: {}", e))
                })?;
                Ok(PollStatus::Ready(payload.access_token))
            }
            status => Err(SyncError::Fetch(format!(
                "Relay /poll failed with status {}",
                status
            ))),
        }
    }

    /// Poll until the token is available.
    pub async fn wait_for_token(
        &self,
        read_key: &str,
        cancel: &CancellationToken,
    ) -> Result<String, SyncError> {
        let deadline = tokio::time::Instant::now() + self.timeout;

        loop {
            let status = tokio::select! {
                _ = cancel.cancelled() => return Err(SyncError::Cancelled),
                status = self.poll_once(read_key) => status?,
            };

            match status {
                PollStatus::Ready(token) => {
                    info!("Received access token from relay");
                    return Ok(token);
                }
                PollStatus::Expired => {
                    return Err(SyncError::Authorization(
                        "Authorization expired or was already used".to_string(),
                    ));
                }
                PollStatus::Pending => debug!("Authorization pending"),
            }

            if tokio::time::Instant::now() + self.poll_interval > deadline {
                return Err(SyncError::Authorization(
                    "Timed out waiting for authorization".to_string(),
                ));
            }

            tokio::select! {
                _ = cancel.cancelled() => return Err(SyncError::Cancelled),
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }
}
