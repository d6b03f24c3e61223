use anyhow::{anyhow, Context, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::config::PAGE_SIZE;

/// Cover image of a pin.
#[derive(Debug, Default, Deserialize)]
pub struct PinMedia {
    pub image_cover_url: Option<String>,
}

/// Pinterest pin. Any attribute, `id` included, may be absent or null.
#[derive(Debug, Deserialize)]
pub struct Pin {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub media: Option<PinMedia>,
}

/// One page of a board's pins. `bookmark` is the cursor of the next page.
#[derive(Debug, Deserialize)]
pub struct PinPage {
    pub items: Vec<Pin>,
    #[serde(default)]
    pub bookmark: Option<String>,
}

/// HTTP client for the Pinterest v5 REST API.
///
/// Authenticates with a Bearer token.
pub struct PinterestClient {
    access_token: String,
    http_client: Client,
    base_url: String,
}

impl PinterestClient {
    /// Create a client against `base_url` (the v5 API root, or a mock server).
    pub fn with_base_url(access_token: String, base_url: String) -> Self {
        let http_client = Client::builder()
            .user_agent("cms-sync/1.0")
            .build()
            .unwrap_or_default();
        Self {
            access_token,
            http_client,
            base_url,
        }
    }

    /// Fetch one page of pins on a board.
    pub async fn fetch_pins_page(&self, board_id: &str, bookmark: Option<&str>) -> Result<PinPage> {
        let mut url = format!(
            "{}/boards/{}/pins?page_size={}",
            self.base_url,
            urlencoding::encode(board_id),
            PAGE_SIZE
        );
        if let Some(bookmark) = bookmark {
            url.push_str("&bookmark=");
            url.push_str(&urlencoding::encode(bookmark));
        }

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .context("Failed to send fetch_pins request")?;

        check_response_status(&response)?;
        response
            .json::<PinPage>()
            .await
            .context("Failed to parse pins response")
    }
}

/// Check the response status and map known error codes to descriptive errors.
///
/// - 401 → auth error (token expired or invalid)
/// - 404 → board not found or not visible to the token
/// - Other non-2xx → generic API error
fn check_response_status(response: &reqwest::Response) -> Result<()> {
    match response.status() {
        StatusCode::UNAUTHORIZED => Err(anyhow!("Pinterest auth error: token expired or invalid")),
        StatusCode::NOT_FOUND => Err(anyhow!("Pinterest board not found")),
        s if !s.is_success() => Err(anyhow!("Pinterest API error: {}", s)),
        _ => Ok(()),
    }
}
