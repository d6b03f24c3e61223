pub mod api;
pub mod config;
pub mod transformer;

use crate::error::SyncError;
use crate::source::DataSourceAdapter;
use crate::types::{DataSource, Field};
use async_trait::async_trait;
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use self::api::PinterestClient;
use self::config::{pin_fields, BASE_URL};
use self::transformer::pin_to_item;

/// Pinterest adapter: pulls every pin of a board into a [`DataSource`].
pub struct PinterestAdapter {
    base_url: String,
}

impl PinterestAdapter {
    /// Create an adapter using the real Pinterest API base URL.
    pub fn new() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
        }
    }

    /// Create an adapter with a custom API base URL (for testing).
    pub fn with_base_url(base_url: String) -> Self {
        Self { base_url }
    }
}

impl Default for PinterestAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSourceAdapter for PinterestAdapter {
    fn name(&self) -> &str {
        "pinterest"
    }

    fn fields(&self) -> Vec<Field> {
        pin_fields()
    }

    async fn fetch(
        &self,
        board_id: &str,
        credential: &str,
        cancel: &CancellationToken,
    ) -> Result<DataSource, SyncError> {
        let client = PinterestClient::with_base_url(credential.to_string(), self.base_url.clone());
        let mut items = Vec::new();
        let mut bookmark: Option<String> = None;
        let mut seen_bookmarks: HashSet<String> = HashSet::new();

        // Follow the bookmark cursor until the last page.
        loop {
            if cancel.is_cancelled() {
                return Err(SyncError::Cancelled);
            }

            let page = tokio::select! {
                _ = cancel.cancelled() => return Err(SyncError::Cancelled),
                page = client.fetch_pins_page(board_id, bookmark.as_deref()) => {
                    page.map_err(|e| SyncError::Fetch(format!("{:#}", e)))?
                }
            };

            debug!(board_id = %board_id, pins = page.items.len(), "Fetched pins page");
            items.extend(page.items.iter().map(pin_to_item));

            match page.bookmark.filter(|b| !b.is_empty()) {
                Some(next) if seen_bookmarks.insert(next.clone()) => bookmark = Some(next),
                Some(next) => {
                    warn!(
                        board_id = %board_id,
                        bookmark = %next,
                        "Bookmark repeated, stopping pagination"
                    );
                    break;
                }
                None => break,
            }
        }

        info!(board_id = %board_id, items = items.len(), "Fetched board");

        Ok(DataSource {
            id: board_id.to_string(),
            fields: pin_fields(),
            items,
        })
    }
}
