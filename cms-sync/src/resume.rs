//! Non-interactive resync of a previously configured collection.

use crate::collection::ManagedCollection;
use crate::error::SyncError;
use crate::host::{NotifyVariant, PluginHost, PluginMode, SYNC_METHODS};
use crate::source::DataSourceAdapter;
use crate::sync::{sync_collection, SyncReport};
use crate::types::plugin_keys;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// Metadata a previous successful sync left on the collection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PreviousSync {
    pub board_id: Option<String>,
    pub slug_field_id: Option<String>,
    pub access_token: Option<String>,
}

impl PreviousSync {
    /// Read the sync metadata keys from the collection's plugin data.
    pub async fn load(collection: &dyn ManagedCollection) -> Result<Self, SyncError> {
        let board_id = collection
            .get_plugin_data(plugin_keys::BOARD_ID)
            .await
            .map_err(SyncError::collection)?;
        let slug_field_id = collection
            .get_plugin_data(plugin_keys::SLUG_FIELD_ID)
            .await
            .map_err(SyncError::collection)?;
        let access_token = collection
            .get_plugin_data(plugin_keys::ACCESS_TOKEN)
            .await
            .map_err(SyncError::collection)?;

        Ok(Self {
            board_id,
            slug_field_id,
            access_token,
        })
    }
}

/// Outcome of [`sync_existing_collection`].
#[derive(Debug, Default, PartialEq)]
pub struct ResumeOutcome {
    pub did_sync: bool,
    pub report: Option<SyncReport>,
}

impl ResumeOutcome {
    fn declined() -> Self {
        Self::default()
    }
}

/// Resync using the stored metadata and the collection's existing schema.
///
/// Declines quietly (`did_sync == false`) when there is nothing to resume,
/// the host did not ask for a managed resync, or the sync methods are not
/// permitted. Fetch and sync failures are logged and reported to the user
/// through the host, never returned. A cancelled resume reports nothing.
pub async fn sync_existing_collection(
    host: &dyn PluginHost,
    collection: &dyn ManagedCollection,
    adapter: &dyn DataSourceAdapter,
    previous: &PreviousSync,
    cancel: &CancellationToken,
) -> ResumeOutcome {
    let (Some(board_id), Some(access_token)) = (&previous.board_id, &previous.access_token) else {
        debug!("No stored board or credential, resume declined");
        return ResumeOutcome::declined();
    };

    let Some(slug_field_id) = &previous.slug_field_id else {
        debug!("No stored slug field, resume declined");
        return ResumeOutcome::declined();
    };

    if host.mode() != PluginMode::SyncManagedCollection {
        debug!(mode = ?host.mode(), "Not a managed resync, resume declined");
        return ResumeOutcome::declined();
    }

    if !host.is_allowed_to(SYNC_METHODS) {
        debug!("Sync methods not permitted, resume declined");
        return ResumeOutcome::declined();
    }

    match resume(collection, adapter, board_id, slug_field_id, access_token, cancel).await {
        Ok(report) => ResumeOutcome {
            did_sync: true,
            report: Some(report),
        },
        Err(SyncError::Cancelled) => {
            debug!(board_id = %board_id, "Resume cancelled");
            ResumeOutcome::declined()
        }
        Err(SyncError::UnknownSlugField(id)) => {
            host.notify(
                &format!(
                    "No field matches the slug field id \u{201c}{}\u{201d}. Sync will not be performed.",
                    id
                ),
                NotifyVariant::Error,
            );
            ResumeOutcome::declined()
        }
        Err(e) => {
            error!(board_id = %board_id, error = %e, "Resume failed");
            host.notify(
                &format!(
                    "Failed to sync collection \u{201c}{}\u{201d}. Check the logs for more details.",
                    board_id
                ),
                NotifyVariant::Error,
            );
            ResumeOutcome::declined()
        }
    }
}

async fn resume(
    collection: &dyn ManagedCollection,
    adapter: &dyn DataSourceAdapter,
    board_id: &str,
    slug_field_id: &str,
    access_token: &str,
    cancel: &CancellationToken,
) -> Result<SyncReport, SyncError> {
    let data_source = adapter.fetch(board_id, access_token, cancel).await?;
    if cancel.is_cancelled() {
        return Err(SyncError::Cancelled);
    }
    let existing_fields = collection.get_fields().await.map_err(SyncError::collection)?;

    let slug_field = data_source
        .fields
        .iter()
        .find(|f| f.id == slug_field_id)
        .ok_or_else(|| SyncError::UnknownSlugField(slug_field_id.to_string()))?;

    sync_collection(
        collection,
        &data_source,
        &existing_fields,
        slug_field,
        access_token,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::MemoryCollection;
    use crate::host::{ProtectedMethod, StaticHost};
    use crate::types::{DataSource, Field, FieldData, FieldType, FieldValue, ItemInput};
    use async_trait::async_trait;

    fn schema() -> Vec<Field> {
        vec![
            Field::new("id", "ID", FieldType::String),
            Field::new("title", "Title", FieldType::String),
        ]
    }

    /// Adapter serving a canned result.
    struct FixedAdapter(Result<DataSource, SyncError>);

    /// Adapter that fires the cancellation token while "fetching".
    struct CancellingAdapter;

    #[async_trait]
    impl DataSourceAdapter for CancellingAdapter {
        fn name(&self) -> &str {
            "cancelling"
        }

        fn fields(&self) -> Vec<Field> {
            schema()
        }

        async fn fetch(
            &self,
            _source_id: &str,
            _credential: &str,
            cancel: &CancellationToken,
        ) -> Result<DataSource, SyncError> {
            cancel.cancel();
            Err(SyncError::Cancelled)
        }
    }

    #[async_trait]
    impl DataSourceAdapter for FixedAdapter {
        fn name(&self) -> &str {
            "fixed"
        }

        fn fields(&self) -> Vec<Field> {
            schema()
        }

        async fn fetch(
            &self,
            _source_id: &str,
            _credential: &str,
            _cancel: &CancellationToken,
        ) -> Result<DataSource, SyncError> {
            self.0.clone()
        }
    }

    fn pins(ids: &[&str]) -> FixedAdapter {
        let items = ids
            .iter()
            .map(|id| {
                let mut item = FieldData::new();
                item.insert("id".to_string(), FieldValue::new(*id));
                item.insert("title".to_string(), FieldValue::new(format!("Pin {}", id)));
                item
            })
            .collect();
        FixedAdapter(Ok(DataSource {
            id: "board1".to_string(),
            fields: schema(),
            items,
        }))
    }

    fn previous() -> PreviousSync {
        PreviousSync {
            board_id: Some("board1".to_string()),
            slug_field_id: Some("id".to_string()),
            access_token: Some("tok".to_string()),
        }
    }

    /// Collection configured with only the title field, renamed.
    fn configured() -> MemoryCollection {
        MemoryCollection::with_items(
            vec![Field::new("title", "Headline", FieldType::String)],
            vec![ItemInput {
                id: "old".to_string(),
                slug: "old".to_string(),
                draft: false,
                field_data: FieldData::new(),
            }],
        )
    }

    fn resync_host() -> StaticHost {
        StaticHost::permissive(PluginMode::SyncManagedCollection)
    }

    #[tokio::test]
    async fn test_load_previous_sync() {
        let collection = MemoryCollection::new();
        assert_eq!(PreviousSync::load(&collection).await.unwrap(), PreviousSync::default());

        collection.set_plugin_data(plugin_keys::BOARD_ID, "b").await.unwrap();
        collection.set_plugin_data(plugin_keys::SLUG_FIELD_ID, "id").await.unwrap();
        collection.set_plugin_data(plugin_keys::ACCESS_TOKEN, "t").await.unwrap();

        let previous = PreviousSync::load(&collection).await.unwrap();
        assert_eq!(previous.board_id.as_deref(), Some("b"));
        assert_eq!(previous.slug_field_id.as_deref(), Some("id"));
        assert_eq!(previous.access_token.as_deref(), Some("t"));
    }

    #[tokio::test]
    async fn test_resume_syncs_with_existing_fields() {
        let collection = configured();
        let outcome = sync_existing_collection(
            &resync_host(),
            &collection,
            &pins(&["p1", "p2"]),
            &previous(),
            &CancellationToken::new(),
        )
        .await;

        assert!(outcome.did_sync);
        assert_eq!(outcome.report.unwrap().removed, vec!["old"]);
        let item = collection.item("p1").unwrap();
        assert_eq!(item.field_data.keys().collect::<Vec<_>>(), vec!["title"]);
        assert_eq!(
            collection.get_fields().await.unwrap(),
            vec![Field::new("title", "Headline", FieldType::String)]
        );
    }

    #[tokio::test]
    async fn test_declines_without_metadata() {
        let collection = configured();
        let mut previous = previous();
        previous.access_token = None;

        let outcome = sync_existing_collection(
            &resync_host(),
            &collection,
            &pins(&["p1"]),
            &previous,
            &CancellationToken::new(),
        )
        .await;

        assert!(!outcome.did_sync);
        assert_eq!(collection.get_item_ids().await.unwrap(), vec!["old"]);
    }

    #[tokio::test]
    async fn test_declines_outside_managed_resync() {
        let host = StaticHost::permissive(PluginMode::ConfigureManagedCollection);
        let outcome = sync_existing_collection(
            &host,
            &configured(),
            &pins(&["p1"]),
            &previous(),
            &CancellationToken::new(),
        )
        .await;

        assert!(!outcome.did_sync);
        assert!(host.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_declines_without_permission() {
        let host = StaticHost::new(
            PluginMode::SyncManagedCollection,
            &[ProtectedMethod::AddItems, ProtectedMethod::RemoveItems],
        );
        let collection = configured();

        let outcome = sync_existing_collection(
            &host,
            &collection,
            &pins(&["p1"]),
            &previous(),
            &CancellationToken::new(),
        )
        .await;

        assert!(!outcome.did_sync);
        assert_eq!(collection.get_item_ids().await.unwrap(), vec!["old"]);
    }

    #[tokio::test]
    async fn test_missing_slug_field_notifies() {
        let host = resync_host();
        let mut previous = previous();
        previous.slug_field_id = Some("removed_field".to_string());

        let outcome = sync_existing_collection(
            &host,
            &configured(),
            &pins(&["p1"]),
            &previous,
            &CancellationToken::new(),
        )
        .await;

        assert!(!outcome.did_sync);
        let notifications = host.notifications();
        assert_eq!(notifications.len(), 1);
        assert!(notifications[0].0.contains("removed_field"));
        assert_eq!(notifications[0].1, NotifyVariant::Error);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_swallowed() {
        let host = resync_host();
        let collection = configured();
        let adapter = FixedAdapter(Err(SyncError::Fetch("503".to_string())));

        let outcome = sync_existing_collection(
            &host,
            &collection,
            &adapter,
            &previous(),
            &CancellationToken::new(),
        )
        .await;

        assert!(!outcome.did_sync);
        assert!(host.notifications()[0].0.contains("board1"));
        assert_eq!(
            collection.get_plugin_data(plugin_keys::BOARD_ID).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_cancelled_resume_is_silent() {
        let host = resync_host();
        let collection = configured();

        let outcome = sync_existing_collection(
            &host,
            &collection,
            &CancellingAdapter,
            &previous(),
            &CancellationToken::new(),
        )
        .await;

        assert!(!outcome.did_sync);
        assert!(host.notifications().is_empty());
        assert_eq!(collection.get_item_ids().await.unwrap(), vec!["old"]);
    }

    #[tokio::test]
    async fn test_cancelled_after_fetch_does_not_sync() {
        let host = resync_host();
        let collection = configured();
        let cancel = CancellationToken::new();
        cancel.cancel();

        // The canned adapter ignores the token, so the fetch itself succeeds.
        let outcome = sync_existing_collection(
            &host,
            &collection,
            &pins(&["p1"]),
            &previous(),
            &cancel,
        )
        .await;

        assert!(!outcome.did_sync);
        assert!(host.notifications().is_empty());
        assert_eq!(collection.get_item_ids().await.unwrap(), vec!["old"]);
    }
}
