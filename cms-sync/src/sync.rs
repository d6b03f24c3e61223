//! Collection sync engine.
//!
//! Reconciles a managed collection with a freshly fetched [`DataSource`],
//! using the value of a user-chosen slug field as the item identity.
//!
//! ```text
//! existing ids ──┐
//!                ├─ unsynced = existing − valid slugs ──► remove_items
//! fetched items ─┤
//!                └─ valid slug → project onto fields ───► add_items
//!                                                            │
//!                                        plugin data ◄───────┘ (only on success)
//! ```
//!
//! The slug value is the only identity. Two fetched items with the same slug
//! collapse into one collection item; the later one wins.

use crate::collection::ManagedCollection;
use crate::error::SyncError;
use crate::fields::merge_fields_with_existing_fields;
use crate::types::{plugin_keys, DataSource, Field, FieldData, ItemInput};
use std::collections::HashSet;
use tracing::{info, warn};

/// What a sync changed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SyncReport {
    /// Ids removed because they no longer exist upstream
    pub removed: Vec<String>,
    /// Ids added or overwritten, in source order, each listed once
    pub upserted: Vec<String>,
    /// Source indices of items skipped for lacking a valid slug
    pub skipped: Vec<usize>,
    /// Slug values shared by more than one fetched item
    pub duplicate_slugs: Vec<String>,
}

/// Bring `collection` in line with `data_source`.
///
/// Only fields listed in `fields` are written. Plugin data (credential,
/// source id, slug field id) is written last; if any step fails the error is
/// returned and the metadata is left as it was.
pub async fn sync_collection(
    collection: &dyn ManagedCollection,
    data_source: &DataSource,
    fields: &[Field],
    slug_field: &Field,
    credential: &str,
) -> Result<SyncReport, SyncError> {
    let existing_ids = collection
        .get_item_ids()
        .await
        .map_err(SyncError::collection)?;
    let mut unsynced: HashSet<&str> = existing_ids.iter().map(String::as_str).collect();
    let field_ids: HashSet<&str> = fields.iter().map(|f| f.id.as_str()).collect();

    let mut report = SyncReport::default();
    let mut seen: HashSet<String> = HashSet::new();
    let mut items = Vec::with_capacity(data_source.items.len());

    for (index, item) in data_source.items.iter().enumerate() {
        let Some(slug) = item
            .get(&slug_field.id)
            .and_then(|value| value.as_non_empty_str())
        else {
            warn!(
                index,
                slug_field = %slug_field.id,
                "Skipping item without a valid slug"
            );
            report.skipped.push(index);
            continue;
        };

        unsynced.remove(slug);

        let field_data: FieldData = item
            .iter()
            .filter(|(id, _)| field_ids.contains(id.as_str()))
            .map(|(id, value)| (id.clone(), value.clone()))
            .collect();

        if seen.insert(slug.to_string()) {
            report.upserted.push(slug.to_string());
        } else {
            warn!(slug = %slug, "Duplicate slug, later item overwrites earlier one");
            if !report.duplicate_slugs.iter().any(|s| s == slug) {
                report.duplicate_slugs.push(slug.to_string());
            }
        }

        items.push(ItemInput {
            id: slug.to_string(),
            slug: slug.to_string(),
            draft: false,
            field_data,
        });
    }

    // Keep the collection's own order for removals.
    report.removed = existing_ids
        .iter()
        .filter(|id| unsynced.contains(id.as_str()))
        .cloned()
        .collect();

    // Removals first, so a reused slug cannot collide with a stale item.
    collection
        .remove_items(&report.removed)
        .await
        .map_err(SyncError::collection)?;
    collection
        .add_items(&items)
        .await
        .map_err(SyncError::collection)?;

    write_sync_metadata(collection, credential, &data_source.id, &slug_field.id).await?;

    info!(
        source_id = %data_source.id,
        removed = report.removed.len(),
        upserted = report.upserted.len(),
        skipped = report.skipped.len(),
        "Collection synced"
    );

    Ok(report)
}

async fn write_sync_metadata(
    collection: &dyn ManagedCollection,
    credential: &str,
    source_id: &str,
    slug_field_id: &str,
) -> Result<(), SyncError> {
    // Credential last: a failed write never pairs a new token with an old board.
    collection
        .set_plugin_data_entries(&[
            (plugin_keys::BOARD_ID, source_id),
            (plugin_keys::SLUG_FIELD_ID, slug_field_id),
            (plugin_keys::ACCESS_TOKEN, credential),
        ])
        .await
        .map_err(SyncError::collection)
}

/// Interactive setup: pick fields, keep the user's labels, store the
/// schema, then sync.
///
/// `selected` limits the fields to sync (all source fields when `None`).
/// The slug field must exist in the source schema but need not be selected.
pub async fn configure_and_sync(
    collection: &dyn ManagedCollection,
    data_source: &DataSource,
    selected: Option<&[String]>,
    slug_field_id: &str,
    credential: &str,
) -> Result<SyncReport, SyncError> {
    let slug_field = data_source
        .fields
        .iter()
        .find(|f| f.id == slug_field_id)
        .ok_or_else(|| SyncError::UnknownSlugField(slug_field_id.to_string()))?;

    let fresh: Vec<Field> = data_source
        .fields
        .iter()
        .filter(|f| selected.map_or(true, |ids| ids.iter().any(|id| *id == f.id)))
        .cloned()
        .collect();
    let existing = collection.get_fields().await.map_err(SyncError::collection)?;
    let fields = merge_fields_with_existing_fields(&fresh, &existing);

    collection
        .set_fields(&fields)
        .await
        .map_err(SyncError::collection)?;

    sync_collection(collection, data_source, &fields, slug_field, credential).await
}
