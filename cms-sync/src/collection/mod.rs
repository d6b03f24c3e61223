//! Managed collection capability.
//!
//! The collection is the only source of truth for what has been synced. It
//! offers coarse bulk verbs (add, remove) plus a small string key-value
//! store ("plugin data") for sync metadata; nothing finer-grained is assumed.
//!
//! # Backends
//!
//! - [`MemoryCollection`] - in-process, for tests and dry runs
//! - [`SqliteCollection`] - persistent, used by the CLI

mod memory;
mod sqlite;

pub use memory::MemoryCollection;
pub use sqlite::SqliteCollection;

use crate::types::{Field, ItemInput};
use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

#[async_trait]
pub trait ManagedCollection: Send + Sync {
    /// Ids of every item currently in the collection.
    async fn get_item_ids(&self) -> Result<Vec<String>>;

    /// Current field schema.
    async fn get_fields(&self) -> Result<Vec<Field>>;

    /// Replace the field schema.
    async fn set_fields(&self, fields: &[Field]) -> Result<()>;

    /// Insert items, overwriting any existing item with the same id. Later
    /// records in `items` win over earlier ones with the same id.
    async fn add_items(&self, items: &[ItemInput]) -> Result<()>;

    /// Remove items by id. Unknown ids are ignored.
    async fn remove_items(&self, ids: &[String]) -> Result<()>;

    async fn get_plugin_data(&self, key: &str) -> Result<Option<String>>;

    async fn set_plugin_data(&self, key: &str, value: &str) -> Result<()>;

    /// Write several plugin data entries as one unit.
    ///
    /// The default writes them in order and, if a write fails, puts back the
    /// previous values of the entries already written. Entries that did not
    /// exist before cannot be removed again, so backends with transactions
    /// should override this.
    async fn set_plugin_data_entries(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut previous = Vec::with_capacity(entries.len());
        for (key, _) in entries {
            previous.push(self.get_plugin_data(key).await?);
        }

        for (written, (key, value)) in entries.iter().enumerate() {
            if let Err(e) = self.set_plugin_data(key, value).await {
                for ((key, _), old) in entries[..written].iter().zip(&previous) {
                    if let Some(old) = old {
                        if let Err(restore_err) = self.set_plugin_data(key, old).await {
                            warn!(
                                key = %key,
                                error = %restore_err,
                                "Failed to restore plugin data"
                            );
                        }
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }
}
