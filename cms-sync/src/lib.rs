//! CMS Sync - keeps a managed CMS collection in line with a Pinterest board.
//!
//! # Architecture
//!
//! ```text
//!      OAuth relay (pinsync)
//!          ↓  readKey / token handoff
//! ┌─────────────────────────────────────────┐
//! │     DataSourceAdapter (Pinterest)        │
//! │  - Page through board pins               │
//! │  - Transform pins to field data          │
//! └─────────────────────────────────────────┘
//!          ↓  DataSource
//! ┌─────────────────────────────────────────┐
//! │     Sync engine                          │
//! │  - Merge field labels                    │
//! │  - Remove stale items, upsert by slug    │
//! │  - Record board / slug field / token     │
//! └─────────────────────────────────────────┘
//!          ↓
//!    ManagedCollection (memory, SQLite)
//! ```
//!
//! # Core Types
//!
//! - [`DataSourceAdapter`] - Fetches a [`DataSource`] for a source id
//! - [`ManagedCollection`] - The collection the plugin owns
//! - [`PluginHost`] - Mode, permissions and notifications of the host
//! - [`SyncReport`] - What a sync removed, upserted and skipped
//!
//! # Syncing a board
//!
//! ```no_run
//! use cms_sync::{configure_and_sync, DataSourceAdapter, MemoryCollection, PinterestAdapter};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), cms_sync::SyncError> {
//! let adapter = PinterestAdapter::new();
//! let collection = MemoryCollection::new();
//! let cancel = CancellationToken::new();
//!
//! let source = adapter.fetch("board123", "access-token", &cancel).await?;
//! let report = configure_and_sync(&collection, &source, None, "id", "access-token").await?;
//! println!("{} pins synced", report.upserted.len());
//! # Ok(())
//! # }
//! ```

pub mod auth_client;
pub mod collection;
pub mod config;
pub mod connectors;
pub mod error;
pub mod fields;
pub mod host;
pub mod resume;
pub mod source;
pub mod sync;
pub mod types;

pub use auth_client::RelayClient;
pub use collection::{ManagedCollection, MemoryCollection, SqliteCollection};
pub use connectors::pinterest::PinterestAdapter;
pub use error::SyncError;
pub use host::{PluginHost, PluginMode, StaticHost};
pub use resume::{sync_existing_collection, PreviousSync};
pub use source::DataSourceAdapter;
pub use sync::{configure_and_sync, sync_collection, SyncReport};
pub use types::{DataSource, Field, FieldType, FieldValue, ItemInput};
