use crate::error::SyncError;
use crate::types::{DataSource, Field};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Adapter turning an upstream API into a [`DataSource`].
///
/// Adapters are stateless: the source id and credential are passed on every
/// call, and two calls against the same upstream state return equivalent
/// snapshots.
///
/// # Contract
/// - Every item carries a value for every field in [`DataSourceAdapter::fields`]
/// - Network and auth failures return [`SyncError::Fetch`], never retried
/// - If `cancel` fires, in-flight requests are dropped and
///   [`SyncError::Cancelled`] is returned
#[async_trait]
pub trait DataSourceAdapter: Send + Sync {
    /// Returns the unique identifier for this adapter (e.g. "pinterest").
    fn name(&self) -> &str;

    /// The fixed field schema every item is mapped onto.
    fn fields(&self) -> Vec<Field>;

    /// Fetch all items of `source_id`.
    async fn fetch(
        &self,
        source_id: &str,
        credential: &str,
        cancel: &CancellationToken,
    ) -> Result<DataSource, SyncError>;
}
