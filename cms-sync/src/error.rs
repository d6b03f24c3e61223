/// Errors surfaced by fetching and syncing.
///
/// Invalid slugs are not errors: offending items are skipped and reported
/// in [`crate::sync::SyncReport::skipped`].
#[derive(Debug, Clone, PartialEq)]
pub enum SyncError {
    /// Network or HTTP failure talking to the upstream API or the relay
    Fetch(String),
    /// The cancellation token fired while work was in flight
    Cancelled,
    /// Capability check failed, credential missing, or handoff expired
    Authorization(String),
    /// Reading or writing the managed collection failed
    Collection(String),
    /// The chosen slug field is not part of the source schema
    UnknownSlugField(String),
}

impl SyncError {
    pub fn collection(e: anyhow::Error) -> Self {
        SyncError::Collection(format!("{:#}", e))
    }
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncError::Fetch(msg) => write!(f, "Fetch failed: {}", msg),
            SyncError::Cancelled => write!(f, "Operation cancelled"),
            SyncError::Authorization(msg) => write!(f, "Not authorized: {}", msg),
            SyncError::Collection(msg) => write!(f, "Collection error: {}", msg),
            SyncError::UnknownSlugField(id) => write!(f, "No field matches the slug field id {}", id),
        }
    }
}

impl std::error::Error for SyncError {}
