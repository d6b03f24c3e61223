//! Ephemeral key-value storage for the OAuth handoff.
//!
//! The relay keeps no state of its own between requests. Everything it needs
//! to remember (readKey → writeKey, writeKey → token) lives in a store that
//! supports per-entry time-to-live. Expired entries behave exactly like
//! missing ones.
//!
//! # Backends
//!
//! - [`MemoryStore`] - in-process `DashMap` with lazy expiry plus a periodic
//!   sweep ([`run_store_cleanup`])
//!
//! Any durable cache with TTL support can satisfy [`EphemeralStore`].

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Key-value capability with per-entry expiry.
#[async_trait]
pub trait EphemeralStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous entry. The entry
    /// vanishes once `ttl` has elapsed.
    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    /// Read a live entry.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Remove an entry. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Read and remove an entry in one step.
    ///
    /// The default is a plain get followed by a delete, so two concurrent
    /// callers may both observe the value. Backends with an atomic
    /// remove should override it.
    async fn take(&self, key: &str) -> Result<Option<String>> {
        let value = self.get(key).await?;
        if value.is_some() {
            self.delete(key).await?;
        }
        Ok(value)
    }
}

#[derive(Clone, Debug)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// In-memory [`EphemeralStore`].
///
/// Expired entries are hidden on read and physically removed by
/// [`MemoryStore::cleanup_expired`].
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry.
    pub fn cleanup_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.is_live(now));
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn count(&self) -> usize {
        self.entries.len()
    }
}

#[async_trait]
impl EphemeralStore for MemoryStore {
    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        Ok(self
            .entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        Ok(self
            .entries
            .remove(key)
            .map(|(_, entry)| entry)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value))
    }
}

/// Background task to periodically sweep expired entries.
pub async fn run_store_cleanup(store: MemoryStore, interval_seconds: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

    loop {
        interval.tick().await;
        store.cleanup_expired();
        tracing::debug!("Handoff store cleanup complete, {} entries remaining", store.count());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(300);

    #[tokio::test]
    async fn test_put_and_get() {
        let store = MemoryStore::new();
        store.put("read", "write".to_string(), TTL).await.unwrap();

        assert_eq!(store.get("read").await.unwrap(), Some("write".to_string()));
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStore::new();
        store.put("k", "v".to_string(), TTL).await.unwrap();

        store.delete("k").await.unwrap();
        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_take_is_single_use() {
        let store = MemoryStore::new();
        store.put("k", "v".to_string(), TTL).await.unwrap();

        assert_eq!(store.take("k").await.unwrap(), Some("v".to_string()));
        assert_eq!(store.take("k").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let store = MemoryStore::new();
        store.put("k", "v".to_string(), TTL).await.unwrap();

        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(store.get("k").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
        assert_eq!(store.take("k").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_removes_expired() {
        let store = MemoryStore::new();
        store.put("short", "a".to_string(), Duration::from_secs(1)).await.unwrap();
        store.put("long", "b".to_string(), TTL).await.unwrap();
        assert_eq!(store.count(), 2);

        tokio::time::advance(Duration::from_secs(2)).await;
        store.cleanup_expired();

        assert_eq!(store.count(), 1);
        assert!(store.get("long").await.unwrap().is_some());
    }
}
