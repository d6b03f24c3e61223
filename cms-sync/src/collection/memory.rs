use super::ManagedCollection;
use crate::types::{Field, ItemInput};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    // Insertion order is kept so item ids come back in a stable order.
    items: Vec<ItemInput>,
    fields: Vec<Field>,
    plugin_data: HashMap<String, String>,
}

/// In-memory [`ManagedCollection`].
#[derive(Default)]
pub struct MemoryCollection {
    inner: Mutex<Inner>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collection pre-populated with items and fields.
    pub fn with_items(fields: Vec<Field>, items: Vec<ItemInput>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                items,
                fields,
                plugin_data: HashMap::new(),
            }),
        }
    }

    /// Snapshot of every item.
    pub fn items(&self) -> Vec<ItemInput> {
        self.inner.lock().unwrap().items.clone()
    }

    /// Look up one item by id.
    pub fn item(&self, id: &str) -> Option<ItemInput> {
        self.inner
            .lock()
            .unwrap()
            .items
            .iter()
            .find(|item| item.id == id)
            .cloned()
    }
}

#[async_trait]
impl ManagedCollection for MemoryCollection {
    async fn get_item_ids(&self) -> Result<Vec<String>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .items
            .iter()
            .map(|item| item.id.clone())
            .collect())
    }

    async fn get_fields(&self) -> Result<Vec<Field>> {
        Ok(self.inner.lock().unwrap().fields.clone())
    }

    async fn set_fields(&self, fields: &[Field]) -> Result<()> {
        self.inner.lock().unwrap().fields = fields.to_vec();
        Ok(())
    }

    async fn add_items(&self, items: &[ItemInput]) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        for item in items {
            match inner.items.iter().position(|existing| existing.id == item.id) {
                Some(index) => inner.items[index] = item.clone(),
                None => inner.items.push(item.clone()),
            }
        }
        Ok(())
    }

    async fn remove_items(&self, ids: &[String]) -> Result<()> {
        self.inner
            .lock()
            .unwrap()
            .items
            .retain(|item| !ids.contains(&item.id));
        Ok(())
    }

    async fn get_plugin_data(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.lock().unwrap().plugin_data.get(key).cloned())
    }

    async fn set_plugin_data(&self, key: &str, value: &str) -> Result<()> {
        self.inner
            .lock()
            .unwrap()
            .plugin_data
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn set_plugin_data_entries(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        for (key, value) in entries {
            inner.plugin_data.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}
