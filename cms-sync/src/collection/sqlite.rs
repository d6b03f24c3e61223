//! Collection persistence using SQLite.
//!
//! Items, the field schema and plugin data survive between CLI runs. Field
//! data is stored as a JSON document per item.

use super::ManagedCollection;
use crate::types::{Field, FieldData, ItemInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// Persists a managed collection in SQLite.
///
/// # Schema
/// ```sql
/// CREATE TABLE items (id TEXT PRIMARY KEY, slug TEXT NOT NULL,
///                     draft INTEGER NOT NULL, field_data TEXT NOT NULL);
/// CREATE TABLE fields (position INTEGER PRIMARY KEY, id TEXT NOT NULL,
///                      name TEXT NOT NULL, field_type TEXT NOT NULL);
/// CREATE TABLE plugin_data (key TEXT PRIMARY KEY, value TEXT NOT NULL);
/// ```
pub struct SqliteCollection {
    conn: Mutex<Connection>,
}

impl SqliteCollection {
    /// Opens (or creates) the SQLite database and ensures the tables exist.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open collection DB at {}", db_path.display()))?;
        let collection = Self {
            conn: Mutex::new(conn),
        };
        collection.create_tables()?;
        Ok(collection)
    }

    fn create_tables(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS items (
                id         TEXT PRIMARY KEY,
                slug       TEXT NOT NULL,
                draft      INTEGER NOT NULL,
                field_data TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS fields (
                position   INTEGER PRIMARY KEY,
                id         TEXT NOT NULL,
                name       TEXT NOT NULL,
                field_type TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS plugin_data (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
        .context("Failed to create collection tables")?;
        Ok(())
    }

    /// Look up one item by id.
    pub fn get_item(&self, id: &str) -> Result<Option<ItemInput>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT id, slug, draft, field_data FROM items WHERE id = ?1",
                params![id],
                |row| {
                    let id: String = row.get(0)?;
                    let slug: String = row.get(1)?;
                    let draft: bool = row.get(2)?;
                    let field_data: String = row.get(3)?;
                    Ok((id, slug, draft, field_data))
                },
            )
            .optional()
            .context("Failed to query item")?;

        row.map(|(id, slug, draft, field_data)| -> Result<ItemInput> {
            let field_data: FieldData = serde_json::from_str(&field_data)
                .with_context(|| format!("Corrupt field data for item {}", id))?;
            Ok(ItemInput {
                id,
                slug,
                draft,
                field_data,
            })
        })
        .transpose()
    }
}

#[async_trait]
impl ManagedCollection for SqliteCollection {
    async fn get_item_ids(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT id FROM items ORDER BY rowid ASC")
            .context("Failed to prepare item id query")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .context("Failed to query item ids")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read item ids")?;
        Ok(ids)
    }

    async fn get_fields(&self) -> Result<Vec<Field>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT id, name, field_type FROM fields ORDER BY position ASC")
            .context("Failed to prepare fields query")?;
        let rows = stmt
            .query_map([], |row| {
                let id: String = row.get(0)?;
                let name: String = row.get(1)?;
                let field_type: String = row.get(2)?;
                Ok((id, name, field_type))
            })
            .context("Failed to query fields")?;

        let mut fields = Vec::new();
        for row in rows {
            let (id, name, field_type) = row.context("Failed to read field row")?;
            let field_type = serde_json::from_value(serde_json::Value::String(field_type))
                .with_context(|| format!("Unknown type for field {}", id))?;
            fields.push(Field {
                id,
                name,
                field_type,
            });
        }
        Ok(fields)
    }

    async fn set_fields(&self, fields: &[Field]) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction().context("Failed to begin transaction")?;
        tx.execute("DELETE FROM fields", [])
            .context("Failed to clear fields")?;
        for (position, field) in fields.iter().enumerate() {
            let field_type = serde_json::to_value(field.field_type)?;
            tx.execute(
                "INSERT INTO fields (position, id, name, field_type) VALUES (?1, ?2, ?3, ?4)",
                params![position as i64, field.id, field.name, field_type.as_str()],
            )
            .context("Failed to insert field")?;
        }
        tx.commit().context("Failed to commit fields")?;
        Ok(())
    }

    async fn add_items(&self, items: &[ItemInput]) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction().context("Failed to begin transaction")?;
        for item in items {
            let field_data =
                serde_json::to_string(&item.field_data).context("Failed to encode field data")?;
            tx.execute(
                "INSERT INTO items (id, slug, draft, field_data) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                    slug = excluded.slug,
                    draft = excluded.draft,
                    field_data = excluded.field_data",
                params![item.id, item.slug, item.draft, field_data],
            )
            .context("Failed to upsert item")?;
        }
        tx.commit().context("Failed to commit items")?;
        Ok(())
    }

    async fn remove_items(&self, ids: &[String]) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction().context("Failed to begin transaction")?;
        for id in ids {
            tx.execute("DELETE FROM items WHERE id = ?1", params![id])
                .context("Failed to delete item")?;
        }
        tx.commit().context("Failed to commit removals")?;
        Ok(())
    }

    async fn get_plugin_data(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT value FROM plugin_data WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .context("Failed to read plugin data")
    }

    async fn set_plugin_data(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO plugin_data (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )
        .context("Failed to write plugin data")?;
        Ok(())
    }

    async fn set_plugin_data_entries(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction().context("Failed to begin transaction")?;
        for (key, value) in entries {
            tx.execute(
                "INSERT INTO plugin_data (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .context("Failed to write plugin data")?;
        }
        tx.commit().context("Failed to commit plugin data")?;
        Ok(())
    }
}
