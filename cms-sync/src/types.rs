use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Plugin data keys persisted on the collection after a successful sync.
pub mod plugin_keys {
    pub const ACCESS_TOKEN: &str = "accessToken";
    pub const BOARD_ID: &str = "boardId";
    pub const SLUG_FIELD_ID: &str = "slugFieldId";
}

/// Field types supported by the managed collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    Boolean,
    Color,
    Number,
    String,
    FormattedText,
    Image,
    File,
    Link,
    Date,
}

/// A collection field.
///
/// `id` is defined by the data source and never changes; `name` is the
/// user-editable label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl Field {
    pub fn new(id: &str, name: &str, field_type: FieldType) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            field_type,
        }
    }
}

/// A single field value: `{ value }`, or `{ type, value }` for assets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<FieldType>,
    pub value: Value,
}

impl FieldValue {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            asset_type: None,
            value: value.into(),
        }
    }

    pub fn asset(asset_type: FieldType, value: impl Into<Value>) -> Self {
        Self {
            asset_type: Some(asset_type),
            value: value.into(),
        }
    }

    /// The value as a non-empty string, if it is one.
    pub fn as_non_empty_str(&self) -> Option<&str> {
        self.value.as_str().filter(|s| !s.is_empty())
    }
}

/// Field id → value.
pub type FieldData = BTreeMap<String, FieldValue>;

/// Normalized snapshot of one upstream source, fetched fresh for every sync.
#[derive(Clone, Debug, PartialEq)]
pub struct DataSource {
    pub id: String,
    pub fields: Vec<Field>,
    pub items: Vec<FieldData>,
}

/// Item record written to the collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemInput {
    pub id: String,
    pub slug: String,
    pub draft: bool,
    pub field_data: FieldData,
}
