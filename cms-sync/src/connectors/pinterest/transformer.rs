use serde_json::Value;

use super::api::Pin;
use crate::types::{FieldData, FieldType, FieldValue};

fn optional(value: &Option<String>) -> Value {
    value.clone().map(Value::String).unwrap_or(Value::Null)
}

/// Transform a pin into collection field data.
///
/// Every schema field gets an entry; attributes the API omitted become
/// `null` values rather than missing keys.
pub fn pin_to_item(pin: &Pin) -> FieldData {
    let cover = pin.media.as_ref().and_then(|m| m.image_cover_url.clone());

    let mut item = FieldData::new();
    item.insert("id".to_string(), FieldValue::new(optional(&pin.id)));
    item.insert("created_at".to_string(), FieldValue::new(optional(&pin.created_at)));
    item.insert("link".to_string(), FieldValue::new(optional(&pin.link)));
    item.insert("title".to_string(), FieldValue::new(optional(&pin.title)));
    item.insert("description".to_string(), FieldValue::new(optional(&pin.description)));
    item.insert(
        "media".to_string(),
        FieldValue::asset(FieldType::Image, optional(&cover)),
    );
    item
}
