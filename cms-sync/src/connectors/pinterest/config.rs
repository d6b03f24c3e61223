use crate::types::{Field, FieldType};

pub const BASE_URL: &str = "https://api.pinterest.com/v5";
pub const PAGE_SIZE: u32 = 100;

/// Field ids, labels and types of a synced pin, in schema order.
pub const PIN_FIELDS: &[(&str, &str, FieldType)] = &[
    ("id", "ID", FieldType::String),
    ("created_at", "Created At", FieldType::Date),
    ("link", "Link", FieldType::Link),
    ("title", "Title", FieldType::String),
    ("description", "Description", FieldType::String),
    ("media", "Media", FieldType::Image),
];

/// The pin schema as collection fields.
pub fn pin_fields() -> Vec<Field> {
    PIN_FIELDS
        .iter()
        .map(|(id, name, field_type)| Field::new(id, name, *field_type))
        .collect()
}
