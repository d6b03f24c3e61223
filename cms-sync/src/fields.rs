use crate::types::Field;
use std::collections::HashMap;

/// Merge a freshly fetched schema with the collection's current one.
///
/// Output follows `fresh` order and contains exactly the fresh fields. A
/// field whose id already exists keeps the existing `name` (the user's
/// label) but takes the fresh `type`. Fields that disappeared upstream are
/// dropped.
pub fn merge_fields_with_existing_fields(fresh: &[Field], existing: &[Field]) -> Vec<Field> {
    let labels: HashMap<&str, &str> = existing
        .iter()
        .map(|field| (field.id.as_str(), field.name.as_str()))
        .collect();

    fresh
        .iter()
        .map(|field| match labels.get(field.id.as_str()) {
            Some(name) => Field {
                name: name.to_string(),
                ..field.clone()
            },
            None => field.clone(),
        })
        .collect()
}
