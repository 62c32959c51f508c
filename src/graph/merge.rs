use serde_json::{Map, Value};

use crate::graph::store::NodeGraphState;

/// Overlays preview nodes onto statically built page data. Any object whose
/// `prismicId` is present in `state` takes the preview node's values, keeping
/// the shape of the static object.
pub fn merge_preview_data(static_data: &Value, state: &NodeGraphState) -> Value {
    walk(static_data, state)
}

fn walk(value: &Value, state: &NodeGraphState) -> Value {
    match value {
        Value::Object(fields) => {
            let preview = fields
                .get("prismicId")
                .and_then(Value::as_str)
                .and_then(|id| state.node(id))
                .and_then(|node| serde_json::to_value(node.as_ref()).ok());
            match preview {
                Some(preview) => overlay(value, &preview, state),
                None => Value::Object(
                    fields
                        .iter()
                        .map(|(key, field)| (key.clone(), walk(field, state)))
                        .collect(),
                ),
            }
        }
        Value::Array(items) => Value::Array(items.iter().map(|item| walk(item, state)).collect()),
        scalar => scalar.clone(),
    }
}

fn overlay(static_value: &Value, preview: &Value, state: &NodeGraphState) -> Value {
    match (static_value, preview) {
        (Value::Object(fields), Value::Object(preview_fields)) => {
            let merged: Map<String, Value> = fields
                .iter()
                .map(|(key, field)| {
                    let value = match preview_fields.get(key) {
                        Some(preview_field) => overlay(field, preview_field, state),
                        None => walk(field, state),
                    };
                    (key.clone(), value)
                })
                .collect();
            Value::Object(merged)
        }
        (Value::Array(items), Value::Array(preview_items)) if items.len() == preview_items.len() => {
            Value::Array(
                items
                    .iter()
                    .zip(preview_items)
                    .map(|(item, preview_item)| overlay(item, preview_item, state))
                    .collect(),
            )
        }
        // A selected linked document on the static side versus the bare
        // target id on the preview side.
        (Value::Object(_), Value::String(_)) => walk(static_value, state),
        (_, preview) => preview.clone(),
    }
}
