use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::normalizer::Normalizer;

pub fn normalize_slices(normalizer: &Normalizer<'_>, path: &str, value: &Value) -> Value {
    let Some(slices) = value.as_array() else {
        tracing::debug!(path, "slice zone is not an array; passing through");
        return value.clone();
    };
    Value::Array(
        slices
            .iter()
            .map(|slice| match slice_type(slice) {
                Some(kind) => normalize_slice_at(normalizer, &format!("{path}.{kind}"), slice),
                None => slice.clone(),
            })
            .collect(),
    )
}

/// `path` is the slice's own path, `<slices path>.<slice_type>`.
pub fn normalize_slice_at(normalizer: &Normalizer<'_>, path: &str, value: &Value) -> Value {
    let (Some(raw), Some(kind)) = (value.as_object(), slice_type(value)) else {
        return value.clone();
    };

    let primary = raw
        .get("primary")
        .and_then(Value::as_object)
        .map(|fields| normalizer.normalize_map(&format!("{path}.primary"), fields))
        .unwrap_or_default();
    let items_path = format!("{path}.items");
    let items: Vec<Value> = raw
        .get("items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| match item.as_object() {
                    Some(fields) => Value::Object(normalizer.normalize_map(&items_path, fields)),
                    None => item.clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    let mut slice = raw.clone();
    slice.insert("slice_type".to_string(), Value::String(kind.to_string()));
    slice.insert("primary".to_string(), Value::Object(primary));
    slice.insert("items".to_string(), Value::Array(items));
    let id = slice_id(&slice);
    slice.insert("id".to_string(), Value::String(id));
    Value::Object(slice)
}

fn slice_type(value: &Value) -> Option<&str> {
    value
        .get("slice_type")
        .and_then(Value::as_str)
        .filter(|kind| !kind.is_empty())
}

/// SHA-256 over the normalized `slice_type`, `primary` and `items`. The
/// slice's position in the zone does not contribute.
pub fn slice_id(slice: &Map<String, Value>) -> String {
    let mut hasher = Sha256::new();
    for key in ["slice_type", "primary", "items"] {
        hasher.update(key.as_bytes());
        hasher.update(b"\x1f");
        write_canonical(slice.get(key).unwrap_or(&Value::Null), &mut hasher);
        hasher.update(b"\x1e");
    }
    format!("{:x}", hasher.finalize())
}

fn write_canonical(value: &Value, hasher: &mut Sha256) {
    match value {
        Value::Object(fields) => {
            let mut keys: Vec<&String> = fields.keys().collect();
            keys.sort();
            hasher.update(b"{");
            for key in keys {
                write_canonical(&Value::String(key.clone()), hasher);
                hasher.update(b":");
                write_canonical(&fields[key.as_str()], hasher);
                hasher.update(b",");
            }
            hasher.update(b"}");
        }
        Value::Array(items) => {
            hasher.update(b"[");
            for item in items {
                write_canonical(item, hasher);
                hasher.update(b",");
            }
            hasher.update(b"]");
        }
        scalar => hasher.update(scalar.to_string().as_bytes()),
    }
}
