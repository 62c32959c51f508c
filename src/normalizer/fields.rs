use serde_json::{Map, Value};

use crate::normalizer::Normalizer;

const IMAGE_BASE_KEYS: &[&str] = &["url", "alt", "copyright", "dimensions", "edit"];

/// Image derivative generation. Every method defaults to a deferred `null`.
pub trait ImageTransform: Send + Sync {
    fn fixed(&self, _image: &Value) -> Value {
        Value::Null
    }

    fn fluid(&self, _image: &Value) -> Value {
        Value::Null
    }

    fn local_file(&self, _image: &Value) -> Value {
        Value::Null
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DeferredImages;

impl ImageTransform for DeferredImages {}

pub fn normalize_link(normalizer: &Normalizer<'_>, value: &Value) -> Value {
    let Some(raw) = value.as_object() else {
        return value.clone();
    };
    let mut link = raw.clone();
    let link_type = raw.get("link_type").and_then(Value::as_str).unwrap_or_default();

    let local_file = match link_type {
        "Document" => {
            let is_broken = raw.get("isBroken").and_then(Value::as_bool).unwrap_or(false);
            if let Some(id) = raw.get("id").and_then(Value::as_str).filter(|_| !is_broken) {
                link.insert("document".to_string(), Value::String(id.to_string()));
                if let Some(target) = normalizer.batch_document(id) {
                    let url = (normalizer.resolvers().link_resolver)(target);
                    link.insert("url".to_string(), Value::String(url));
                }
            }
            Value::Null
        }
        "Media" => match raw.get("url").and_then(Value::as_str) {
            Some(url) => serde_json::json!({ "publicURL": url }),
            None => Value::Null,
        },
        _ => Value::Null,
    };

    link.insert("localFile".to_string(), local_file);
    link.insert("raw".to_string(), value.clone());
    Value::Object(link)
}

pub fn normalize_image(normalizer: &Normalizer<'_>, value: &Value) -> Value {
    let Some(raw) = value.as_object() else {
        return value.clone();
    };
    let transform = &normalizer.resolvers().image_transform;

    let mut image = Map::new();
    let mut thumbnails = Map::new();
    for (key, field) in raw {
        if !IMAGE_BASE_KEYS.contains(&key.as_str()) && is_image_shaped(field) {
            thumbnails.insert(key.clone(), normalize_image(normalizer, field));
        } else {
            image.insert(key.clone(), field.clone());
        }
    }
    for key in ["url", "alt", "copyright", "dimensions"] {
        image.entry(key).or_insert(Value::Null);
    }

    image.insert("fixed".to_string(), transform.fixed(value));
    image.insert("fluid".to_string(), transform.fluid(value));
    image.insert("localFile".to_string(), transform.local_file(value));
    image.insert("thumbnails".to_string(), Value::Object(thumbnails));
    Value::Object(image)
}

fn is_image_shaped(value: &Value) -> bool {
    value
        .as_object()
        .map(|fields| fields.contains_key("url"))
        .unwrap_or(false)
}
