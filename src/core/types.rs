use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::core::errors::PreviewError;

/// A document as returned by the search API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub last_publication_date: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub alternate_languages: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_empty_map")]
    pub data: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_empty_map<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedNode {
    pub id: String,
    pub prismic_id: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub uid: Option<String>,
    pub lang: Option<String>,
    pub tags: Vec<String>,
    pub href: Option<String>,
    pub url: Option<String>,
    pub first_publication_date: Option<DateTime<Utc>>,
    pub last_publication_date: Option<DateTime<Utc>>,
    pub alternate_languages: Vec<Value>,
    pub data: Value,
    pub data_raw: Value,
    pub data_string: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BootstrapState {
    Init,
    Bootstrapping,
    Bootstrapped,
    Failed,
}

impl BootstrapState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "INIT",
            Self::Bootstrapping => "BOOTSTRAPPING",
            Self::Bootstrapped => "BOOTSTRAPPED",
            Self::Failed => "FAILED",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BootstrapStatus {
    pub state: BootstrapState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<PreviewError>,
}

impl BootstrapStatus {
    pub fn init() -> Self {
        Self {
            state: BootstrapState::Init,
            error: None,
        }
    }

    pub fn bootstrapping() -> Self {
        Self {
            state: BootstrapState::Bootstrapping,
            error: None,
        }
    }

    pub fn bootstrapped() -> Self {
        Self {
            state: BootstrapState::Bootstrapped,
            error: None,
        }
    }

    pub fn failed(error: PreviewError) -> Self {
        Self {
            state: BootstrapState::Failed,
            error: Some(error),
        }
    }
}

/// Accepts the API's `2021-03-04T10:20:30+0000` form as well as RFC 3339.
pub fn parse_publication_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|value| value.with_timezone(&Utc))
        .map_err(|err| tracing::warn!(value = raw, error = %err, "unparseable publication date"))
        .ok()
}
