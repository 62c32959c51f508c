use std::collections::HashMap;

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::{
    core::errors::{PreviewError, PreviewResult},
    providers::http::{FetchRequest, PreviewTransport},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypePathKind {
    Document,
    DocumentData,
    StructuredText,
    Link,
    Image,
    Group,
    Slices,
    Slice,
}

impl TypePathKind {
    /// Accepts both `StructuredText` and the generated `PrismicStructuredTextType`.
    pub fn parse(raw: &str) -> Option<Self> {
        let lowered = raw.trim().to_ascii_lowercase();
        let bare = lowered
            .strip_prefix("prismic")
            .and_then(|rest| rest.strip_suffix("type"))
            .filter(|rest| !rest.is_empty())
            .unwrap_or(lowered.as_str());
        match bare {
            "document" => Some(Self::Document),
            "documentdata" | "data" => Some(Self::DocumentData),
            "structuredtext" | "richtext" => Some(Self::StructuredText),
            "link" => Some(Self::Link),
            "image" => Some(Self::Image),
            "group" => Some(Self::Group),
            "slices" | "slicezone" => Some(Self::Slices),
            "slice" => Some(Self::Slice),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "Document",
            Self::DocumentData => "DocumentData",
            Self::StructuredText => "StructuredText",
            Self::Link => "Link",
            Self::Image => "Image",
            Self::Group => "Group",
            Self::Slices => "Slices",
            Self::Slice => "Slice",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypePathMap {
    paths: HashMap<String, TypePathKind>,
}

impl TypePathMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(body: &Value) -> PreviewResult<Self> {
        let entries = body
            .as_object()
            .ok_or_else(|| PreviewError::type_path_fetch("type path asset is not an object"))?;

        let mut paths = HashMap::with_capacity(entries.len());
        for (path, kind) in entries {
            match kind.as_str().and_then(TypePathKind::parse) {
                Some(kind) => {
                    paths.insert(path.clone(), kind);
                }
                None => tracing::warn!(path = %path, kind = %kind, "ignoring unknown type path kind"),
            }
        }
        Ok(Self { paths })
    }

    pub fn insert(&mut self, path: impl Into<String>, kind: TypePathKind) {
        self.paths.insert(path.into(), kind);
    }

    pub fn with(mut self, path: impl Into<String>, kind: TypePathKind) -> Self {
        self.insert(path, kind);
        self
    }

    pub fn kind(&self, path: &str) -> Option<TypePathKind> {
        self.paths.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

pub fn repository_hash(repository_name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(repository_name.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn type_paths_url(asset_prefix: &str, repository_name: &str) -> String {
    format!(
        "{}/static/{}.json",
        asset_prefix.trim_end_matches('/'),
        repository_hash(repository_name)
    )
}

pub async fn fetch_type_paths<T: PreviewTransport>(
    transport: &T,
    asset_prefix: &str,
    repository_name: &str,
) -> PreviewResult<TypePathMap> {
    let request = FetchRequest::new(type_paths_url(asset_prefix, repository_name)).fresh();
    let body = transport
        .get_json(request)
        .await
        .map_err(|err| PreviewError::type_path_fetch("type path asset").caused_by(err))?;
    let map = TypePathMap::from_json(&body)?;
    tracing::debug!(repository = repository_name, paths = map.len(), "loaded type paths");
    Ok(map)
}
