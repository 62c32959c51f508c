use std::{collections::HashMap, sync::Arc};

use serde_json::{Map, Value};

use crate::{
    core::{
        errors::{PreviewError, PreviewResult},
        types::{parse_publication_date, Document, NormalizedNode},
    },
    typepaths::{TypePathKind, TypePathMap},
};

pub mod fields;
pub mod richtext;
pub mod slices;

use fields::{DeferredImages, ImageTransform};
use richtext::{HtmlSerializer, RichTextSerializer};

pub type LinkResolver = Arc<dyn Fn(&Document) -> String + Send + Sync>;

/// The opaque collaborators normalization delegates to.
#[derive(Clone)]
pub struct FieldResolvers {
    pub link_resolver: LinkResolver,
    pub html_serializer: Arc<dyn RichTextSerializer>,
    pub image_transform: Arc<dyn ImageTransform>,
}

impl FieldResolvers {
    pub fn new<F>(link_resolver: F) -> Self
    where
        F: Fn(&Document) -> String + Send + Sync + 'static,
    {
        Self {
            link_resolver: Arc::new(link_resolver),
            html_serializer: Arc::new(HtmlSerializer),
            image_transform: Arc::new(DeferredImages),
        }
    }

    pub fn with_html_serializer(mut self, serializer: impl RichTextSerializer + 'static) -> Self {
        self.html_serializer = Arc::new(serializer);
        self
    }

    pub fn with_image_transform(mut self, transform: impl ImageTransform + 'static) -> Self {
        self.image_transform = Arc::new(transform);
        self
    }
}

impl std::fmt::Debug for FieldResolvers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldResolvers").finish_non_exhaustive()
    }
}

pub struct Normalizer<'a> {
    type_paths: &'a TypePathMap,
    resolvers: &'a FieldResolvers,
    batch: HashMap<&'a str, &'a Document>,
}

impl<'a> Normalizer<'a> {
    /// `batch` is the set of documents document links may resolve against.
    pub fn new(
        type_paths: &'a TypePathMap,
        resolvers: &'a FieldResolvers,
        batch: &'a [Document],
    ) -> Self {
        Self {
            type_paths,
            resolvers,
            batch: batch.iter().map(|doc| (doc.id.as_str(), doc)).collect(),
        }
    }

    pub fn normalize_document(&self, document: &Document) -> PreviewResult<NormalizedNode> {
        if document.id.trim().is_empty() {
            return Err(PreviewError::Normalization(
                "document is missing an id".to_string(),
            ));
        }
        if document.doc_type.trim().is_empty() {
            return Err(PreviewError::Normalization(format!(
                "document {} is missing a type",
                document.id
            )));
        }

        let data_path = format!("{}.data", document.doc_type);
        let data = self.normalize_map(&data_path, &document.data);
        let data_raw = Value::Object(document.data.clone());
        let data_string = serde_json::to_string(&data_raw)?;

        Ok(NormalizedNode {
            id: document.id.clone(),
            prismic_id: document.id.clone(),
            doc_type: document.doc_type.clone(),
            uid: document.uid.clone(),
            lang: document.lang.clone(),
            tags: document.tags.clone(),
            href: document.href.clone(),
            url: Some((self.resolvers.link_resolver)(document)),
            first_publication_date: document
                .first_publication_date
                .as_deref()
                .and_then(parse_publication_date),
            last_publication_date: document
                .last_publication_date
                .as_deref()
                .and_then(parse_publication_date),
            alternate_languages: document.alternate_languages.clone(),
            data: Value::Object(data),
            data_raw,
            data_string,
        })
    }

    pub(crate) fn normalize_map(&self, path: &str, fields: &Map<String, Value>) -> Map<String, Value> {
        fields
            .iter()
            .map(|(key, value)| {
                let field_path = format!("{path}.{key}");
                (key.clone(), self.normalize_field(&field_path, value))
            })
            .collect()
    }

    pub fn normalize_field(&self, path: &str, value: &Value) -> Value {
        match self.type_paths.kind(path) {
            Some(TypePathKind::StructuredText) => self.structured_text(path, value),
            Some(TypePathKind::Link) => fields::normalize_link(self, value),
            Some(TypePathKind::Image) => fields::normalize_image(self, value),
            Some(TypePathKind::Group) => self.group(path, value),
            Some(TypePathKind::Slices) => slices::normalize_slices(self, path, value),
            Some(TypePathKind::Slice) => slices::normalize_slice_at(self, path, value),
            Some(TypePathKind::Document) | Some(TypePathKind::DocumentData) | None => value.clone(),
        }
    }

    fn structured_text(&self, path: &str, value: &Value) -> Value {
        let Some(blocks) = value.as_array() else {
            tracing::debug!(path, "structured text field is not an array; passing through");
            return value.clone();
        };
        let rendered = self.resolvers.html_serializer.render(blocks);
        serde_json::json!({
            "html": rendered.html,
            "text": rendered.text,
            "raw": value,
        })
    }

    fn group(&self, path: &str, value: &Value) -> Value {
        let Some(elements) = value.as_array() else {
            tracing::debug!(path, "group field is not an array; passing through");
            return value.clone();
        };
        Value::Array(
            elements
                .iter()
                .map(|element| match element.as_object() {
                    Some(fields) => Value::Object(self.normalize_map(path, fields)),
                    None => element.clone(),
                })
                .collect(),
        )
    }

    pub(crate) fn batch_document(&self, id: &str) -> Option<&'a Document> {
        self.batch.get(id).copied()
    }

    pub(crate) fn resolvers(&self) -> &'a FieldResolvers {
        self.resolvers
    }
}

pub fn normalize_documents(
    documents: &[Document],
    type_paths: &TypePathMap,
    resolvers: &FieldResolvers,
) -> PreviewResult<Vec<NormalizedNode>> {
    let normalizer = Normalizer::new(type_paths, resolvers, documents);
    documents
        .iter()
        .map(|document| normalizer.normalize_document(document))
        .collect()
}

/// Normalizes one document on its own; document links only resolve to itself.
pub fn normalize(
    document: &Document,
    type_paths: &TypePathMap,
    resolvers: &FieldResolvers,
) -> PreviewResult<NormalizedNode> {
    let batch = std::slice::from_ref(document);
    Normalizer::new(type_paths, resolvers, batch).normalize_document(document)
}
