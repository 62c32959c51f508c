#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use prismic_preview::{
    core::errors::{PreviewError, PreviewResult},
    providers::http::{FetchRequest, PreviewTransport},
    security::cookies::StaticCookies,
    Document, FieldResolvers, PreviewConfig,
};
use serde_json::{json, Value};

pub const REPOSITORY: &str = "acme";
pub const PREVIEW_REF: &str = "https://acme.prismic.io/previews/session-1:release-9";

pub struct FakeTransport {
    type_paths: Option<Value>,
    pages: Vec<Value>,
    failing_page: Option<(u32, PreviewError)>,
    calls: AtomicUsize,
    requests: Mutex<Vec<FetchRequest>>,
}

impl FakeTransport {
    pub fn new(type_paths: Value, pages: Vec<Value>) -> Self {
        Self {
            type_paths: Some(type_paths),
            pages,
            failing_page: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(vec![]),
        }
    }

    pub fn without_type_paths(mut self) -> Self {
        self.type_paths = None;
        self
    }

    pub fn failing_on_page(self, page: u32) -> Self {
        self.failing_on_page_with(page, PreviewError::Network("connection reset".to_string()))
    }

    pub fn failing_on_page_with(mut self, page: u32, error: PreviewError) -> Self {
        self.failing_page = Some((page, error));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn search_requests(&self) -> Vec<FetchRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.url.ends_with("/documents/search"))
            .collect()
    }
}

impl PreviewTransport for FakeTransport {
    async fn get_json(&self, request: FetchRequest) -> PreviewResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        tokio::task::yield_now().await;

        if request.url.contains("/static/") {
            return self.type_paths.clone().ok_or(PreviewError::HttpStatus {
                status: 404,
                body: String::new(),
            });
        }

        let page: u32 = request
            .query_value("page")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(1);
        if let Some((failing, error)) = &self.failing_page {
            if *failing == page {
                return Err(error.clone());
            }
        }
        (page as usize)
            .checked_sub(1)
            .and_then(|idx| self.pages.get(idx))
            .cloned()
            .ok_or(PreviewError::HttpStatus {
                status: 404,
                body: format!("no page {page}"),
            })
    }
}

pub fn page(total_pages: u32, page: u32, results: Vec<Value>) -> Value {
    json!({
        "page": page,
        "total_pages": total_pages,
        "results_size": results.len(),
        "results": results,
    })
}

pub fn raw_document(id: &str, doc_type: &str, data: Value) -> Value {
    json!({
        "id": id,
        "uid": id,
        "type": doc_type,
        "href": format!("https://acme.cdn.prismic.io/api/v2/documents/search?q={id}"),
        "tags": [],
        "first_publication_date": "2021-03-04T10:20:30+0000",
        "last_publication_date": "2021-03-05T10:20:30+0000",
        "lang": "en-us",
        "alternate_languages": [],
        "data": data,
    })
}

pub fn document(id: &str, doc_type: &str, data: Value) -> Document {
    serde_json::from_value(raw_document(id, doc_type, data)).expect("document should deserialize")
}

pub fn preview_cookies() -> StaticCookies {
    StaticCookies::new().with("io.prismic.preview", PREVIEW_REF)
}

pub fn config() -> PreviewConfig {
    PreviewConfig::new(REPOSITORY)
}

pub fn resolvers() -> FieldResolvers {
    FieldResolvers::new(|doc: &Document| format!("/{}/{}", doc.doc_type, doc.uid.clone().unwrap_or_default()))
}
