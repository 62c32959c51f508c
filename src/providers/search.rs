use serde::Deserialize;
use serde_json::Value;

use crate::{
    core::{
        config::PreviewConfig,
        errors::{PreviewError, PreviewResult},
        types::Document,
    },
    providers::http::{FetchRequest, PreviewTransport},
};

const MAX_PAGES: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub endpoint: String,
    pub preview_ref: String,
    pub access_token: Option<String>,
    pub lang: String,
    pub graph_query: Option<String>,
    pub fetch_links: Vec<String>,
    pub page_size: u32,
}

impl SearchQuery {
    pub fn from_config(config: &PreviewConfig, preview_ref: impl Into<String>) -> Self {
        Self {
            endpoint: config.api_endpoint(),
            preview_ref: preview_ref.into(),
            access_token: config.access_token.clone(),
            lang: config.lang.clone(),
            graph_query: config.graph_query.clone(),
            fetch_links: config.fetch_links.clone(),
            page_size: config.effective_page_size(),
        }
    }

    pub fn page_request(&self, page: u32) -> FetchRequest {
        let url = format!("{}/documents/search", self.endpoint.trim_end_matches('/'));
        let mut request = FetchRequest::new(url).param("ref", self.preview_ref.clone());
        if let Some(token) = &self.access_token {
            request = request.param("access_token", token.clone());
        }
        request = request.param("lang", self.lang.clone());
        if let Some(graph_query) = &self.graph_query {
            request = request.param("graphQuery", graph_query.clone());
        }
        if !self.fetch_links.is_empty() {
            request = request.param("fetchLinks", self.fetch_links.join(","));
        }
        request
            .param("page", page.to_string())
            .param("pageSize", self.page_size.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage {
    #[serde(default = "first_page")]
    pub page: u32,
    pub total_pages: u32,
    pub results: Vec<Document>,
}

fn first_page() -> u32 {
    1
}

pub async fn fetch_page<T: PreviewTransport>(
    transport: &T,
    query: &SearchQuery,
    page: u32,
) -> PreviewResult<SearchPage> {
    let body: Value = transport
        .get_json(query.page_request(page))
        .await
        .map_err(|err| PreviewError::document_fetch(format!("page {page}")).caused_by(err))?;
    let parsed: SearchPage = serde_json::from_value(body)
        .map_err(|err| PreviewError::document_fetch(format!("page {page} malformed: {err}")))?;
    if parsed.page != page {
        tracing::warn!(requested = page, reported = parsed.page, "search api reported a different page");
    }
    tracing::debug!(
        page = parsed.page,
        total_pages = parsed.total_pages,
        results = parsed.results.len(),
        "fetched search page"
    );
    Ok(parsed)
}

/// Continues from an already fetched first page. `total_pages` is re-read
/// from every response.
pub async fn fetch_remaining<T: PreviewTransport>(
    transport: &T,
    query: &SearchQuery,
    first: SearchPage,
) -> PreviewResult<Vec<Document>> {
    let mut total_pages = first.total_pages;
    let mut documents = first.results;
    let mut page = 1;

    while page < total_pages {
        if page >= MAX_PAGES {
            return Err(PreviewError::document_fetch(format!(
                "refusing to read past {MAX_PAGES} pages"
            )));
        }
        page += 1;
        let next = fetch_page(transport, query, page).await?;
        total_pages = next.total_pages;
        documents.extend(next.results);
    }

    Ok(documents)
}

pub async fn fetch_all_documents<T: PreviewTransport>(
    transport: &T,
    query: &SearchQuery,
) -> PreviewResult<Vec<Document>> {
    let first = fetch_page(transport, query, 1).await?;
    fetch_remaining(transport, query, first).await
}
