use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::StatusCode;
use serde_json::Value;

use crate::core::{
    config::PreviewConfig,
    errors::{PreviewError, PreviewResult},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub bypass_cache: bool,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: vec![],
            bypass_cache: false,
        }
    }

    pub fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn fresh(mut self) -> Self {
        self.bypass_cache = true;
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

/// The HTTP primitive the preview flow is built on.
pub trait PreviewTransport: Send + Sync {
    fn get_json(&self, request: FetchRequest) -> impl Future<Output = PreviewResult<Value>> + Send;
}

impl<T: PreviewTransport> PreviewTransport for Arc<T> {
    fn get_json(&self, request: FetchRequest) -> impl Future<Output = PreviewResult<Value>> + Send {
        self.as_ref().get_json(request)
    }
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> PreviewResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| PreviewError::Network(err.to_string()))?;
        Ok(Self { http })
    }

    pub fn from_config(config: &PreviewConfig) -> PreviewResult<Self> {
        Self::new(Duration::from_secs(config.request_timeout_secs.max(1)))
    }
}

impl PreviewTransport for HttpTransport {
    async fn get_json(&self, request: FetchRequest) -> PreviewResult<Value> {
        let mut builder = self.http.get(&request.url).query(&request.query);
        if request.bypass_cache {
            builder = builder
                .header(CACHE_CONTROL, "no-cache")
                .header(PRAGMA, "no-cache");
        }

        tracing::debug!(url = %request.url, fresh = request.bypass_cache, "GET");
        let response = builder.send().await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                return Err(PreviewError::HttpStatus {
                    status: response.status().as_u16(),
                    body: String::new(),
                })
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                return Err(PreviewError::HttpStatus {
                    status: status.as_u16(),
                    body,
                });
            }
        }

        response
            .json()
            .await
            .map_err(|err| PreviewError::Network(format!("response body not JSON: {err}")))
    }
}
