use serde::Deserialize;

use crate::core::errors::{PreviewError, PreviewResult};

pub const DEFAULT_COOKIE_NAME: &str = "io.prismic.preview";
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PreviewConfig {
    pub repository_name: String,
    #[serde(default)]
    pub api_endpoint: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default)]
    pub graph_query: Option<String>,
    #[serde(default)]
    pub fetch_links: Vec<String>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub asset_prefix: String,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_lang() -> String {
    "*".to_string()
}

fn default_page_size() -> u32 {
    MAX_PAGE_SIZE
}

fn default_cookie_name() -> String {
    DEFAULT_COOKIE_NAME.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl PreviewConfig {
    pub fn new(repository_name: impl Into<String>) -> Self {
        Self {
            repository_name: repository_name.into(),
            api_endpoint: None,
            access_token: None,
            lang: default_lang(),
            graph_query: None,
            fetch_links: vec![],
            page_size: default_page_size(),
            asset_prefix: String::new(),
            cookie_name: default_cookie_name(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    pub fn from_env(repository_name: impl Into<String>) -> Self {
        let mut config = Self::new(repository_name);
        if let Some(token) = env_value("PRISMIC_PREVIEW_ACCESS_TOKEN") {
            config.access_token = Some(token);
        }
        if let Some(endpoint) = env_value("PRISMIC_PREVIEW_API_ENDPOINT") {
            config.api_endpoint = Some(endpoint);
        }
        if let Some(lang) = env_value("PRISMIC_PREVIEW_LANG") {
            config.lang = lang;
        }
        if let Some(prefix) = env_value("PRISMIC_PREVIEW_ASSET_PREFIX") {
            config.asset_prefix = prefix;
        }
        config
    }

    pub fn api_endpoint(&self) -> String {
        self.api_endpoint
            .clone()
            .unwrap_or_else(|| format!("https://{}.cdn.prismic.io/api/v2", self.repository_name))
    }

    pub fn effective_page_size(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    pub fn validate(&self) -> PreviewResult<()> {
        if self.repository_name.trim().is_empty() {
            return Err(PreviewError::InvalidConfig(
                "repository name cannot be empty".to_string(),
            ));
        }
        let endpoint = self.api_endpoint();
        let parsed = reqwest::Url::parse(&endpoint)
            .map_err(|err| PreviewError::InvalidConfig(format!("api endpoint {endpoint}: {err}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(PreviewError::InvalidConfig(format!(
                "api endpoint {endpoint} must use http or https"
            )));
        }
        Ok(())
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
