use serde::ser::SerializeStruct;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PreviewError {
    #[error("preview cookie not present")]
    PreviewCookieNotPresent,
    #[error("invalid preview token: {0}")]
    InvalidPreviewToken(String),
    #[error("preview token is not for this repository (expected {expected}, found {found})")]
    PreviewTokenNotForRepository { expected: String, found: String },
    #[error("preview has already been bootstrapped")]
    AlreadyBootstrapped,
    #[error("type paths could not be fetched: {message}")]
    TypePathFetch {
        message: String,
        #[source]
        source: Option<Box<PreviewError>>,
    },
    #[error("documents could not be fetched: {message}")]
    DocumentFetch {
        message: String,
        #[source]
        source: Option<Box<PreviewError>>,
    },
    #[error("normalization failed: {0}")]
    Normalization(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected http status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl serde::Serialize for PreviewError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PreviewError", 2)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

impl PreviewError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::PreviewCookieNotPresent => "PREVIEW_COOKIE_NOT_PRESENT",
            Self::InvalidPreviewToken(_) => "INVALID_PREVIEW_TOKEN",
            Self::PreviewTokenNotForRepository { .. } => "PREVIEW_TOKEN_NOT_FOR_REPOSITORY",
            Self::AlreadyBootstrapped => "ALREADY_BOOTSTRAPPED",
            Self::TypePathFetch { .. } => "TYPE_PATH_FETCH_ERROR",
            Self::DocumentFetch { .. } => "DOCUMENT_FETCH_ERROR",
            Self::Normalization(_) => "NORMALIZATION_ERROR",
            Self::Network(_) => "NETWORK_ERROR",
            Self::HttpStatus { .. } => "HTTP_STATUS_ERROR",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }

    pub fn type_path_fetch(message: impl Into<String>) -> Self {
        Self::TypePathFetch {
            message: message.into(),
            source: None,
        }
    }

    pub fn document_fetch(message: impl Into<String>) -> Self {
        Self::DocumentFetch {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps a transport failure, keeping it as the source so callers can
    /// still classify it.
    pub fn caused_by(self, cause: PreviewError) -> Self {
        match self {
            Self::TypePathFetch { message, .. } => Self::TypePathFetch {
                message: format!("{message}: {cause}"),
                source: Some(Box::new(cause)),
            },
            Self::DocumentFetch { message, .. } => Self::DocumentFetch {
                message: format!("{message}: {cause}"),
                source: Some(Box::new(cause)),
            },
            other => other,
        }
    }

    /// Whether a fresh bootstrap attempt could plausibly succeed. Nothing in
    /// this crate retries on its own; this is surfaced to UI code only.
    /// Fetch failures defer to the transport error underneath them.
    pub fn retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::TypePathFetch { source, .. } | Self::DocumentFetch { source, .. } => {
                source.as_deref().is_some_and(Self::retryable)
            }
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for PreviewError {
    fn from(value: serde_json::Error) -> Self {
        Self::Normalization(value.to_string())
    }
}

impl From<reqwest::Error> for PreviewError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            Self::Network(format!("request timed out: {value}"))
        } else {
            Self::Network(value.to_string())
        }
    }
}

pub type PreviewResult<T> = Result<T, PreviewError>;
