use percent_encoding::percent_decode_str;
use serde_json::Value;

use crate::core::errors::{PreviewError, PreviewResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewToken {
    /// Sent unchanged as the search `ref` parameter.
    pub preview_ref: String,
    pub repository_name: String,
    pub release_id: Option<String>,
}

impl PreviewToken {
    pub fn is_for(&self, repository_name: &str) -> bool {
        self.repository_name.eq_ignore_ascii_case(repository_name)
    }
}

/// Decodes a raw preview cookie value. The toolbar stores a percent-encoded
/// JSON object keyed by `<repo>.prismic.io`; older sessions store the bare ref.
pub fn decode_preview_cookie(raw: &str, repository_name: &str) -> PreviewResult<PreviewToken> {
    let decoded = percent_decode_str(raw.trim())
        .decode_utf8()
        .map_err(|err| PreviewError::InvalidPreviewToken(format!("not utf-8: {err}")))?;
    let decoded = decoded.trim();
    if decoded.is_empty() {
        return Err(PreviewError::InvalidPreviewToken("empty value".to_string()));
    }

    let preview_ref = if decoded.starts_with('{') {
        ref_from_toolbar_json(decoded, repository_name)?
    } else {
        decoded.to_string()
    };
    decode_preview_ref(&preview_ref)
}

fn ref_from_toolbar_json(decoded: &str, repository_name: &str) -> PreviewResult<String> {
    let parsed: Value = serde_json::from_str(decoded)
        .map_err(|err| PreviewError::InvalidPreviewToken(format!("malformed json: {err}")))?;
    let sessions = parsed
        .as_object()
        .ok_or_else(|| PreviewError::InvalidPreviewToken("expected an object".to_string()))?;

    let preview_of = |entry: &Value| {
        entry
            .get("preview")
            .and_then(Value::as_str)
            .map(ToString::to_string)
    };
    let own_key = format!("{repository_name}.prismic.io");

    sessions
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(&own_key))
        .and_then(|(_, entry)| preview_of(entry))
        .or_else(|| sessions.values().find_map(preview_of))
        .ok_or_else(|| PreviewError::InvalidPreviewToken("no preview session entry".to_string()))
}

pub fn decode_preview_ref(preview_ref: &str) -> PreviewResult<PreviewToken> {
    let url = reqwest::Url::parse(preview_ref)
        .map_err(|err| PreviewError::InvalidPreviewToken(format!("{preview_ref}: {err}")))?;
    let repository_name = url
        .host_str()
        .and_then(|host| host.split('.').next())
        .filter(|label| !label.is_empty())
        .ok_or_else(|| PreviewError::InvalidPreviewToken(format!("{preview_ref}: missing host")))?
        .to_string();
    let release_id = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|last| last.split_once(':'))
        .map(|(_, release)| release.to_string())
        .filter(|release| !release.is_empty());

    Ok(PreviewToken {
        preview_ref: preview_ref.to_string(),
        repository_name,
        release_id,
    })
}
