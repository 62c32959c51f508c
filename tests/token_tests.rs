use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use prismic_preview::{
    security::token::{decode_preview_cookie, decode_preview_ref},
    PreviewError,
};

#[test]
fn bare_refs_expose_repository_and_release() {
    let token = decode_preview_cookie("https://acme.prismic.io/previews/session-1:release-9", "acme")
        .expect("token decodes");

    assert_eq!(token.repository_name, "acme");
    assert_eq!(token.release_id.as_deref(), Some("release-9"));
    assert_eq!(token.preview_ref, "https://acme.prismic.io/previews/session-1:release-9");
    assert!(token.is_for("ACME"));
}

#[test]
fn refs_without_a_release_are_accepted() {
    let token = decode_preview_ref("https://acme.prismic.io/previews/session-1?websitePreviewId=abc")
        .expect("token decodes");

    assert_eq!(token.repository_name, "acme");
    assert_eq!(token.release_id, None);
}

#[test]
fn toolbar_cookie_picks_the_entry_for_the_repository() {
    let raw = r#"{"_tracker":"x","other.prismic.io":{"preview":"https://other.prismic.io/previews/s:1"},"acme.prismic.io":{"preview":"https://acme.prismic.io/previews/s:2"}}"#;
    let encoded = utf8_percent_encode(raw, NON_ALPHANUMERIC).to_string();

    let token = decode_preview_cookie(&encoded, "acme").expect("token decodes");
    assert_eq!(token.repository_name, "acme");
    assert_eq!(token.release_id.as_deref(), Some("2"));

    let foreign = decode_preview_cookie(&encoded, "third").expect("falls back to first session");
    assert!(!foreign.is_for("third"));
}

#[test]
fn garbage_is_an_invalid_token() {
    for raw in ["", "   ", "not a url", "%7Bbroken", "%7B%7D"] {
        let result = decode_preview_cookie(raw, "acme");
        assert!(
            matches!(result, Err(PreviewError::InvalidPreviewToken(_))),
            "{raw:?} should be rejected, got {result:?}"
        );
    }
}
