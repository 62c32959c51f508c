use prismic_preview::normalizer::richtext::{as_html, as_text, HtmlSerializer, RichTextSerializer};
use serde_json::{json, Value};

fn blocks(value: Value) -> Vec<Value> {
    value.as_array().cloned().expect("blocks are an array")
}

#[test]
fn single_paragraph_renders_plainly() {
    let rendered = HtmlSerializer.render(&blocks(json!([{"type": "paragraph", "text": "foo"}])));

    assert_eq!(rendered.html, "<p>foo</p>");
    assert_eq!(rendered.text, "foo");
}

#[test]
fn consecutive_list_items_share_one_list() {
    let raw = blocks(json!([
        {"type": "heading3", "text": "Steps", "spans": []},
        {"type": "o-list-item", "text": "one", "spans": []},
        {"type": "o-list-item", "text": "two", "spans": []},
        {"type": "list-item", "text": "bullet", "spans": []},
        {"type": "preformatted", "text": "a\nb", "spans": []}
    ]));

    assert_eq!(
        as_html(&raw),
        "<h3>Steps</h3><ol><li>one</li><li>two</li></ol><ul><li>bullet</li></ul><pre>a\nb</pre>"
    );
    assert_eq!(as_text(&raw), "Steps one two bullet a\nb");
}

#[test]
fn spans_nest_and_links_render() {
    let raw = blocks(json!([{
        "type": "paragraph",
        "text": "bold and both",
        "spans": [
            {"start": 0, "end": 13, "type": "strong"},
            {"start": 9, "end": 13, "type": "em"},
            {"start": 5, "end": 8, "type": "hyperlink", "data": {"link_type": "Web", "url": "https://example.com", "target": "_blank"}}
        ]
    }]));

    assert_eq!(
        as_html(&raw),
        concat!(
            "<p><strong>bold </strong>",
            "<strong><a href=\"https://example.com\" target=\"_blank\" rel=\"noopener\">and</a></strong>",
            "<strong> </strong>",
            "<strong><em>both</em></strong></p>"
        )
    );
}

#[test]
fn text_is_escaped_and_line_breaks_kept() {
    let raw = blocks(json!([{"type": "paragraph", "text": "a < b & \"c\"\nnext", "spans": []}]));

    assert_eq!(as_html(&raw), "<p>a &lt; b &amp; &quot;c&quot;<br />next</p>");
}

#[test]
fn images_and_embeds_render_as_blocks() {
    let raw = blocks(json!([
        {"type": "image", "url": "https://images.example/a.png", "alt": "A", "dimensions": {"width": 1, "height": 1}},
        {"type": "embed", "oembed": {"embed_url": "https://youtu.be/x", "type": "video", "provider_name": "YouTube", "html": "<iframe></iframe>"}}
    ]));

    assert_eq!(
        as_html(&raw),
        concat!(
            "<p class=\"block-img\"><img src=\"https://images.example/a.png\" alt=\"A\" /></p>",
            "<div data-oembed=\"https://youtu.be/x\" data-oembed-type=\"video\" data-oembed-provider=\"YouTube\"><iframe></iframe></div>"
        )
    );
    assert_eq!(as_text(&raw), "");
}

#[test]
fn span_offsets_count_utf16_units() {
    let raw = blocks(json!([{
        "type": "paragraph",
        "text": "😀 bold 🎉 end",
        "spans": [
            {"start": 3, "end": 7, "type": "strong"},
            {"start": 8, "end": 10, "type": "em"},
            {"start": 11, "end": 99, "type": "em"}
        ]
    }]));

    assert_eq!(
        as_html(&raw),
        "<p>😀 <strong>bold</strong> <em>🎉</em> <em>end</em></p>"
    );
}
