use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenderedText {
    pub html: String,
    pub text: String,
}

/// Turns a raw structured-text field into HTML and plain text.
pub trait RichTextSerializer: Send + Sync {
    fn render(&self, raw: &[Value]) -> RenderedText;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlSerializer;

impl RichTextSerializer for HtmlSerializer {
    fn render(&self, raw: &[Value]) -> RenderedText {
        RenderedText {
            html: as_html(raw),
            text: as_text(raw),
        }
    }
}

pub fn as_text(blocks: &[Value]) -> String {
    blocks
        .iter()
        .filter_map(|block| block.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn tag(self) -> &'static str {
        match self {
            Self::Unordered => "ul",
            Self::Ordered => "ol",
        }
    }
}

pub fn as_html(blocks: &[Value]) -> String {
    let mut html = String::new();
    let mut open_list: Option<ListKind> = None;

    for block in blocks {
        let block_type = block.get("type").and_then(Value::as_str).unwrap_or_default();
        let list = match block_type {
            "list-item" => Some(ListKind::Unordered),
            "o-list-item" => Some(ListKind::Ordered),
            _ => None,
        };

        if open_list != list {
            if let Some(kind) = open_list {
                html.push_str(&format!("</{}>", kind.tag()));
            }
            if let Some(kind) = list {
                html.push_str(&format!("<{}>", kind.tag()));
            }
            open_list = list;
        }

        html.push_str(&render_block(block_type, block));
    }

    if let Some(kind) = open_list {
        html.push_str(&format!("</{}>", kind.tag()));
    }
    html
}

fn render_block(block_type: &str, block: &Value) -> String {
    match block_type {
        "paragraph" => format!("<p>{}</p>", inline(block).replace('\n', "<br />")),
        "preformatted" => format!("<pre>{}</pre>", inline(block)),
        "heading1" | "heading2" | "heading3" | "heading4" | "heading5" | "heading6" => {
            let level = &block_type["heading".len()..];
            format!("<h{level}>{}</h{level}>", inline(block))
        }
        "list-item" | "o-list-item" => format!("<li>{}</li>", inline(block)),
        "image" => {
            let url = block.get("url").and_then(Value::as_str).unwrap_or_default();
            let alt = block.get("alt").and_then(Value::as_str).unwrap_or_default();
            format!(
                r#"<p class="block-img"><img src="{}" alt="{}" /></p>"#,
                escape(url),
                escape(alt)
            )
        }
        "embed" => {
            let oembed = block.get("oembed").cloned().unwrap_or(Value::Null);
            let field = |name: &str| {
                oembed
                    .get(name)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            format!(
                r#"<div data-oembed="{}" data-oembed-type="{}" data-oembed-provider="{}">{}</div>"#,
                escape(&field("embed_url")),
                escape(&field("type")),
                escape(&field("provider_name")),
                field("html")
            )
        }
        other => {
            tracing::debug!(block_type = other, "unknown structured text block");
            format!("<p>{}</p>", inline(block))
        }
    }
}

struct Span<'a> {
    start: usize,
    end: usize,
    kind: &'a str,
    data: Option<&'a Value>,
}

fn inline(block: &Value) -> String {
    let text = block.get("text").and_then(Value::as_str).unwrap_or_default();
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let offsets = utf16_offsets(&chars);

    let mut spans: Vec<Span<'_>> = block
        .get("spans")
        .and_then(Value::as_array)
        .map(|raw| {
            raw.iter()
                .filter_map(|span| {
                    let start = span.get("start").and_then(Value::as_u64)? as usize;
                    let end = span.get("end").and_then(Value::as_u64)? as usize;
                    let kind = span.get("type").and_then(Value::as_str)?;
                    let (start, end) = (char_index(&offsets, start), char_index(&offsets, end));
                    (start < end).then_some(Span {
                        start,
                        end,
                        kind,
                        data: span.get("data"),
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    if spans.is_empty() {
        return escape(text);
    }
    // Outermost spans first.
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut boundaries: Vec<usize> = vec![0, len];
    for span in &spans {
        boundaries.push(span.start);
        boundaries.push(span.end);
    }
    boundaries.sort_unstable();
    boundaries.dedup();

    let mut html = String::new();
    for window in boundaries.windows(2) {
        let (from, to) = (window[0], window[1]);
        let segment: String = chars[from..to].iter().collect();
        let active: Vec<&Span<'_>> = spans
            .iter()
            .filter(|span| span.start <= from && span.end >= to)
            .collect();

        let mut piece = escape(&segment);
        for span in active.iter().rev() {
            piece = wrap(span, &piece);
        }
        html.push_str(&piece);
    }
    html
}

// Span offsets count UTF-16 code units. `offsets[i]` is where char `i` starts,
// with one trailing entry for the end of the text.
fn utf16_offsets(chars: &[char]) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(chars.len() + 1);
    let mut unit = 0;
    for ch in chars {
        offsets.push(unit);
        unit += ch.len_utf16();
    }
    offsets.push(unit);
    offsets
}

// An offset inside a surrogate pair rounds up to the next char.
fn char_index(offsets: &[usize], unit: usize) -> usize {
    offsets
        .partition_point(|&start| start < unit)
        .min(offsets.len().saturating_sub(1))
}

fn wrap(span: &Span<'_>, inner: &str) -> String {
    match span.kind {
        "strong" => format!("<strong>{inner}</strong>"),
        "em" => format!("<em>{inner}</em>"),
        "label" => {
            let label = span
                .data
                .and_then(|data| data.get("label"))
                .and_then(Value::as_str)
                .unwrap_or_default();
            format!(r#"<span class="{}">{inner}</span>"#, escape(label))
        }
        "hyperlink" => {
            let data = span.data;
            let url = data
                .and_then(|data| data.get("url"))
                .and_then(Value::as_str);
            let target = data
                .and_then(|data| data.get("target"))
                .and_then(Value::as_str);
            match (url, target) {
                (Some(url), Some(target)) => format!(
                    r#"<a href="{}" target="{}" rel="noopener">{inner}</a>"#,
                    escape(url),
                    escape(target)
                ),
                (Some(url), None) => format!(r#"<a href="{}">{inner}</a>"#, escape(url)),
                _ => format!("<a>{inner}</a>"),
            }
        }
        _ => inner.to_string(),
    }
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
