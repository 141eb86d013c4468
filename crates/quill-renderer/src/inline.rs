//! Inline text enhancement: `==mark==` highlighting and bare-URL autolinking.
//!
//! Both run on raw text events (never inside code spans or fences, which the
//! renderer captures separately) and escape as they go.

use std::sync::LazyLock;

use regex::Regex;

use crate::state::escape_html;

static MARK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"==([^=\n]+)==").expect("valid regex"));

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"]+"#).expect("valid regex"));

/// Render a raw text run to HTML: escape, wrap `==spans==` in `<mark>`, and
/// hyperlink bare URLs.
#[must_use]
pub fn render_text(raw: &str) -> String {
    render(raw, true)
}

/// Like [`render_text`], but without autolinking. Used for text inside an
/// explicit link, where a nested anchor would be invalid.
#[must_use]
pub fn render_text_in_link(raw: &str) -> String {
    render(raw, false)
}

fn render(raw: &str, linkify: bool) -> String {
    let segment = |s: &str| {
        if linkify {
            autolink(s)
        } else {
            escape_html(s)
        }
    };
    let mut out = String::with_capacity(raw.len());
    let mut last = 0;
    for caps in MARK_RE.captures_iter(raw) {
        let whole = caps.get(0).expect("match 0 always present");
        out.push_str(&segment(&raw[last..whole.start()]));
        out.push_str("<mark>");
        out.push_str(&segment(&caps[1]));
        out.push_str("</mark>");
        last = whole.end();
    }
    out.push_str(&segment(&raw[last..]));
    out
}

/// Escape a text segment, turning bare URLs into anchors.
fn autolink(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut last = 0;
    for m in URL_RE.find_iter(segment) {
        out.push_str(&escape_html(&segment[last..m.start()]));
        let url = trim_trailing_punctuation(m.as_str());
        let escaped = escape_html(url);
        out.push_str(&format!(r#"<a href="{escaped}">{escaped}</a>"#));
        let consumed = m.start() + url.len();
        out.push_str(&escape_html(&segment[consumed..m.end()]));
        last = m.end();
    }
    out.push_str(&escape_html(&segment[last..]));
    out
}

/// Trailing sentence punctuation is prose, not part of the URL.
fn trim_trailing_punctuation(url: &str) -> &str {
    url.trim_end_matches(['.', ',', ';', ':', '!', '?', ')'])
}
