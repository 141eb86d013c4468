//! Article-to-Markdown export (the inverse of frontmatter parsing).

use std::sync::LazyLock;

use regex::Regex;

use crate::article::Article;

static TITLE_CLEAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));
static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static DASH_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").expect("valid regex"));

/// Serialize an article back into a frontmatter block plus body. The
/// `articleId` field keys exported files back to their store record on
/// delete.
#[must_use]
pub fn article_to_markdown(article: &Article) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut push = |key: &str, value: &str| {
        if !value.is_empty() {
            lines.push(format!("{key}: {}", quote_value(value)));
        }
    };
    push("title", &article.title);
    push("description", &article.description);
    push("categoryKey", &article.category_key);
    push("tag", &article.tag);
    if let Some(badge) = &article.badge {
        push("badge", badge);
    }
    push("date", &article.date);
    push("platform", &article.platform);
    push("cover", &article.cover);
    push("articleId", &article.id.to_string());

    let block = if lines.is_empty() {
        String::new()
    } else {
        format!("---\n{}\n---\n\n", lines.join("\n"))
    };
    format!("{block}{}", article.content.trim())
}

/// Quote a value when it would not survive the parser bare: embedded `:`,
/// comment and YAML indicator characters, edge whitespace, or newlines.
/// Double quotes inside are escaped.
fn quote_value(value: &str) -> String {
    let needs_quoting = value.contains([':', '#', '|', '&', '*', '!', '%', '@', '`', '\n'])
        || value.starts_with(' ')
        || value.ends_with(' ');
    if needs_quoting {
        format!("\"{}\"", value.replace('"', "\\\""))
    } else {
        value.to_owned()
    }
}

/// Filename (without extension) for an exported article:
/// `{date}-{cleaned-title}`. Missing dates fall back to today.
#[must_use]
pub fn generate_filename(article: &Article) -> String {
    let date = if article.date.is_empty() {
        chrono::Local::now().format("%Y-%m-%d").to_string()
    } else {
        article.date.clone()
    };
    let title = if article.title.is_empty() {
        "untitled"
    } else {
        &article.title
    };
    let clean = title.to_lowercase();
    let clean = TITLE_CLEAN_RE.replace_all(&clean, "");
    let clean = SPACE_RE.replace_all(clean.trim(), "-");
    let clean = DASH_RUN_RE.replace_all(&clean, "-");
    format!("{date}-{clean}")
}
