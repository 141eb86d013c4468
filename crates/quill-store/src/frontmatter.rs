//! Frontmatter block parsing and filename/description helpers.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

static BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A---[ \t]*\n(.*?)\n---[ \t]*\n(.*)\z").expect("valid regex"));

static FILENAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})-(.+)$").expect("valid regex"));

static HEADING_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#+[ \t]+.*$").expect("valid regex"));

static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").expect("valid regex"));
static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid regex"));
static ITALIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*]+)\*").expect("valid regex"));
static CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("valid regex"));

/// Parsed metadata block. Recognized keys get typed accessors; unrecognized
/// keys pass through as opaque strings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frontmatter {
    fields: BTreeMap<String, String>,
}

impl Frontmatter {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.get("title")
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.get("description")
    }

    #[must_use]
    pub fn category_key(&self) -> Option<&str> {
        self.get("categoryKey")
    }

    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.get("tag")
    }

    #[must_use]
    pub fn badge(&self) -> Option<&str> {
        self.get("badge")
    }

    #[must_use]
    pub fn date(&self) -> Option<&str> {
        self.get("date")
    }

    #[must_use]
    pub fn platform(&self) -> Option<&str> {
        self.get("platform")
    }

    #[must_use]
    pub fn cover(&self) -> Option<&str> {
        self.get("cover")
    }

    /// The exported article id, if this file was written by the exporter.
    #[must_use]
    pub fn article_id(&self) -> Option<u64> {
        self.get("articleId").and_then(|v| v.parse().ok())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Split a Markdown file into its frontmatter block and body.
///
/// Files without a leading `---` block parse to an empty frontmatter with
/// the whole content as body. Inside the block, blank lines and `#` comment
/// lines are skipped; each remaining line splits on its first colon, and
/// quoted values (`"…"` or `'…'`) are unquoted, unescaping `\"` inside
/// double quotes.
#[must_use]
pub fn parse_frontmatter(content: &str) -> (Frontmatter, &str) {
    let Some(caps) = BLOCK_RE.captures(content) else {
        return (Frontmatter::default(), content);
    };
    let block = caps.get(1).map_or("", |m| m.as_str());
    let body = caps.get(2).map_or("", |m| m.as_str());

    let mut frontmatter = Frontmatter::default();
    for line in block.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some((key, raw_value)) = trimmed.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        frontmatter
            .fields
            .insert(key.to_owned(), unquote(raw_value.trim()));
    }
    (frontmatter, body)
}

fn unquote(value: &str) -> String {
    if value.len() >= 2 {
        if value.starts_with('"') && value.ends_with('"') {
            return value[1..value.len() - 1].replace("\\\"", "\"");
        }
        if value.starts_with('\'') && value.ends_with('\'') {
            return value[1..value.len() - 1].to_owned();
        }
    }
    value.to_owned()
}

/// Date and title hints carried by a content filename.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilenameInfo {
    pub date: Option<String>,
    pub title: Option<String>,
}

/// Extract date and title from a `YYYY-MM-DD-title.md` filename; plain
/// `title.md` names yield a title only. Hyphens in the title turn into
/// spaces.
#[must_use]
pub fn extract_info_from_filename(filename: &str) -> FilenameInfo {
    let stem = filename.strip_suffix(".md").unwrap_or(filename);
    if let Some(caps) = FILENAME_RE.captures(stem) {
        FilenameInfo {
            date: Some(caps[1].to_owned()),
            title: Some(caps[2].replace('-', " ")),
        }
    } else {
        FilenameInfo {
            date: None,
            title: Some(stem.replace('-', " ")),
        }
    }
}

/// Maximum description length, in characters.
const DESCRIPTION_LIMIT: usize = 150;

/// First paragraph of the body with inline Markdown markers stripped,
/// truncated to the description limit. Headings and code fences never
/// contribute.
#[must_use]
pub fn extract_description(content: &str) -> String {
    let (_, body) = parse_frontmatter(content);
    let without_headings = HEADING_LINE_RE.replace_all(body, "");

    let Some(paragraph) = without_headings
        .split("\n\n")
        .map(str::trim)
        .find(|p| !p.is_empty() && !p.starts_with("```"))
    else {
        return String::new();
    };

    let stripped = LINK_RE.replace_all(paragraph, "$1");
    let stripped = BOLD_RE.replace_all(&stripped, "$1");
    let stripped = ITALIC_RE.replace_all(&stripped, "$1");
    let stripped = CODE_RE.replace_all(&stripped, "$1");
    stripped.trim().chars().take(DESCRIPTION_LIMIT).collect()
}
