//! Per-render state containers shared by the renderer.

use std::fmt::Write;

use crate::slug::{SlugCounter, slugify};

/// One table-of-contents entry, emitted in document order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocItem {
    /// Anchor id, unique within a single render's output.
    pub id: String,
    /// Plain display text (inline markup stripped).
    pub text: String,
    /// Heading rank, 1-6.
    pub level: u8,
}

/// Escape the five characters the pipeline treats as markup-significant.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Heading capture: collects plain text (for the TOC) and rendered inline
/// HTML until the closing tag, then allocates the anchor id.
#[derive(Debug, Default)]
pub struct HeadingState {
    active: Option<ActiveHeading>,
    toc: Vec<TocItem>,
    slugs: SlugCounter,
}

#[derive(Debug)]
struct ActiveHeading {
    level: u8,
    text: String,
    html: String,
}

impl HeadingState {
    pub fn reset(&mut self) {
        self.active = None;
        self.toc.clear();
        self.slugs.reset();
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn start(&mut self, level: u8) {
        self.active = Some(ActiveHeading {
            level,
            text: String::new(),
            html: String::new(),
        });
    }

    /// Append to the plain-text buffer (TOC display text).
    pub fn push_text(&mut self, text: &str) {
        if let Some(active) = &mut self.active {
            active.text.push_str(text);
        }
    }

    /// Append to the rendered-HTML buffer.
    pub fn push_html(&mut self, html: &str) {
        if let Some(active) = &mut self.active {
            active.html.push_str(html);
        }
    }

    /// Close the heading: allocate its id, record the TOC entry, and return
    /// `(level, id, inner_html)` for emission.
    pub fn finish(&mut self) -> Option<(u8, String, String)> {
        let active = self.active.take()?;
        let text = active.text.trim().to_owned();
        let id = self.slugs.assign(&slugify(&text));
        self.toc.push(TocItem {
            id: id.clone(),
            text,
            level: active.level,
        });
        Some((active.level, id, active.html))
    }

    pub fn take_toc(&mut self) -> Vec<TocItem> {
        std::mem::take(&mut self.toc)
    }
}

/// Fenced/indented code block capture.
#[derive(Debug, Default)]
pub struct CodeBlockState {
    active: Option<(Option<String>, String)>,
}

impl CodeBlockState {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn start(&mut self, lang: Option<String>) {
        self.active = Some((lang, String::new()));
    }

    pub fn push_str(&mut self, text: &str) {
        if let Some((_, content)) = &mut self.active {
            content.push_str(text);
        }
    }

    pub fn push_newline(&mut self) {
        self.push_str("\n");
    }

    /// Close the block, returning `(language, content)`.
    pub fn end(&mut self) -> (Option<String>, String) {
        self.active.take().unwrap_or((None, String::new()))
    }

    pub fn reset(&mut self) {
        self.active = None;
    }
}

/// Table rendering state (header/body phase and per-column alignment).
#[derive(Debug, Default)]
pub struct TableState {
    alignments: Vec<pulldown_cmark::Alignment>,
    in_head: bool,
    cell_index: usize,
}

impl TableState {
    pub fn start(&mut self, alignments: Vec<pulldown_cmark::Alignment>) {
        self.alignments = alignments;
        self.in_head = false;
        self.cell_index = 0;
    }

    pub fn start_head(&mut self) {
        self.in_head = true;
        self.cell_index = 0;
    }

    pub fn end_head(&mut self) {
        self.in_head = false;
    }

    pub fn start_row(&mut self) {
        self.cell_index = 0;
    }

    pub fn next_cell(&mut self) {
        self.cell_index += 1;
    }

    #[must_use]
    pub fn is_in_head(&self) -> bool {
        self.in_head
    }

    /// Inline style attribute for the current cell's alignment.
    #[must_use]
    pub fn current_alignment_style(&self) -> String {
        use pulldown_cmark::Alignment;
        let align = self
            .alignments
            .get(self.cell_index)
            .copied()
            .unwrap_or(Alignment::None);
        let mut out = String::new();
        match align {
            Alignment::Left => write!(out, r#" style="text-align: left""#).unwrap(),
            Alignment::Center => write!(out, r#" style="text-align: center""#).unwrap(),
            Alignment::Right => write!(out, r#" style="text-align: right""#).unwrap(),
            Alignment::None => {}
        }
        out
    }

    pub fn reset(&mut self) {
        self.alignments.clear();
        self.in_head = false;
        self.cell_index = 0;
    }
}

/// Image alt-text capture (alt text arrives as events between the image
/// start and end tags).
#[derive(Debug, Default)]
pub struct ImageState {
    active: Option<String>,
}

impl ImageState {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn start(&mut self) {
        self.active = Some(String::new());
    }

    pub fn push_str(&mut self, text: &str) {
        if let Some(alt) = &mut self.active {
            alt.push_str(text);
        }
    }

    pub fn end(&mut self) -> String {
        self.active.take().unwrap_or_default()
    }

    pub fn reset(&mut self) {
        self.active = None;
    }
}
