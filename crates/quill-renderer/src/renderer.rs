//! Event-driven markdown renderer.

use std::fmt::Write;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::code_block::{FenceProcessor, FenceResult};
use crate::highlight::SyntaxHighlighter;
use crate::inline;
use crate::state::{CodeBlockState, HeadingState, ImageState, TableState, TocItem, escape_html};

/// Result of rendering markdown.
///
/// Recomputed on every content change; never persisted. The HTML trusts its
/// source (author-controlled content, no sanitization pass).
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Rendered HTML content.
    pub html: String,
    /// Table of contents entries in document order.
    pub toc: Vec<TocItem>,
}

/// Markdown renderer with heading anchors, TOC extraction and a fence
/// processor seam.
///
/// One renderer is configured once (syntax set load, processor registration)
/// and then called repeatedly; per-render state (slug counters, TOC) resets
/// at the start of every [`render`](Self::render) call. Two calls with the
/// same input produce identical output and identically ordered TOCs, aside
/// from randomness inside processor-generated placeholder ids.
pub struct MarkdownRenderer {
    output: String,
    heading: HeadingState,
    code: CodeBlockState,
    table: TableState,
    image: ImageState,
    pending_image: Option<(String, String)>,
    link_depth: usize,
    highlighter: SyntaxHighlighter,
    processors: Vec<Box<dyn FenceProcessor>>,
}

impl MarkdownRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(4096),
            heading: HeadingState::default(),
            code: CodeBlockState::default(),
            table: TableState::default(),
            image: ImageState::default(),
            pending_image: None,
            link_depth: 0,
            highlighter: SyntaxHighlighter::new(),
            processors: Vec::new(),
        }
    }

    /// Register a fence processor. Processors are consulted in registration
    /// order when a fenced code block closes; the first returning HTML wins.
    #[must_use]
    pub fn with_processor<P: FenceProcessor + 'static>(mut self, processor: P) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    fn parser_options() -> Options {
        Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_MATH
    }

    /// Render markdown to HTML plus TOC.
    pub fn render(&mut self, markdown: &str) -> RenderResult {
        // Per-render environment reset.
        self.output.clear();
        self.heading.reset();
        self.code.reset();
        self.table.reset();
        self.image.reset();
        self.pending_image = None;
        self.link_depth = 0;

        for event in Parser::new_ext(markdown, Self::parser_options()) {
            self.process_event(event);
        }

        RenderResult {
            html: std::mem::take(&mut self.output),
            toc: self.heading.take_toc(),
        }
    }

    /// Push content to the output or the heading buffer based on context.
    fn push_inline(&mut self, content: &str) {
        if self.heading.is_active() {
            self.heading.push_html(content);
        } else {
            self.output.push_str(content);
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.raw_html(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.hard_break(),
            Event::Rule => self.push_inline("<hr>"),
            Event::TaskListMarker(checked) => self.task_list_marker(checked),
            Event::InlineMath(src) => {
                let span = format!(
                    r#"<span class="math math-inline">{}</span>"#,
                    escape_html(&src)
                );
                self.push_inline(&span);
            }
            Event::DisplayMath(src) => {
                let span = format!(
                    r#"<span class="math math-display">{}</span>"#,
                    escape_html(&src)
                );
                self.push_inline(&span);
            }
            Event::FootnoteReference(_) => {
                // Not supported
            }
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if !self.code.is_active() {
                    self.output.push_str("<p>");
                }
            }
            Tag::Heading { level, .. } => {
                // Opening tag is written in end_tag once the id is known.
                self.heading.start(heading_level_to_num(level));
            }
            Tag::BlockQuote(_) => self.output.push_str("<blockquote>"),
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(ref info) if !info.is_empty() => {
                        // Only the first token of the info string names the
                        // language.
                        info.split_ascii_whitespace().next().map(str::to_owned)
                    }
                    _ => None,
                };
                self.code.start(lang);
            }
            Tag::List(start) => match start {
                Some(1) => self.output.push_str("<ol>"),
                Some(n) => write!(self.output, r#"<ol start="{n}">"#).unwrap(),
                None => self.output.push_str("<ul>"),
            },
            Tag::Item => self.output.push_str("<li>"),
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::Table(alignments) => {
                self.table.start(alignments.clone());
                self.output.push_str("<table>");
            }
            Tag::TableHead => {
                self.table.start_head();
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.table.start_row();
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let align = self.table.current_alignment_style();
                let tag = if self.table.is_in_head() { "th" } else { "td" };
                write!(self.output, "<{tag}{align}>").unwrap();
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<s>"),
            Tag::Link { dest_url, .. } => {
                self.link_depth += 1;
                let link = format!(r#"<a href="{}">"#, escape_html(&dest_url));
                self.push_inline(&link);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                // Alt text arrives as events; the tag is emitted at end_tag.
                self.image.start();
                self.pending_image = Some((dest_url.to_string(), title.to_string()));
            }
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if !self.code.is_active() {
                    self.output.push_str("</p>");
                }
            }
            TagEnd::Heading(_) => {
                if let Some((level, id, html)) = self.heading.finish() {
                    write!(
                        self.output,
                        r#"<h{level} id="{}">{}</h{level}>"#,
                        escape_html(&id),
                        html.trim()
                    )
                    .unwrap();
                }
            }
            TagEnd::BlockQuote(_) => self.output.push_str("</blockquote>"),
            TagEnd::CodeBlock => self.code_fence_end(),
            TagEnd::List(ordered) => {
                self.output
                    .push_str(if ordered { "</ol>" } else { "</ul>" });
            }
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
            TagEnd::Image => {
                let alt = self.image.end();
                if let Some((src, title)) = self.pending_image.take() {
                    let title_attr = if title.is_empty() {
                        String::new()
                    } else {
                        format!(r#" title="{}""#, escape_html(&title))
                    };
                    write!(
                        self.output,
                        r#"<img src="{}"{title_attr} alt="{}">"#,
                        escape_html(&src),
                        escape_html(&alt)
                    )
                    .unwrap();
                }
            }
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.output.push_str("</tr></thead><tbody>");
                self.table.end_head();
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                self.output.push_str(if self.table.is_in_head() {
                    "</th>"
                } else {
                    "</td>"
                });
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</s>"),
            TagEnd::Link => {
                self.link_depth = self.link_depth.saturating_sub(1);
                self.push_inline("</a>");
            }
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
        }
    }

    /// Route a closed fence: processors first, then the highlighter, then
    /// escaped plain text.
    fn code_fence_end(&mut self) {
        let (lang, content) = self.code.end();

        if let Some(lang_str) = lang.as_deref() {
            for processor in &mut self.processors {
                if let FenceResult::Html(html) = processor.process(lang_str, &content) {
                    self.output.push_str(&html);
                    return;
                }
            }
            if let Some(markup) = self.highlighter.highlight(lang_str, &content) {
                write!(
                    self.output,
                    r#"<pre class="hljs"><code class="language-{}">{markup}</code></pre>"#,
                    escape_html(lang_str)
                )
                .unwrap();
                return;
            }
        }

        write!(
            self.output,
            r#"<pre class="hljs"><code>{}</code></pre>"#,
            escape_html(&content)
        )
        .unwrap();
    }

    fn text(&mut self, text: &str) {
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else if self.heading.is_active() {
            self.heading.push_text(text);
            let html = self.render_inline(text);
            self.heading.push_html(&html);
        } else {
            let html = self.render_inline(text);
            self.output.push_str(&html);
        }
    }

    /// Inline text rendering. Autolinking is suppressed inside an explicit
    /// link, where a nested anchor would be invalid markup.
    fn render_inline(&self, text: &str) -> String {
        if self.link_depth > 0 {
            inline::render_text_in_link(text)
        } else {
            inline::render_text(text)
        }
    }

    fn inline_code(&mut self, code: &str) {
        let html = format!("<code>{}</code>", escape_html(code));
        if self.heading.is_active() {
            // Inline code contributes its literal content to the TOC text.
            self.heading.push_text(code);
            self.heading.push_html(&html);
        } else {
            self.output.push_str(&html);
        }
    }

    fn raw_html(&mut self, html: &str) {
        // Author-trusted passthrough.
        if !self.image.is_active() {
            self.push_inline(html);
        }
    }

    fn soft_break(&mut self) {
        if self.code.is_active() {
            self.code.push_newline();
        } else if self.image.is_active() {
            self.image.push_str(" ");
        } else if self.heading.is_active() {
            self.heading.push_text(" ");
            self.heading.push_html("<br>");
        } else {
            // Soft line breaks render as line breaks.
            self.output.push_str("<br>\n");
        }
    }

    fn hard_break(&mut self) {
        self.push_inline("<br>");
    }

    fn task_list_marker(&mut self, checked: bool) {
        self.output.push_str(if checked {
            r#"<input type="checkbox" checked disabled> "#
        } else {
            r#"<input type="checkbox" disabled> "#
        });
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn render(markdown: &str) -> RenderResult {
        MarkdownRenderer::new().render(markdown)
    }

    #[test]
    fn test_basic_paragraph() {
        let result = render("Hello, world!");
        assert_eq!(result.html, "<p>Hello, world!</p>");
        assert!(result.toc.is_empty());
    }

    #[test]
    fn test_heading_with_id_and_toc() {
        let result = render("## Section Title");
        assert_eq!(result.html, r#"<h2 id="section-title">Section Title</h2>"#);
        assert_eq!(
            result.toc,
            vec![TocItem {
                id: "section-title".to_owned(),
                text: "Section Title".to_owned(),
                level: 2,
            }]
        );
    }

    #[test]
    fn test_duplicate_heading_ids() {
        let result = render("## FAQ\n\n## FAQ\n\n## FAQ");
        let ids: Vec<&str> = result.toc.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["faq", "faq-1", "faq-2"]);
    }

    #[test]
    fn test_headings_stripping_to_empty_share_counter() {
        let result = render("## 背景\n\n## 介绍\n\n## 说明");
        let ids: Vec<&str> = result.toc.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["", "-1", "-2"]);
        assert!(result.html.contains(r#"<h2 id="">背景</h2>"#));
        assert!(result.html.contains(r#"<h2 id="-1">介绍</h2>"#));
    }

    #[test]
    fn test_heading_with_inline_code() {
        let result = render("## Install `npm`");
        assert!(result.html.contains("<code>npm</code>"));
        assert_eq!(result.toc[0].text, "Install npm");
        assert_eq!(result.toc[0].id, "install-npm");
    }

    #[test]
    fn test_heading_with_nested_emphasis() {
        let result = render("## A *very* **big** deal");
        assert_eq!(result.toc[0].text, "A very big deal");
        assert!(result.html.contains("<em>very</em>"));
        assert!(result.html.contains("<strong>big</strong>"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let markdown = "# One\n\ntext ==marked== https://a.example\n\n## Two\n\n```rust\nfn f() {}\n```\n";
        let first = MarkdownRenderer::new().render(markdown);
        let second = MarkdownRenderer::new().render(markdown);
        assert_eq!(first.html, second.html);
        assert_eq!(first.toc, second.toc);
    }

    #[test]
    fn test_repeated_renders_reset_state() {
        let mut renderer = MarkdownRenderer::new();
        let first = renderer.render("## FAQ");
        let second = renderer.render("## FAQ");
        assert_eq!(first.toc[0].id, "faq");
        // Counters reset between calls, not across the renderer's lifetime.
        assert_eq!(second.toc[0].id, "faq");
    }

    #[test]
    fn test_highlighted_code_block() {
        let result = render("```rust\nfn main() {}\n```");
        assert!(result.html.contains(r#"<pre class="hljs">"#));
        assert!(result.html.contains(r#"class="language-rust""#));
        assert!(result.html.contains("<span"));
    }

    #[test]
    fn test_unknown_language_falls_back_plain() {
        let result = render("```definitely-not-a-language\na < b\n```");
        assert!(result.html.contains(r#"<pre class="hljs"><code>a &lt; b"#));
        assert!(!result.html.contains("language-definitely-not-a-language"));
    }

    #[test]
    fn test_fence_without_language_plain() {
        let result = render("```\nplain text\n```");
        assert!(
            result
                .html
                .contains(r#"<pre class="hljs"><code>plain text"#)
        );
    }

    #[test]
    fn test_mark_extension() {
        let result = render("this is ==important== text");
        assert!(result.html.contains("<mark>important</mark>"));
    }

    #[test]
    fn test_autolink_extension() {
        let result = render("see https://example.com/page for details");
        assert!(
            result
                .html
                .contains(r#"<a href="https://example.com/page">https://example.com/page</a>"#)
        );
    }

    #[test]
    fn test_no_autolink_inside_explicit_link() {
        let result = render("[https://example.com](https://example.com)");
        assert!(
            result
                .html
                .contains(r#"<a href="https://example.com">https://example.com</a>"#)
        );
        // A URL as link text must not produce a nested anchor.
        assert_eq!(result.html.matches("<a ").count(), 1);
    }

    #[test]
    fn test_autolink_resumes_after_link() {
        let result = render("[docs](https://a.example) and https://b.example");
        assert!(result.html.contains(r#"<a href="https://a.example">docs</a>"#));
        assert!(
            result
                .html
                .contains(r#"<a href="https://b.example">https://b.example</a>"#)
        );
    }

    #[test]
    fn test_math_spans() {
        let result = render("inline $x^2$ and\n\n$$\\sum_i x_i$$");
        assert!(result.html.contains(r#"<span class="math math-inline">x^2</span>"#));
        assert!(result.html.contains(r#"class="math math-display""#));
    }

    #[test]
    fn test_task_list() {
        let result = render("- [ ] todo\n- [x] done");
        assert!(result.html.contains(r#"<input type="checkbox" disabled>"#));
        assert!(
            result
                .html
                .contains(r#"<input type="checkbox" checked disabled>"#)
        );
    }

    #[test]
    fn test_soft_break_renders_br() {
        let result = render("line one\nline two");
        assert!(result.html.contains("line one<br>\nline two"));
    }

    #[test]
    fn test_raw_html_passthrough() {
        let result = render("<div class=\"custom\">raw</div>");
        assert!(result.html.contains(r#"<div class="custom">raw</div>"#));
    }

    #[test]
    fn test_strikethrough() {
        let result = render("~~gone~~");
        assert!(result.html.contains("<s>gone</s>"));
    }

    #[test]
    fn test_table() {
        let result = render("| A | B |\n|---|:-:|\n| 1 | 2 |");
        assert!(result.html.contains("<table>"));
        assert!(result.html.contains("<thead><tr><th>"));
        assert!(result.html.contains(r#"<td style="text-align: center">"#));
    }

    #[test]
    fn test_image() {
        let result = render("![Alt text](image.png)");
        assert!(
            result
                .html
                .contains(r#"<img src="image.png" alt="Alt text">"#)
        );
    }

    #[test]
    fn test_fence_processor_wins_over_highlighting() {
        struct Stub;
        impl FenceProcessor for Stub {
            fn process(&mut self, language: &str, source: &str) -> FenceResult {
                if language == "rust" {
                    FenceResult::Html(format!("<div class=\"stub\">{}</div>", source.len()))
                } else {
                    FenceResult::PassThrough
                }
            }
        }
        let mut renderer = MarkdownRenderer::new().with_processor(Stub);
        let result = renderer.render("```rust\nfn main() {}\n```");
        assert!(result.html.contains(r#"<div class="stub">"#));
        assert!(!result.html.contains("language-rust"));
    }

    #[test]
    fn test_fence_processor_passthrough_falls_to_highlighter() {
        struct Never;
        impl FenceProcessor for Never {
            fn process(&mut self, _language: &str, _source: &str) -> FenceResult {
                FenceResult::PassThrough
            }
        }
        let mut renderer = MarkdownRenderer::new().with_processor(Never);
        let result = renderer.render("```rust\nfn main() {}\n```");
        assert!(result.html.contains("language-rust"));
    }

    #[test]
    fn test_toc_document_order() {
        let result = render("# A\n\n### C\n\n## B");
        let levels: Vec<u8> = result.toc.iter().map(|t| t.level).collect();
        let ids: Vec<&str> = result.toc.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(levels, vec![1, 3, 2]);
        assert_eq!(ids, vec!["a", "c", "b"]);
    }
}
