//! Markdown renderer for blog content.
//!
//! Converts author-trusted Markdown into HTML plus a table-of-contents
//! side-channel. Headings receive unique anchor ids (per-render slug
//! counters), fenced code blocks are routed through registered
//! [`FenceProcessor`]s first (the diagram processor lives in
//! `quill-diagrams`), then through syntax highlighting, then fall back to
//! escaped plain text.
//!
//! # Example
//!
//! ```
//! use quill_renderer::MarkdownRenderer;
//!
//! let mut renderer = MarkdownRenderer::new();
//! let result = renderer.render("## Hello\n\nworld");
//! assert!(result.html.contains(r#"<h2 id="hello">Hello</h2>"#));
//! assert_eq!(result.toc[0].id, "hello");
//! ```

mod code_block;
mod highlight;
mod inline;
mod renderer;
mod slug;
mod state;

pub use code_block::{FenceProcessor, FenceResult};
pub use highlight::SyntaxHighlighter;
pub use renderer::{MarkdownRenderer, RenderResult};
pub use slug::{SlugCounter, slugify};
pub use state::{TocItem, escape_html};
