//! Fence processor emitting inert diagram placeholders.
//!
//! Write side of the placeholder contract: a container element classed by
//! diagram kind, wrapping exactly one inert `<pre>` holding the escaped
//! source and a fresh random id. The reconcilers are the read side.

use quill_renderer::{FenceProcessor, FenceResult, escape_html};
use rand::Rng;

use crate::kind::DiagramKind;

/// Length of the random id suffix. Base-36, so 36^9 possible values; ample
/// for one page's lifetime, not cryptographic.
const ID_SUFFIX_LEN: usize = 9;

/// Generate a placeholder id of the form `<kind>-<random>`.
#[must_use]
pub fn generate_id(kind: DiagramKind) -> String {
    let mut rng = rand::rng();
    let mut suffix = String::with_capacity(ID_SUFFIX_LEN);
    for _ in 0..ID_SUFFIX_LEN {
        let digit = rng.random_range(0..36u32);
        suffix.push(char::from_digit(digit, 36).unwrap_or('0'));
    }
    format!("{}-{suffix}", kind.id_prefix())
}

/// Routes diagram-language fences to placeholder markup; everything else
/// passes through to highlighting.
#[derive(Debug, Default)]
pub struct DiagramProcessor;

impl DiagramProcessor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl FenceProcessor for DiagramProcessor {
    fn process(&mut self, language: &str, source: &str) -> FenceResult {
        let Some(kind) = DiagramKind::parse(language) else {
            return FenceResult::PassThrough;
        };
        // Named mermaid sub-notations keep their tag as the grammar's first
        // line; the generic "mermaid" tag's body already starts with one.
        let body = if kind == DiagramKind::Mermaid && language != "mermaid" {
            format!("{language}\n{source}")
        } else {
            source.to_owned()
        };
        let id = generate_id(kind);
        FenceResult::Html(format!(
            r#"<div class="{container}"><pre class="{element}" id="{id}">{body}</pre></div>"#,
            container = kind.container_class(),
            element = kind.element_class(),
            body = escape_html(body.trim_end_matches('\n')),
        ))
    }
}
