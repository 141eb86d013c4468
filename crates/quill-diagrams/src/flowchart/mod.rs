//! Flow-diagram reconciler: turns inert placeholders into drawn SVG.

pub mod grammar;
pub mod svg;

use quill_dom::{Document, NodeId};
use quill_renderer::escape_html;

use crate::cache::SourceCache;
use crate::kind::DiagramKind;
use crate::processor::generate_id;
use crate::theme::{FlowchartOptions, ThemeMode};

pub use grammar::{FlowDiagram, FlowchartError};

/// Delay between restoring placeholders and re-scanning on a forced
/// re-render, giving the view a settle window after the DOM mutation.
pub const SETTLE_DELAY_MS: u64 = 50;

/// Scans for flow-diagram placeholder containers and replaces each with
/// drawn output. Safe to run repeatedly: rendered placeholders are marked
/// and skipped on later passes.
#[derive(Debug, Default)]
pub struct FlowchartReconciler {
    cache: SourceCache,
}

impl FlowchartReconciler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Render every unrendered placeholder under `root` (every placeholder
    /// when `force` is set).
    pub fn scan(&mut self, doc: &mut Document, root: NodeId, force: bool) {
        let kind = DiagramKind::Flowchart;
        for container in doc.query_class(root, kind.container_class()) {
            let Some(element) = find_placeholder(doc, container, kind) else {
                continue;
            };
            self.render_placeholder(doc, container, element, force);
        }
    }

    fn render_placeholder(
        &mut self,
        doc: &mut Document,
        container: NodeId,
        element: NodeId,
        force: bool,
    ) {
        let kind = DiagramKind::Flowchart;
        let id = match doc.element_id(element) {
            Some(id) => id.to_owned(),
            None => generate_id(kind),
        };

        let mut source = doc.text_content(element);
        if source.trim().is_empty()
            && force
            && let Some(cached) = self.cache.get(container)
        {
            source = cached.to_owned();
        }
        if !source.trim().is_empty() {
            self.cache.record(container, &source);
        }
        if source.trim().is_empty() {
            return;
        }
        if doc.has_class(element, kind.rendered_class()) && !force {
            return;
        }
        // Marked before drawing so a failed draw cannot retry forever.
        doc.add_class(element, kind.rendered_class());

        match grammar::parse(&source) {
            Ok(diagram) => {
                let options = FlowchartOptions::for_mode(ThemeMode::detect(doc));
                let markup = svg::draw(&diagram, &options);
                doc.set_inner_html(
                    container,
                    &format!(r#"<div class="flowchart-svg-container" id="{id}-svg">{markup}</div>"#),
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "Flow diagram rendering failed");
                doc.set_inner_html(
                    container,
                    &format!(
                        r#"<pre class="{}">{}</pre>"#,
                        kind.error_class(),
                        escape_html(&source)
                    ),
                );
            }
        }
    }

    /// Forced re-render, step one: swap every drawn container with a cache
    /// entry back to an inert placeholder (cached source, fresh id).
    /// Containers without a cache entry are skipped silently. Returns the
    /// number restored; callers re-scan after [`SETTLE_DELAY_MS`].
    pub fn restore_placeholders(&mut self, doc: &mut Document, root: NodeId) -> usize {
        let kind = DiagramKind::Flowchart;
        let mut restored = 0;
        for container in doc.query_class(root, kind.container_class()) {
            if doc.query_class(container, "flowchart-svg-container").is_empty() {
                continue;
            }
            let Some(source) = self.cache.get(container).map(str::to_owned) else {
                continue;
            };
            let id = generate_id(kind);
            doc.set_inner_html(
                container,
                &format!(
                    r#"<pre class="{}" id="{id}">{}</pre>"#,
                    kind.element_class(),
                    escape_html(&source)
                ),
            );
            restored += 1;
        }
        restored
    }
}

/// The placeholder element inside a container: the first child carrying the
/// kind's element class but not drawn output.
pub(crate) fn find_placeholder(
    doc: &Document,
    container: NodeId,
    kind: DiagramKind,
) -> Option<NodeId> {
    doc.query_class(container, kind.element_class())
        .into_iter()
        .find(|&n| n != container && doc.tag(n) == Some("pre"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quill_dom::Document;

    use super::*;

    const PLACEHOLDER: &str = r#"<div class="flowchart-container"><pre class="flowchart" id="flowchart-abc123def">st=&gt;start: Go
e=&gt;end: Done
st-&gt;e</pre></div>"#;

    fn setup() -> (Document, NodeId) {
        let mut doc = Document::new();
        let content = doc.create_element("div");
        doc.append_child(doc.root(), content);
        doc.set_inner_html(content, PLACEHOLDER);
        (doc, content)
    }

    fn container(doc: &Document, root: NodeId) -> NodeId {
        doc.query_class(root, "flowchart-container")[0]
    }

    #[test]
    fn test_scan_draws_svg() {
        let (mut doc, root) = setup();
        let mut reconciler = FlowchartReconciler::new();
        reconciler.scan(&mut doc, root, false);

        let c = container(&doc, root);
        let html = doc.inner_html(c);
        assert!(html.contains(r#"class="flowchart-svg-container""#));
        assert!(html.contains(r#"id="flowchart-abc123def-svg""#));
        assert!(html.contains("<svg"));
    }

    #[test]
    fn test_scan_is_idempotent() {
        let (mut doc, root) = setup();
        let mut reconciler = FlowchartReconciler::new();
        reconciler.scan(&mut doc, root, false);
        let first = doc.inner_html(container(&doc, root));
        reconciler.scan(&mut doc, root, false);
        let second = doc.inner_html(container(&doc, root));
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_failure_renders_error_block() {
        let mut doc = Document::new();
        let content = doc.create_element("div");
        doc.append_child(doc.root(), content);
        doc.set_inner_html(
            content,
            r#"<div class="flowchart-container"><pre class="flowchart" id="flowchart-x">not a diagram</pre></div>"#,
        );
        let mut reconciler = FlowchartReconciler::new();
        reconciler.scan(&mut doc, content, false);

        let html = doc.inner_html(container(&doc, content));
        assert!(html.contains(r#"<pre class="flowchart-error">not a diagram</pre>"#));
        assert!(!html.contains("<svg"));
    }

    #[test]
    fn test_empty_placeholder_skipped() {
        let mut doc = Document::new();
        let content = doc.create_element("div");
        doc.append_child(doc.root(), content);
        doc.set_inner_html(
            content,
            r#"<div class="flowchart-container"><pre class="flowchart" id="flowchart-x"></pre></div>"#,
        );
        let mut reconciler = FlowchartReconciler::new();
        reconciler.scan(&mut doc, content, false);

        let html = doc.inner_html(container(&doc, content));
        assert!(html.contains(r#"<pre class="flowchart""#));
        assert!(!html.contains("<svg"));
        assert!(!html.contains("flowchart-error"));
    }

    #[test]
    fn test_restore_then_rescan_redraws() {
        let (mut doc, root) = setup();
        let mut reconciler = FlowchartReconciler::new();
        reconciler.scan(&mut doc, root, false);

        let restored = reconciler.restore_placeholders(&mut doc, root);
        assert_eq!(restored, 1);

        let c = container(&doc, root);
        let html = doc.inner_html(c);
        assert!(html.contains(r#"<pre class="flowchart""#));
        assert!(html.contains("st=&gt;start: Go"));
        // Fresh id, not the original.
        assert!(!html.contains("flowchart-abc123def"));

        reconciler.scan(&mut doc, root, true);
        assert!(doc.inner_html(c).contains("<svg"));
    }

    #[test]
    fn test_restore_skips_uncached_container() {
        let mut doc = Document::new();
        let content = doc.create_element("div");
        doc.append_child(doc.root(), content);
        // A container already holding drawn output the reconciler never saw.
        doc.set_inner_html(
            content,
            r#"<div class="flowchart-container"><div class="flowchart-svg-container" id="flowchart-y-svg"><svg></svg></div></div>"#,
        );
        let mut reconciler = FlowchartReconciler::new();

        let restored = reconciler.restore_placeholders(&mut doc, content);
        assert_eq!(restored, 0);
        assert!(doc.inner_html(container(&doc, content)).contains("<svg"));
    }

    #[test]
    fn test_dark_theme_palette_used() {
        let (mut doc, root) = setup();
        let html_root = doc.root();
        doc.add_class(html_root, "dark");
        let mut reconciler = FlowchartReconciler::new();
        reconciler.scan(&mut doc, root, false);

        let html = doc.inner_html(container(&doc, root));
        assert!(html.contains("#2a2a2a"));
    }
}
