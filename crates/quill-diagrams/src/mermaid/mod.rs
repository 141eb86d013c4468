//! Graph-diagram reconciler.
//!
//! The drawing engine is an external collaborator behind [`MermaidEngine`];
//! this module owns the reconcile protocol: scanning, the rendered marker,
//! the source cache, theme-driven (re)initialization, and fallbacks.

use quill_dom::{Document, NodeId};
use quill_renderer::escape_html;
use thiserror::Error;

use crate::cache::SourceCache;
use crate::flowchart::find_placeholder;
use crate::kind::DiagramKind;
use crate::processor::generate_id;
use crate::theme::{MermaidConfig, ThemeMode};

#[derive(Debug, Error)]
pub enum MermaidError {
    #[error("mermaid rendering failed: {0}")]
    Render(String),
}

/// Graph-diagram drawing engine.
///
/// `initialize` is called once before the first render and again whenever
/// the theme changes; the full configuration is passed each time. `render`
/// produces SVG markup for one diagram.
pub trait MermaidEngine {
    fn initialize(&mut self, config: &MermaidConfig);
    fn render(&mut self, id: &str, source: &str) -> Result<String, MermaidError>;
}

/// One pending placeholder render. Jobs resolve independently and in no
/// guaranteed order; a job whose target has been detached by the time it
/// runs is discarded.
#[derive(Clone, Debug)]
pub struct MermaidJob {
    /// The wrapping `.mermaid-container`, absent on the legacy path.
    pub container: Option<NodeId>,
    pub element: NodeId,
    pub render_id: String,
    pub source: String,
}

/// Reconciler for mermaid placeholders.
pub struct MermaidReconciler<E> {
    engine: E,
    initialized: Option<ThemeMode>,
    cache: SourceCache,
}

impl<E: MermaidEngine> MermaidReconciler<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            initialized: None,
            cache: SourceCache::new(),
        }
    }

    /// The injected engine, for inspection by embedding code and tests.
    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Initialize the engine for the current theme. Re-runs only when the
    /// theme has changed since the last call.
    fn ensure_initialized(&mut self, doc: &Document) {
        let mode = ThemeMode::detect(doc);
        if self.initialized != Some(mode) {
            self.engine.initialize(&MermaidConfig::for_mode(mode));
            self.initialized = Some(mode);
        }
    }

    /// Scan for unrendered `pre.mermaid` placeholders under `root` and
    /// return one render job per placeholder. Marks each as rendered before
    /// returning, so overlapping scans cannot double-render.
    pub fn collect_jobs(&mut self, doc: &mut Document, root: NodeId, force: bool) -> Vec<MermaidJob> {
        self.ensure_initialized(doc);
        let kind = DiagramKind::Mermaid;
        let mut jobs = Vec::new();

        let elements: Vec<NodeId> = doc
            .query_class(root, kind.element_class())
            .into_iter()
            .filter(|&n| doc.tag(n) == Some("pre"))
            .filter(|&n| force || !doc.has_class(n, kind.rendered_class()))
            .collect();

        for element in elements {
            let container = doc
                .parent(element)
                .filter(|&p| doc.has_class(p, kind.container_class()));
            // The legacy path (bare pre.mermaid) caches on the element itself.
            let cache_key = container.unwrap_or(element);

            let mut source = doc.text_content(element);
            // On a forced re-scan an already-drawn element holds SVG text,
            // not diagram source; the cache entry is authoritative there.
            if force
                && (source.trim().is_empty() || doc.has_class(element, kind.rendered_class()))
                && let Some(cached) = self.cache.get(cache_key)
            {
                source = cached.to_owned();
            }
            if !source.trim().is_empty() {
                self.cache.record(cache_key, &source);
            }
            if source.trim().is_empty() {
                continue;
            }

            doc.add_class(element, kind.rendered_class());
            let id = match doc.element_id(element) {
                Some(id) => id.to_owned(),
                None => generate_id(kind),
            };
            jobs.push(MermaidJob {
                container,
                element,
                render_id: format!("{id}-svg"),
                source,
            });
        }
        jobs
    }

    /// Resolve one render job against the document. Detached targets are
    /// dropped without drawing.
    pub fn render_job(&mut self, doc: &mut Document, job: &MermaidJob) {
        let target = job.container.unwrap_or(job.element);
        if !doc.is_attached(target) {
            tracing::debug!(render_id = %job.render_id, "Discarding render for detached node");
            return;
        }
        match self.engine.render(&job.render_id, &job.source) {
            Ok(svg) => doc.set_inner_html(target, &svg),
            Err(e) => {
                tracing::warn!(error = %e, "Mermaid rendering failed");
                if let Some(container) = job.container {
                    doc.set_inner_html(
                        container,
                        &format!(
                            r#"<pre class="{}">{}</pre>"#,
                            DiagramKind::Mermaid.error_class(),
                            escape_html(&job.source)
                        ),
                    );
                }
            }
        }
    }

    /// Forced re-render, step one: swap drawn containers with cache entries
    /// back to inert placeholders. Mirrors the flow protocol; callers
    /// re-scan after the settle delay.
    pub fn restore_placeholders(&mut self, doc: &mut Document, root: NodeId) -> usize {
        let kind = DiagramKind::Mermaid;
        let mut restored = 0;
        for container in doc.query_class(root, kind.container_class()) {
            if find_placeholder(doc, container, kind).is_some() {
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
