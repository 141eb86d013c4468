//! Article view: the full pipeline assembled around one document.
//!
//! `display` installs rendered markdown under the content root and schedules
//! the augmenter and both reconcilers for the next tick; `set_dark` flips
//! the root class and schedules the forced re-render protocol. The view owns
//! a virtual-clock scheduler, so tests (and any embedding host) drive time
//! explicitly.

use quill_diagrams::{
    DiagramProcessor, FlowchartReconciler, MermaidEngine, MermaidJob, MermaidReconciler,
    SETTLE_DELAY_MS,
};
use quill_dom::{Document, NodeId, Scheduler};
use quill_renderer::{MarkdownRenderer, TocItem};
use quill_store::Article;

use crate::copy::{COPY_FEEDBACK_MS, Clipboard, CopyAugmenter, copy_code, revert_copy_label};

/// Deferred pipeline work.
pub enum ViewTask {
    /// Add copy buttons to highlighted code blocks.
    Augment,
    ScanFlowcharts { force: bool },
    RestoreFlowcharts,
    ScanMermaid { force: bool },
    RestoreMermaid,
    /// One independently-resolving mermaid render.
    RenderMermaid(MermaidJob),
    RevertCopyLabel { button: NodeId, label: String },
}

/// One article's rendered view plus the machinery that keeps it live.
pub struct ArticleView<E, C> {
    doc: Document,
    content_root: NodeId,
    renderer: MarkdownRenderer,
    flow: FlowchartReconciler,
    mermaid: MermaidReconciler<E>,
    clipboard: C,
    scheduler: Scheduler<ViewTask>,
    toc: Vec<TocItem>,
}

impl<E: MermaidEngine, C: Clipboard> ArticleView<E, C> {
    pub fn new(engine: E, clipboard: C) -> Self {
        let mut doc = Document::new();
        let content_root = doc.create_element("div");
        doc.set_attr(content_root, "class", "article-content");
        let root = doc.root();
        doc.append_child(root, content_root);

        Self {
            doc,
            content_root,
            renderer: MarkdownRenderer::new().with_processor(DiagramProcessor::new()),
            flow: FlowchartReconciler::new(),
            mermaid: MermaidReconciler::new(engine),
            clipboard,
            scheduler: Scheduler::new(),
            toc: Vec::new(),
        }
    }

    /// Render markdown into the content root and schedule the enhancement
    /// passes.
    pub fn display(&mut self, markdown: &str) {
        let result = self.renderer.render(markdown);
        self.doc.set_inner_html(self.content_root, &result.html);
        self.toc = result.toc;
        self.scheduler.schedule(ViewTask::Augment);
        self.scheduler.schedule(ViewTask::ScanFlowcharts { force: false });
        self.scheduler.schedule(ViewTask::ScanMermaid { force: false });
    }

    /// Display a stored article's content.
    pub fn display_article(&mut self, article: &Article) {
        self.display(&article.content);
    }

    /// Flip the theme and schedule forced re-renders of every cached
    /// diagram.
    pub fn set_dark(&mut self, dark: bool) {
        let root = self.doc.root();
        if dark {
            self.doc.add_class(root, "dark");
        } else {
            self.doc.remove_class(root, "dark");
        }
        self.scheduler.schedule(ViewTask::RestoreFlowcharts);
        self.scheduler.schedule(ViewTask::RestoreMermaid);
    }

    /// Handle a click on a copy button.
    pub fn click_copy(&mut self, button: NodeId) {
        if let Some(label) = copy_code(&mut self.doc, &mut self.clipboard, button) {
            self.scheduler
                .schedule_after(COPY_FEEDBACK_MS, ViewTask::RevertCopyLabel { button, label });
        }
    }

    fn run_task(&mut self, task: ViewTask) {
        match task {
            ViewTask::Augment => {
                CopyAugmenter::augment(&mut self.doc, self.content_root);
            }
            ViewTask::ScanFlowcharts { force } => {
                self.flow.scan(&mut self.doc, self.content_root, force);
            }
            ViewTask::RestoreFlowcharts => {
                self.flow
                    .restore_placeholders(&mut self.doc, self.content_root);
                self.scheduler
                    .schedule_after(SETTLE_DELAY_MS, ViewTask::ScanFlowcharts { force: true });
            }
            ViewTask::ScanMermaid { force } => {
                let jobs = self
                    .mermaid
                    .collect_jobs(&mut self.doc, self.content_root, force);
                for job in jobs {
                    self.scheduler.schedule(ViewTask::RenderMermaid(job));
                }
            }
            ViewTask::RestoreMermaid => {
                self.mermaid
                    .restore_placeholders(&mut self.doc, self.content_root);
                self.scheduler
                    .schedule_after(SETTLE_DELAY_MS, ViewTask::ScanMermaid { force: true });
            }
            ViewTask::RenderMermaid(job) => {
                self.mermaid.render_job(&mut self.doc, &job);
            }
            ViewTask::RevertCopyLabel { button, label } => {
                revert_copy_label(&mut self.doc, button, &label);
            }
        }
    }

    /// Run everything currently due.
    fn drain_due(&mut self) {
        while let Some(task) = self.scheduler.pop_due() {
            self.run_task(task);
        }
    }

    /// Advance the virtual clock and run what becomes due.
    pub fn advance(&mut self, ms: u64) {
        self.scheduler.advance(ms);
        self.drain_due();
    }

    /// Pump the scheduler until no work remains, jumping the clock over
    /// settle delays and feedback windows.
    pub fn run_until_idle(&mut self) {
        loop {
            self.drain_due();
            if !self.scheduler.advance_to_next() {
                break;
            }
        }
    }

    #[must_use]
    pub fn doc(&self) -> &Document {
        &self.doc
    }

    #[must_use]
    pub fn content_root(&self) -> NodeId {
        self.content_root
    }

    #[must_use]
    pub fn toc(&self) -> &[TocItem] {
        &self.toc
    }

    /// Rendered HTML of the content root, post-enhancement.
    #[must_use]
    pub fn content_html(&self) -> String {
        self.doc.inner_html(self.content_root)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quill_diagrams::{MermaidConfig, MermaidError};
    use quill_store::default_articles;

    use crate::copy::{COPIED_LABEL, COPY_LABEL, ClipboardError};

    use super::*;

    #[derive(Default)]
    struct ScriptedEngine {
        fail: bool,
        renders: usize,
        themes: Vec<&'static str>,
    }

    impl MermaidEngine for ScriptedEngine {
        fn initialize(&mut self, config: &MermaidConfig) {
            self.themes.push(config.theme);
        }

        fn render(&mut self, id: &str, _source: &str) -> Result<String, MermaidError> {
            if self.fail {
                return Err(MermaidError::Render("bad graph".to_owned()));
            }
            self.renders += 1;
            Ok(format!(r#"<svg data-render="{id}"></svg>"#))
        }
    }

    #[derive(Default)]
    struct FakeClipboard {
        reject: bool,
        contents: Option<String>,
    }

    impl Clipboard for FakeClipboard {
        fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
            if self.reject {
                return Err(ClipboardError::Unavailable("denied".to_owned()));
            }
            self.contents = Some(text.to_owned());
            Ok(())
        }

        fn exec_copy(&mut self, text: &str) -> bool {
            self.contents = Some(text.to_owned());
            true
        }
    }

    const ARTICLE: &str = "# Demo\n\n```rust\nfn main() {}\n```\n\n```flowchart\nst=>start: Go\ne=>end: Done\nst->e\n```\n\n```mermaid\ngraph TD\nA-->B\n```\n";

    fn view() -> ArticleView<ScriptedEngine, FakeClipboard> {
        ArticleView::new(ScriptedEngine::default(), FakeClipboard::default())
    }

    #[test]
    fn test_display_runs_full_pipeline() {
        let mut view = view();
        view.display(ARTICLE);
        view.run_until_idle();

        let html = view.content_html();
        assert!(html.contains(r#"<h1 id="demo">Demo</h1>"#));
        assert!(html.contains("copy-code-btn"));
        assert!(html.contains("flowchart-svg-container"));
        assert!(html.contains(r#"<svg data-render="mermaid-"#));
        assert_eq!(view.toc()[0].id, "demo");
    }

    #[test]
    fn test_enhancements_are_idempotent() {
        let mut view = view();
        view.display(ARTICLE);
        view.run_until_idle();
        let first = view.content_html();

        // Re-running every pass changes nothing.
        view.scheduler.schedule(ViewTask::Augment);
        view.scheduler
            .schedule(ViewTask::ScanFlowcharts { force: false });
        view.scheduler
            .schedule(ViewTask::ScanMermaid { force: false });
        view.run_until_idle();
        assert_eq!(view.content_html(), first);
        assert_eq!(view.mermaid.engine().renders, 1);
    }

    #[test]
    fn test_theme_toggle_redraws_diagrams() {
        let mut view = view();
        view.display(ARTICLE);
        view.run_until_idle();
        let light = view.content_html();
        assert!(light.contains("#ffffff"));

        view.set_dark(true);
        view.run_until_idle();
        let dark = view.content_html();
        assert!(dark.contains("#2a2a2a"));
        assert!(!dark.contains(r##"fill="#ffffff""##));
        // Engine reinitialized with the dark theme and rendered again.
        assert_eq!(view.mermaid.engine().themes, vec!["default", "dark"]);
        assert_eq!(view.mermaid.engine().renders, 2);
    }

    #[test]
    fn test_orphaned_mermaid_render_discarded() {
        let mut view = view();
        view.display(ARTICLE);
        // Pull tasks manually so the content swap lands between job
        // collection and job resolution.
        while let Some(task) = view.scheduler.pop_due() {
            if matches!(task, ViewTask::RenderMermaid(_)) {
                view.display("plain text, no diagrams\n");
                view.run_task(task);
                break;
            }
            view.run_task(task);
        }
        view.run_until_idle();

        assert!(!view.content_html().contains("data-render"));
        assert_eq!(view.mermaid.engine().renders, 0);
    }

    #[test]
    fn test_copy_click_feedback_cycle() {
        let mut view = view();
        view.display(ARTICLE);
        view.run_until_idle();

        let button = view.doc.query_class(view.content_root, "copy-code-btn")[0];
        view.click_copy(button);
        assert_eq!(view.clipboard.contents.as_deref(), Some("fn main() {}"));
        assert_eq!(view.doc.text_content(button), COPIED_LABEL);

        view.advance(COPY_FEEDBACK_MS - 1);
        assert_eq!(view.doc.text_content(button), COPIED_LABEL);
        view.advance(1);
        assert_eq!(view.doc.text_content(button), COPY_LABEL);
        assert!(!view.doc.has_class(button, "copied"));
    }

    #[test]
    fn test_display_article_from_store() {
        let mut view = view();
        let article = default_articles().remove(0);
        view.display_article(&article);
        view.run_until_idle();
        assert!(!view.toc().is_empty());
        assert!(view.content_html().contains("<h1"));
    }
}
