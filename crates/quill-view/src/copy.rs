//! Copy-to-clipboard affordances for highlighted code blocks.

use quill_dom::{Document, NodeId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
}

/// Host clipboard access. `write_text` is the modern async API; `exec_copy`
/// is the legacy select-and-copy command used as a fallback.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
    fn exec_copy(&mut self, text: &str) -> bool;
}

pub const COPY_LABEL: &str = "Copy";
pub const COPIED_LABEL: &str = "Copied!";
/// How long the success label stays before reverting.
pub const COPY_FEEDBACK_MS: u64 = 2000;

const BUTTON_CLASS: &str = "copy-code-btn";
const COPIED_CLASS: &str = "copied";

/// Adds a copy button to each highlighted code block, exactly once per
/// block. Idempotent: the button's class doubles as the marker.
#[derive(Debug, Default)]
pub struct CopyAugmenter;

impl CopyAugmenter {
    /// Scan `pre.hljs` blocks under `root` and append a copy button to each
    /// block lacking one. Returns the number of buttons added.
    pub fn augment(doc: &mut Document, root: NodeId) -> usize {
        let mut added = 0;
        for pre in doc.query_class(root, "hljs") {
            if doc.tag(pre) != Some("pre") {
                continue;
            }
            if !doc.query_class(pre, BUTTON_CLASS).is_empty() {
                continue;
            }
            if find_code_child(doc, pre).is_none() {
                continue;
            }
            let button = doc.create_element("button");
            doc.set_attr(button, "class", BUTTON_CLASS);
            doc.set_attr(button, "type", "button");
            doc.set_attr(button, "aria-label", "Copy code");
            let label = doc.create_text(COPY_LABEL);
            doc.append_child(button, label);
            doc.append_child(pre, button);
            added += 1;
        }
        added
    }
}

/// Copy the code block owning `button` to the clipboard. Returns the
/// button's previous label on success so the caller can schedule the revert;
/// `None` means the copy failed at both levels or the button is orphaned.
pub fn copy_code<C: Clipboard>(
    doc: &mut Document,
    clipboard: &mut C,
    button: NodeId,
) -> Option<String> {
    let pre = doc.parent(button)?;
    let code = find_code_child(doc, pre)?;
    let text = doc.text_content(code);

    let copied = match clipboard.write_text(&text) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Clipboard write failed, using legacy copy");
            fallback_copy(doc, clipboard, &text)
        }
    };
    if !copied {
        return None;
    }

    let original = doc.text_content(button);
    set_button_label(doc, button, COPIED_LABEL);
    doc.add_class(button, COPIED_CLASS);
    Some(original)
}

/// Restore a button after the feedback window. No-op when the button has
/// been detached in the meantime.
pub fn revert_copy_label(doc: &mut Document, button: NodeId, label: &str) {
    if !doc.is_attached(button) {
        return;
    }
    set_button_label(doc, button, label);
    doc.remove_class(button, COPIED_CLASS);
}

/// Legacy path: a temporary invisible text field holds the text while the
/// copy command runs. The field is removed whatever the command returns.
fn fallback_copy<C: Clipboard>(doc: &mut Document, clipboard: &mut C, text: &str) -> bool {
    let field = doc.create_element("textarea");
    doc.set_attr(field, "style", "position: fixed; opacity: 0");
    let content = doc.create_text(text);
    doc.append_child(field, content);
    let root = doc.root();
    doc.append_child(root, field);

    let copied = clipboard.exec_copy(text);
    doc.detach(field);
    if !copied {
        tracing::warn!("Legacy copy command failed");
    }
    copied
}

fn find_code_child(doc: &Document, pre: NodeId) -> Option<NodeId> {
    doc.children(pre)
        .iter()
        .copied()
        .find(|&c| doc.tag(c) == Some("code"))
}

fn set_button_label(doc: &mut Document, button: NodeId, label: &str) {
    doc.remove_children(button);
    let text = doc.create_text(label);
    doc.append_child(button, text);
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quill_dom::Document;

    use super::*;

    #[derive(Default)]
    struct FakeClipboard {
        reject_write: bool,
        reject_exec: bool,
        contents: Option<String>,
        exec_calls: usize,
    }

    impl Clipboard for FakeClipboard {
        fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
            if self.reject_write {
                return Err(ClipboardError::Unavailable("denied".to_owned()));
            }
            self.contents = Some(text.to_owned());
            Ok(())
        }

        fn exec_copy(&mut self, text: &str) -> bool {
            self.exec_calls += 1;
            if self.reject_exec {
                return false;
            }
            self.contents = Some(text.to_owned());
            true
        }
    }

    fn setup() -> (Document, NodeId) {
        let mut doc = Document::new();
        let content = doc.create_element("div");
        doc.append_child(doc.root(), content);
        doc.set_inner_html(
            content,
            r#"<pre class="hljs"><code class="language-rust"><span>fn</span> main() {}</code></pre>"#,
        );
        (doc, content)
    }

    fn button(doc: &Document, root: NodeId) -> NodeId {
        doc.query_class(root, "copy-code-btn")[0]
    }

    #[test]
    fn test_augment_adds_button_once() {
        let (mut doc, root) = setup();
        assert_eq!(CopyAugmenter::augment(&mut doc, root), 1);
        assert_eq!(CopyAugmenter::augment(&mut doc, root), 0);
        assert_eq!(doc.query_class(root, "copy-code-btn").len(), 1);

        let b = button(&doc, root);
        assert_eq!(doc.tag(b), Some("button"));
        assert_eq!(doc.attr(b, "type"), Some("button"));
        assert_eq!(doc.text_content(b), COPY_LABEL);
    }

    #[test]
    fn test_augment_skips_pre_without_code() {
        let mut doc = Document::new();
        let content = doc.create_element("div");
        doc.append_child(doc.root(), content);
        doc.set_inner_html(content, r#"<pre class="hljs">bare text</pre>"#);
        assert_eq!(CopyAugmenter::augment(&mut doc, content), 0);
    }

    #[test]
    fn test_copy_strips_markup() {
        let (mut doc, root) = setup();
        CopyAugmenter::augment(&mut doc, root);
        let b = button(&doc, root);
        let mut clipboard = FakeClipboard::default();

        let original = copy_code(&mut doc, &mut clipboard, b);
        assert_eq!(original.as_deref(), Some(COPY_LABEL));
        assert_eq!(clipboard.contents.as_deref(), Some("fn main() {}"));
        assert_eq!(doc.text_content(b), COPIED_LABEL);
        assert!(doc.has_class(b, "copied"));
    }

    #[test]
    fn test_fallback_used_when_clipboard_rejects() {
        let (mut doc, root) = setup();
        CopyAugmenter::augment(&mut doc, root);
        let b = button(&doc, root);
        let mut clipboard = FakeClipboard {
            reject_write: true,
            ..FakeClipboard::default()
        };

        let original = copy_code(&mut doc, &mut clipboard, b);
        assert!(original.is_some());
        assert_eq!(clipboard.exec_calls, 1);
        assert_eq!(clipboard.contents.as_deref(), Some("fn main() {}"));
        // The temporary field never lingers.
        assert!(doc.query_class(doc.root(), "copy-code-btn").len() == 1);
        assert!(doc.outer_html(doc.root()).matches("<textarea").count() == 0);
    }

    #[test]
    fn test_double_failure_leaves_label_alone() {
        let (mut doc, root) = setup();
        CopyAugmenter::augment(&mut doc, root);
        let b = button(&doc, root);
        let mut clipboard = FakeClipboard {
            reject_write: true,
            reject_exec: true,
            ..FakeClipboard::default()
        };

        assert!(copy_code(&mut doc, &mut clipboard, b).is_none());
        assert_eq!(doc.text_content(b), COPY_LABEL);
        assert!(!doc.has_class(b, "copied"));
        // Field removed even though the command failed.
        assert_eq!(doc.outer_html(doc.root()).matches("<textarea").count(), 0);
    }

    #[test]
    fn test_revert_restores_label() {
        let (mut doc, root) = setup();
        CopyAugmenter::augment(&mut doc, root);
        let b = button(&doc, root);
        let mut clipboard = FakeClipboard::default();
        let original = copy_code(&mut doc, &mut clipboard, b).unwrap();

        revert_copy_label(&mut doc, b, &original);
        assert_eq!(doc.text_content(b), COPY_LABEL);
        assert!(!doc.has_class(b, "copied"));
    }

    #[test]
    fn test_revert_ignores_detached_button() {
        let (mut doc, root) = setup();
        CopyAugmenter::augment(&mut doc, root);
        let b = button(&doc, root);
        doc.set_inner_html(root, "<p>gone</p>");
        // Must not panic or resurrect the button.
        revert_copy_label(&mut doc, b, COPY_LABEL);
        assert!(!doc.is_attached(b));
    }
}
