//! Remembered diagram source text, keyed by container identity.

use std::collections::HashMap;

use quill_dom::NodeId;

/// Write-once association from a placeholder container to its original
/// source text.
///
/// `NodeId`s are never reused within a document, so stale entries for
/// discarded containers are merely unreachable, never wrong. The first
/// non-empty capture is authoritative; a later empty read (e.g. after the
/// placeholder has been replaced by drawn output) never clobbers it.
#[derive(Debug, Default)]
pub struct SourceCache {
    entries: HashMap<NodeId, String>,
}

impl SourceCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record source text for a container. No-op if the text is empty or the
    /// container already has an entry.
    pub fn record(&mut self, container: NodeId, source: &str) {
        if source.is_empty() {
            return;
        }
        self.entries
            .entry(container)
            .or_insert_with(|| source.to_owned());
    }

    #[must_use]
    pub fn get(&self, container: NodeId) -> Option<&str> {
        self.entries.get(&container).map(String::as_str)
    }
}
