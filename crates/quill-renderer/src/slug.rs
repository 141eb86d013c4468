//! Heading anchor id allocation.

use std::collections::HashMap;

/// Derive the base slug from heading display text.
///
/// Lowercases, trims, strips everything that is not an ASCII word character,
/// whitespace or hyphen, then collapses each whitespace run to a single
/// hyphen. The word class is ASCII on purpose: headings written entirely in
/// non-Latin scripts strip to the empty base slug, which still participates
/// in duplicate numbering (see [`SlugCounter`]).
#[must_use]
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    // Strip first, then collapse: stripping does not terminate a whitespace
    // run, so "a & b" collapses to "a-b", not "a--b".
    let stripped: String = lowered
        .trim()
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '_' || *ch == '-' || ch.is_whitespace())
        .collect();
    let mut out = String::with_capacity(stripped.len());
    let mut pending_run = false;
    for ch in stripped.chars() {
        if ch.is_whitespace() {
            pending_run = true;
        } else {
            if pending_run {
                out.push('-');
                pending_run = false;
            }
            out.push(ch);
        }
    }
    // A run at the end of the stripped text still becomes a hyphen (it was
    // internal before stripping; edge whitespace is gone after the trim).
    if pending_run {
        out.push('-');
    }
    out
}

/// Per-render duplicate counter keyed by base slug.
///
/// The first occurrence of a base slug gets the slug unchanged; the Nth
/// duplicate gets `{base}-{N-1}`. Headings that slugify to the empty string
/// share the `""` base and produce ids `""`, `"-1"`, `"-2"`; defined
/// behavior that downstream TOC consumers rely on.
#[derive(Debug, Default)]
pub struct SlugCounter {
    counts: HashMap<String, usize>,
}

impl SlugCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a unique id for `base` within this render pass.
    pub fn assign(&mut self, base: &str) -> String {
        let count = self.counts.entry(base.to_owned()).or_insert(0);
        let id = if *count == 0 {
            base.to_owned()
        } else {
            format!("{base}-{count}")
        };
        *count += 1;
        id
    }

    /// Reset all counters for a new render pass.
    pub fn reset(&mut self) {
        self.counts.clear();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Section Title"), "section-title");
        assert_eq!(slugify("  Trimmed  "), "trimmed");
    }

    #[test]
    fn test_slugify_strips_punctuation() {
        assert_eq!(slugify("What's new?"), "whats-new");
        assert_eq!(slugify("a & b"), "a-b");
        assert_eq!(slugify("pre-existing_slug"), "pre-existing_slug");
    }

    #[test]
    fn test_slugify_collapses_whitespace_runs() {
        assert_eq!(slugify("foo   bar"), "foo-bar");
        assert_eq!(slugify("foo - bar"), "foo---bar");
    }

    #[test]
    fn test_slugify_non_ascii_strips_to_empty() {
        assert_eq!(slugify("背景"), "");
        assert_eq!(slugify("背景 介绍"), "-");
    }

    #[test]
    fn test_counter_duplicate_numbering() {
        let mut counter = SlugCounter::new();
        assert_eq!(counter.assign("faq"), "faq");
        assert_eq!(counter.assign("faq"), "faq-1");
        assert_eq!(counter.assign("faq"), "faq-2");
        assert_eq!(counter.assign("other"), "other");
    }

    #[test]
    fn test_counter_empty_base() {
        let mut counter = SlugCounter::new();
        assert_eq!(counter.assign(""), "");
        assert_eq!(counter.assign(""), "-1");
        assert_eq!(counter.assign(""), "-2");
    }

    #[test]
    fn test_counter_reset() {
        let mut counter = SlugCounter::new();
        counter.assign("faq");
        counter.reset();
        assert_eq!(counter.assign("faq"), "faq");
    }
}
