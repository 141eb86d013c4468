//! Syntax highlighting via syntect with class-based output.
//!
//! The renderer emits span classes rather than inline styles so the page's
//! light/dark stylesheets control code colors without re-rendering.

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

/// Wraps a loaded syntax set. Construction is the one-time configuration the
/// render contract allows; individual calls are cheap.
pub struct SyntaxHighlighter {
    syntaxes: SyntaxSet,
}

impl SyntaxHighlighter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
        }
    }

    /// Whether the fence language tag maps to a known grammar.
    #[must_use]
    pub fn supports(&self, language: &str) -> bool {
        self.syntaxes.find_syntax_by_token(language).is_some()
    }

    /// Highlight `code`, producing span markup with scope classes.
    ///
    /// Returns `None` when the language is unknown or highlighting fails;
    /// callers fall back to escaped plain text (failures are logged, never
    /// surfaced).
    #[must_use]
    pub fn highlight(&self, language: &str, code: &str) -> Option<String> {
        let syntax = self.syntaxes.find_syntax_by_token(language)?;
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntaxes, ClassStyle::Spaced);
        for line in LinesWithEndings::from(code) {
            if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
                tracing::debug!(language, error = %e, "Highlighting failed, falling back to plain text");
                return None;
            }
        }
        Some(generator.finalize())
    }
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new()
    }
}
