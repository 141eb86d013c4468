//! Fence processor seam.
//!
//! Specialized fence languages (the diagram notations) are handled outside
//! the renderer: a processor inspects each fence's language tag and either
//! produces replacement HTML or passes through to highlighting.

/// Outcome of offering a code fence to a processor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FenceResult {
    /// Processor produced the block's HTML; emit it verbatim.
    Html(String),
    /// Not this processor's language; try the next one, then highlighting.
    PassThrough,
}

/// Handles code fences for specific language tags.
///
/// Processors are consulted in registration order; the first returning
/// [`FenceResult::Html`] wins.
pub trait FenceProcessor {
    fn process(&mut self, language: &str, source: &str) -> FenceResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    impl FenceProcessor for Upper {
        fn process(&mut self, language: &str, source: &str) -> FenceResult {
            if language == "upper" {
                FenceResult::Html(source.to_uppercase())
            } else {
                FenceResult::PassThrough
            }
        }
    }

    #[test]
    fn test_processor_dispatch() {
        let mut p = Upper;
        assert_eq!(p.process("upper", "abc"), FenceResult::Html("ABC".into()));
        assert_eq!(p.process("rust", "abc"), FenceResult::PassThrough);
    }
}
