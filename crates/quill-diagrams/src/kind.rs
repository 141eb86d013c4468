//! Diagram kind table: maps fence language tags to placeholder markup
//! classes.

/// The two diagram families the pipeline defers to placeholders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagramKind {
    /// flowchart.js-style box-and-arrow notation, drawn in-crate.
    Flowchart,
    /// Mermaid graph family, drawn by an injected engine.
    Mermaid,
}

/// Graph-notation tags routed to the mermaid placeholder. Closed set; new
/// sub-notations are added here, never inferred.
const MERMAID_TAGS: &[&str] = &[
    "mermaid",
    "sequenceDiagram",
    "classDiagram",
    "stateDiagram",
    "erDiagram",
    "journey",
    "timeline",
    "gantt",
    "pie",
    "requirement",
    "gitgraph",
    "mindmap",
];

impl DiagramKind {
    /// Classify a fence language tag. `None` means the fence is ordinary code.
    #[must_use]
    pub fn parse(language: &str) -> Option<Self> {
        match language {
            "flowchart" | "flow" => Some(Self::Flowchart),
            tag if MERMAID_TAGS.contains(&tag) => Some(Self::Mermaid),
            _ => None,
        }
    }

    /// Class on the wrapping container element.
    #[must_use]
    pub fn container_class(self) -> &'static str {
        match self {
            Self::Flowchart => "flowchart-container",
            Self::Mermaid => "mermaid-container",
        }
    }

    /// Class on the inert placeholder element holding the source text.
    #[must_use]
    pub fn element_class(self) -> &'static str {
        match self {
            Self::Flowchart => "flowchart",
            Self::Mermaid => "mermaid",
        }
    }

    /// Marker class set once a placeholder has been picked up for drawing.
    #[must_use]
    pub fn rendered_class(self) -> &'static str {
        match self {
            Self::Flowchart => "flowchart-rendered",
            Self::Mermaid => "mermaid-rendered",
        }
    }

    /// Class on the escaped-text fallback block emitted on draw failure.
    #[must_use]
    pub fn error_class(self) -> &'static str {
        match self {
            Self::Flowchart => "flowchart-error",
            Self::Mermaid => "mermaid-error",
        }
    }

    /// Prefix of generated placeholder ids (`<kind>-<random>`).
    #[must_use]
    pub fn id_prefix(self) -> &'static str {
        match self {
            Self::Flowchart => "flowchart",
            Self::Mermaid => "mermaid",
        }
    }
}
