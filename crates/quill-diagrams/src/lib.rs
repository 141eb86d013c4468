//! Deferred diagram rendering.
//!
//! The markdown renderer never draws diagrams; the [`DiagramProcessor`]
//! replaces diagram fences with inert placeholder markup, and the two
//! reconcilers later scan the live document, parse each placeholder's source
//! and swap in vector output. Both reconcilers are idempotent and support a
//! forced re-render path (restore placeholder, settle, re-scan) for theme
//! changes.

pub mod cache;
pub mod flowchart;
pub mod kind;
pub mod mermaid;
pub mod processor;
pub mod theme;

pub use cache::SourceCache;
pub use flowchart::{FlowchartError, FlowchartReconciler, SETTLE_DELAY_MS};
pub use kind::DiagramKind;
pub use mermaid::{MermaidEngine, MermaidError, MermaidJob, MermaidReconciler};
pub use processor::DiagramProcessor;
pub use theme::{FlowchartOptions, MermaidConfig, MermaidThemeVariables, ThemeMode};
