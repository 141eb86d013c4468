//! Mutable element-tree model and cooperative scheduler.
//!
//! The rendering pipeline produces HTML strings, but the diagram reconcilers
//! and the code-copy augmenter operate against a *live* tree: they query by
//! class, replace container contents, and re-run idempotently. [`Document`]
//! models that tree with stable [`NodeId`]s so reconciler-side caches can be
//! keyed by node identity.
//!
//! [`Scheduler`] models the platform's timing primitives ("after the current
//! rendering pass" and "after a fixed delay") as a single-threaded task queue
//! with a virtual clock, so scan/render interleavings are deterministic under
//! test.

mod document;
mod parse;
mod scheduler;

pub use document::{Document, NodeData, NodeId};
pub use scheduler::Scheduler;
