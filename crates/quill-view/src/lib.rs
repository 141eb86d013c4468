//! Pipeline assembly: article display, copy affordances, diagram
//! reconciliation and theme handling over one live document.

pub mod copy;
pub mod view;

pub use copy::{Clipboard, ClipboardError, CopyAugmenter};
pub use view::{ArticleView, ViewTask};
