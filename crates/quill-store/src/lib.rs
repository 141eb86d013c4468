//! Article content and persistence.
//!
//! Articles live as one JSON array under a single key in a pluggable
//! key-value store; static Markdown files with frontmatter feed the same
//! model through [`ContentLoader`]. Rendering is read-only: nothing in the
//! pipeline writes back here.

pub mod article;
pub mod export;
pub mod frontmatter;
pub mod loader;
pub mod repo;

pub use article::{Article, default_articles};
pub use export::{article_to_markdown, generate_filename};
pub use frontmatter::{
    Frontmatter, extract_description, extract_info_from_filename, parse_frontmatter,
};
pub use loader::{ContentLoader, markdown_to_article};
pub use repo::{ArticleRepository, FsKv, KeyValue, MemoryKv, STORAGE_KEY, StoreError};
