//! Static Markdown content loader.
//!
//! Reads `*.md` files from a content directory and turns each into an
//! [`Article`], filling gaps from the filename and body. Loading is guarded
//! by a once-flag; `reload` re-reads explicitly.

use std::path::{Path, PathBuf};

use crate::article::Article;
use crate::frontmatter::{extract_description, extract_info_from_filename, parse_frontmatter};
use crate::repo::StoreError;

const DEFAULT_CATEGORY: &str = "dit";
const DEFAULT_PLATFORM: &str = "Wechat";
const DEFAULT_COVER: &str = "linear-gradient(135deg, #667eea 0%, #764ba2 100%)";

/// Build an article from one Markdown file. Frontmatter wins over filename
/// hints; missing dates fall back to today.
#[must_use]
pub fn markdown_to_article(filename: &str, content: &str, id: u64) -> Article {
    let (frontmatter, body) = parse_frontmatter(content);
    let file_info = extract_info_from_filename(filename);

    let title = frontmatter
        .title()
        .map(str::to_owned)
        .or(file_info.title)
        .unwrap_or_else(|| filename.strip_suffix(".md").unwrap_or(filename).to_owned());
    let date = frontmatter
        .date()
        .map(str::to_owned)
        .or(file_info.date)
        .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());
    let description = match frontmatter.description() {
        Some(d) => d.to_owned(),
        None => extract_description(content),
    };

    Article {
        id: frontmatter.article_id().unwrap_or(id),
        title,
        description,
        content: body.trim().to_owned(),
        category_key: frontmatter
            .category_key()
            .unwrap_or(DEFAULT_CATEGORY)
            .to_owned(),
        tag: frontmatter.tag().unwrap_or_default().to_owned(),
        badge: frontmatter.badge().map(str::to_owned),
        date,
        platform: frontmatter
            .platform()
            .unwrap_or(DEFAULT_PLATFORM)
            .to_owned(),
        cover: frontmatter.cover().unwrap_or(DEFAULT_COVER).to_owned(),
    }
}

/// Loads articles from a directory of Markdown files.
pub struct ContentLoader {
    dir: PathBuf,
    loaded: bool,
    articles: Vec<Article>,
}

impl ContentLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            loaded: false,
            articles: Vec::new(),
        }
    }

    /// Load once; later calls return the cached set.
    pub fn load(&mut self) -> Result<&[Article], StoreError> {
        if !self.loaded {
            self.articles = read_directory(&self.dir)?;
            self.loaded = true;
        }
        Ok(&self.articles)
    }

    /// Re-read the directory, replacing the cached set.
    pub fn reload(&mut self) -> Result<&[Article], StoreError> {
        self.loaded = false;
        self.load()
    }
}

fn read_directory(dir: &Path) -> Result<Vec<Article>, StoreError> {
    let mut articles = Vec::new();
    let mut next_id: u64 = 1;
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "md"))
        .collect();
    entries.sort();

    for path in entries {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                articles.push(markdown_to_article(&filename, &content, next_id));
                next_id += 1;
            }
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Skipping unreadable content file");
            }
        }
    }

    // Newest first; unparseable dates sort last.
    articles.sort_by(|a, b| b.publish_date().cmp(&a.publish_date()));
    Ok(articles)
}
