//! Key-value backed article repository.

use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;

use crate::article::{Article, default_articles};

/// Storage key holding the whole article collection as one JSON array.
pub const STORAGE_KEY: &str = "blog-articles";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("article {0} not found")]
    NotFound(u64),
    #[error("storage i/o failed")]
    Io(#[from] std::io::Error),
    #[error("storage serialization failed")]
    Serialize(#[from] serde_json::Error),
}

/// Minimal string key-value storage, the shape the repository persists
/// through.
pub trait KeyValue {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory backend for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: HashMap<String, String>,
}

impl MemoryKv {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValue for MemoryKv {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Filesystem backend: one file per key under a base directory.
#[derive(Debug)]
pub struct FsKv {
    dir: PathBuf,
}

impl FsKv {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValue for FsKv {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// Persisted article collection.
///
/// All operations read the full collection, mutate, and write it back under
/// [`STORAGE_KEY`]. A missing or corrupt read degrades to the built-in
/// default set (and persists it), never an error.
pub struct ArticleRepository<K> {
    kv: K,
}

impl<K: KeyValue> ArticleRepository<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    fn load(&mut self) -> Vec<Article> {
        if let Some(raw) = self.kv.get(STORAGE_KEY) {
            match serde_json::from_str::<Vec<Article>>(&raw) {
                Ok(articles) if !articles.is_empty() => return articles,
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Stored articles unreadable, using defaults");
                }
            }
        }
        let defaults = default_articles();
        if let Err(e) = self.save(&defaults) {
            tracing::warn!(error = %e, "Failed to persist default articles");
        }
        defaults
    }

    fn save(&mut self, articles: &[Article]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(articles)?;
        self.kv.set(STORAGE_KEY, &raw)
    }

    /// All articles, newest publish date first; unparseable dates last.
    pub fn list(&mut self) -> Vec<Article> {
        let mut articles = self.load();
        articles.sort_by(|a, b| b.publish_date().cmp(&a.publish_date()));
        articles
    }

    pub fn get(&mut self, id: u64) -> Option<Article> {
        self.load().into_iter().find(|a| a.id == id)
    }

    /// Insert a new article. The record's id is replaced with the next free
    /// one (`max + 1`).
    pub fn create(&mut self, mut article: Article) -> Result<Article, StoreError> {
        let mut articles = self.load();
        article.id = articles.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        articles.push(article.clone());
        self.save(&articles)?;
        Ok(article)
    }

    /// Replace the record with matching id wholesale.
    pub fn update(&mut self, id: u64, mut article: Article) -> Result<Article, StoreError> {
        let mut articles = self.load();
        let Some(slot) = articles.iter_mut().find(|a| a.id == id) else {
            return Err(StoreError::NotFound(id));
        };
        article.id = id;
        *slot = article.clone();
        self.save(&articles)?;
        Ok(article)
    }

    /// Remove by id. Returns whether a record was removed.
    pub fn delete(&mut self, id: u64) -> Result<bool, StoreError> {
        let mut articles = self.load();
        let before = articles.len();
        articles.retain(|a| a.id != id);
        if articles.len() == before {
            return Ok(false);
        }
        self.save(&articles)?;
        Ok(true)
    }
}
