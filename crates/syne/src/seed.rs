//! Bundled articles and loading of external article lists.

use anyhow::{Context, Result};
use std::path::Path;

use crate::article::Article;
use crate::store::ArticleStore;

const BUNDLED_ARTICLES: &str = include_str!("../data/articles.json");

pub fn bundled_articles() -> Result<Vec<Article>> {
    serde_json::from_str(BUNDLED_ARTICLES).context("Bundled article data is malformed")
}

/// Store over the bundled articles.
pub fn bundled_store() -> Result<ArticleStore> {
    ArticleStore::new(bundled_articles()?)
}

/// Store over a JSON array of articles read from `path`.
pub async fn load_file(path: &Path) -> Result<ArticleStore> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read articles from {}", path.display()))?;
    let articles: Vec<Article> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse articles in {}", path.display()))?;

    log::info!("Loaded {} articles from {}", articles.len(), path.display());
    ArticleStore::new(articles)
}
