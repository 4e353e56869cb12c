//! In-memory article collection and the queries the blog pages run on it.

use anyhow::Result;
use std::collections::{HashMap, HashSet};

use crate::article::{total_pages, Article, PaginationParams, PaginationResult};

/// Articles in insertion order plus an id index. Lookups that miss return
/// `None`; no query fails.
#[derive(Debug, Default)]
pub struct ArticleStore {
    articles: Vec<Article>,
    index: HashMap<u64, usize>,
    current: Option<usize>,
}

impl ArticleStore {
    pub fn new(articles: Vec<Article>) -> Result<Self> {
        let mut store = Self::default();
        for article in articles {
            store.insert(article)?;
        }
        log::debug!("Article store initialized with {} articles", store.len());
        Ok(store)
    }

    pub fn insert(&mut self, article: Article) -> Result<()> {
        if self.index.contains_key(&article.id) {
            return Err(anyhow::anyhow!("Duplicate article id: {}", article.id));
        }
        if !article.has_consistent_timestamps() {
            return Err(anyhow::anyhow!(
                "Article {} was updated ({}) before it was created ({})",
                article.id,
                article.updated_at,
                article.created_at
            ));
        }

        self.index.insert(article.id, self.articles.len());
        self.articles.push(article);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn get_by_id(&self, id: u64) -> Option<&Article> {
        self.index.get(&id).map(|&idx| &self.articles[idx])
    }

    /// One page of the collection, newest first. Articles created at the
    /// same instant keep their collection order. Pages past the end are
    /// empty rather than an error.
    pub fn get_by_page(&self, params: &PaginationParams) -> PaginationResult<Article> {
        let sorted = self.sorted_newest_first();
        let total = sorted.len();
        let (start, end) = params.bounds();

        let data = if start >= total {
            Vec::new()
        } else {
            sorted[start..end.min(total)]
                .iter()
                .map(|&article| article.clone())
                .collect()
        };

        PaginationResult {
            data,
            total,
            page: params.page,
            page_size: params.page_size,
            total_pages: total_pages(total, params.page_size),
        }
    }

    /// Selects an article for detail viewing and counts the view. An unknown
    /// id clears the selection and touches no counter.
    pub fn set_current(&mut self, id: u64) -> Option<&Article> {
        match self.index.get(&id).copied() {
            Some(idx) => {
                let article = &mut self.articles[idx];
                article.views = article.views.saturating_add(1);
                log::debug!("Article {} opened, views now {}", id, article.views);
                self.current = Some(idx);
                Some(&self.articles[idx])
            }
            None => {
                log::debug!("Article {} not found, clearing selection", id);
                self.current = None;
                None
            }
        }
    }

    pub fn current(&self) -> Option<&Article> {
        self.current.map(|idx| &self.articles[idx])
    }

    pub fn clear_current(&mut self) {
        self.current = None;
    }

    /// Case-insensitive substring search over title, summary, content and
    /// tags, in collection order. A blank keyword matches everything.
    pub fn search(&self, keyword: &str) -> Vec<&Article> {
        if keyword.trim().is_empty() {
            return self.articles.iter().collect();
        }

        let needle = keyword.to_lowercase();
        self.articles
            .iter()
            .filter(|article| article.matches_lowercase(&needle))
            .collect()
    }

    pub fn get_by_category(&self, category: &str) -> Vec<&Article> {
        self.articles
            .iter()
            .filter(|article| article.category == category)
            .collect()
    }

    pub fn get_by_tag(&self, tag: &str) -> Vec<&Article> {
        self.articles
            .iter()
            .filter(|article| article.has_tag(tag))
            .collect()
    }

    /// Distinct categories in first-seen order.
    pub fn all_categories(&self) -> Vec<&str> {
        distinct(self.articles.iter().map(|article| article.category.as_str()))
    }

    /// Distinct tags in first-seen order.
    pub fn all_tags(&self) -> Vec<&str> {
        distinct(
            self.articles
                .iter()
                .flat_map(|article| article.tags.iter().map(String::as_str)),
        )
    }

    /// The `limit` newest articles. The collection itself stays in
    /// insertion order.
    pub fn latest(&self, limit: usize) -> Vec<&Article> {
        let mut sorted = self.sorted_newest_first();
        sorted.truncate(limit);
        sorted
    }

    pub fn total_views(&self) -> u64 {
        self.articles.iter().map(|article| article.views).sum()
    }

    fn sorted_newest_first(&self) -> Vec<&Article> {
        let mut sorted: Vec<&Article> = self.articles.iter().collect();
        // sort_by is stable, so equal timestamps keep collection order
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sorted
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    values.filter(|value| seen.insert(*value)).collect()
}
