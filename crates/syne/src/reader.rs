//! Terminal front end: turns a path or command into printable text.

use std::fmt::Write as _;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use syne_markdown::sanitize::sanitize_html;
use syne_markdown::text::word_count;
use syne_markdown::{extract_plain_text, summary, Renderer};

use crate::api::{ApiClient, ArticleApi};
use crate::article::{Article, PaginationParams, PaginationResult};
use crate::config::Config;
use crate::format::{format_date, format_number, format_reading_time, DateStyle};
use crate::notice::NoticeBoard;
use crate::router::{Route, SITE_NAME};
use crate::store::ArticleStore;
use crate::text_width::{display_width, fit_to_width, pad_to_width, wrap_text};
use crate::theme::{DocumentRoot, ThemeMode, ThemeStore};

const TITLE_COLUMN: usize = 40;
const TEXT_WIDTH: usize = 80;

pub const USAGE: &str = "\
Usage: syne [--articles FILE] <path|command>

Paths:
  /                       latest articles
  /articles?page=N        article list
  /navigation             categories and tags
  /article/<id>           read an article
  /about                  about this blog

Commands:
  search <keyword>        search title, summary, content and tags
  category <name>         articles in a category
  tag <name>              articles with a tag
  categories | tags       list categories or tags
  html <id>               rendered, sanitized HTML of an article
  css                     stylesheet for highlighted code
  theme [color|dark|light|toggle]
  remote <path>           fetch a path from the blog API";

/// Everything one invocation works with.
pub struct Reader {
    pub store: ArticleStore,
    pub theme: ThemeStore,
    pub root: DocumentRoot,
    pub notices: NoticeBoard,
    renderer: Renderer,
    config: Config,
    client: Option<ApiClient>,
}

impl Reader {
    pub fn new(
        store: ArticleStore,
        mut theme: ThemeStore,
        config: Config,
        client: Option<ApiClient>,
    ) -> Self {
        let mut root = DocumentRoot::new();
        theme.init(&mut root);
        Self {
            store,
            theme,
            root,
            notices: NoticeBoard::new(),
            renderer: Renderer::new(&config.render.highlight_theme),
            config,
            client,
        }
    }

    pub async fn execute(&mut self, input: &str, now: DateTime<Utc>) -> Result<String> {
        let cmd = input.trim();
        if cmd.is_empty() {
            return Ok(USAGE.to_string());
        }

        if cmd.starts_with('/') {
            return Ok(self.page(Route::parse(cmd), now));
        }

        let (name, arg) = match cmd.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (cmd, ""),
        };

        match name {
            "search" => {
                let found = self.store.search(arg);
                Ok(self.listing(&format!("Search: {}", arg), &found, now))
            }
            "category" => {
                let found = self.store.get_by_category(require(arg, "category")?);
                Ok(self.listing(&format!("Category: {}", arg), &found, now))
            }
            "tag" => {
                let found = self.store.get_by_tag(require(arg, "tag")?);
                Ok(self.listing(&format!("Tag: {}", arg), &found, now))
            }
            "categories" => Ok(self.counts(&self.store.all_categories(), |a, c| a.category == c)),
            "tags" => Ok(self.counts(&self.store.all_tags(), |a, t| a.has_tag(t))),
            "html" => {
                let id: u64 = require(arg, "article id")?
                    .parse()
                    .map_err(|_| anyhow!("Invalid article id '{}'", arg))?;
                match self.store.get_by_id(id) {
                    Some(article) => Ok(self.render_html(&article.content)),
                    None => Err(anyhow!("Article {} not found", id)),
                }
            }
            "css" => self.renderer.highlighter().css(),
            "theme" => self.theme_command(arg),
            "remote" => self.remote(require(arg, "path")?, now).await,
            "help" | "--help" | "-h" => Ok(USAGE.to_string()),
            _ => Err(anyhow!("Unknown command '{}'\n\n{}", name, USAGE)),
        }
    }

    /// Renders one page of the local store.
    pub fn page(&mut self, route: Route, now: DateTime<Utc>) -> String {
        log::debug!("Rendering {} ({})", route, route.document_title());
        let mut out = format!("{}\n\n", route.document_title());

        match route {
            Route::Home => {
                let latest = self.store.latest(self.config.blog.latest_count);
                out.push_str(&self.listing("Latest articles", &latest, now));
                let _ = write!(
                    out,
                    "\n{} articles · {} categories · {} views",
                    self.store.len(),
                    self.store.all_categories().len(),
                    format_number(self.store.total_views())
                );
            }
            Route::ArticleList { page } => {
                let params = PaginationParams::new(page, self.config.blog.page_size);
                let result = self.store.get_by_page(&params);
                out.push_str(&self.page_listing(&result, now));
            }
            Route::Navigation => {
                out.push_str("Categories\n");
                out.push_str(&self.counts(&self.store.all_categories(), |a, c| a.category == c));
                out.push_str("\n\nTags\n");
                out.push_str(&self.counts(&self.store.all_tags(), |a, t| a.has_tag(t)));
            }
            Route::ArticleDetail(id) => match self.store.set_current(id) {
                Some(article) => {
                    let article = article.clone();
                    out.push_str(&self.detail(&article, now));
                }
                None => {
                    self.notices.warning(format!("Article {} does not exist", id));
                    out.push_str("Article not found");
                }
            },
            Route::About => {
                let _ = write!(
                    out,
                    "{} is a personal blog about front-end engineering.\n{} articles, {} total views.",
                    SITE_NAME,
                    self.store.len(),
                    format_number(self.store.total_views())
                );
            }
            Route::NotFound => out.push_str("Page not found"),
        }

        out
    }

    fn render_html(&self, src: &str) -> String {
        let html = self.renderer.render(src);
        if self.config.render.sanitize {
            sanitize_html(&html)
        } else {
            html
        }
    }

    fn detail(&self, article: &Article, now: DateTime<Utc>) -> String {
        let mut out = String::new();
        let text = extract_plain_text(&article.content);
        let words_per_minute = self.config.blog.words_per_minute;

        let _ = writeln!(out, "{}", article.title);
        let _ = writeln!(out, "{}", "=".repeat(display_width(&article.title)));
        let _ = writeln!(
            out,
            "{} · {} · {} · {} views · {}",
            article.author,
            format_date(article.created_at, DateStyle::Relative, now),
            article.category,
            format_number(article.views),
            format_reading_time(word_count(&text), words_per_minute)
        );
        if !article.tags.is_empty() {
            let _ = writeln!(out, "Tags: {}", article.tags.join(", "));
        }
        // Articles without a written summary get one cut from the body
        let lead = if article.summary.trim().is_empty() {
            summary(&article.content, self.config.blog.summary_length)
        } else {
            article.summary.clone()
        };
        let _ = writeln!(out, "> {}", lead);
        if article.updated_at > article.created_at {
            let _ = writeln!(
                out,
                "Updated {}",
                format_date(article.updated_at, DateStyle::Date, now)
            );
        }
        out.push('\n');

        for paragraph in text.split('\n') {
            for line in wrap_text(paragraph, TEXT_WIDTH) {
                out.push_str(&line);
                out.push('\n');
            }
        }

        out.trim_end().to_string()
    }

    fn listing(&self, heading: &str, articles: &[&Article], now: DateTime<Utc>) -> String {
        let mut out = format!("{} ({})\n", heading, articles.len());
        out.push_str(&article_table(articles, now));
        out
    }

    fn page_listing(&self, result: &PaginationResult<Article>, now: DateTime<Utc>) -> String {
        let rows: Vec<&Article> = result.data.iter().collect();
        let mut out = article_table(&rows, now);
        let _ = write!(
            out,
            "\nPage {}/{} · {} articles",
            result.page,
            result.total_pages.max(1),
            result.total
        );
        if result.has_prev() {
            let _ = write!(out, " · prev: /articles?page={}", result.page - 1);
        }
        if result.has_next() {
            let _ = write!(out, " · next: /articles?page={}", result.page + 1);
        }
        out
    }

    fn counts<F>(&self, names: &[&str], matches: F) -> String
    where
        F: Fn(&Article, &str) -> bool,
    {
        let width = names.iter().map(|n| display_width(n)).max().unwrap_or(0);
        names
            .iter()
            .map(|name| {
                let count = self
                    .store
                    .articles()
                    .iter()
                    .filter(|a| matches(a, name))
                    .count();
                format!("  {}  {}", pad_to_width(name, width), count)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn theme_command(&mut self, arg: &str) -> Result<String> {
        match arg {
            "" => {}
            "toggle" => {
                self.theme.toggle_mode(&mut self.root)?;
            }
            "dark" | "light" => {
                let mode: ThemeMode = arg.parse()?;
                self.theme.set_mode(mode, &mut self.root)?;
            }
            color => {
                self.theme.set_color(color, &mut self.root)?;
                self.notices.success(format!("Theme color set to {}", color));
            }
        }
        Ok(format!(
            "color: {}\nmode:  {}\n{}",
            self.theme.color(),
            self.theme.mode().as_str(),
            self.root.opening_tag()
        ))
    }

    /// Fetches a path from the API. Request failures become notices and an
    /// empty result.
    async fn remote(&mut self, path: &str, now: DateTime<Utc>) -> Result<String> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| anyhow!("No API client configured"))?;
        let api = ArticleApi::new(client);

        let result = match Route::parse(path) {
            Route::Home => api.recommended(None).await.map(|articles| {
                let rows: Vec<&Article> = articles.iter().collect();
                self.listing("Recommended", &rows, now)
            }),
            Route::ArticleList { page } => api
                .list(&PaginationParams::new(page, self.config.blog.page_size), None)
                .await
                .map(|response| self.page_listing(&PaginationResult::from(response), now)),
            Route::ArticleDetail(id) => match api.get_by_id(id).await {
                Ok(mut article) => {
                    match api.increase_views(id).await {
                        Ok(views) => article.views = views.views,
                        Err(e) => log::warn!("Could not count view for article {}: {}", id, e),
                    }
                    Ok(self.detail(&article, now))
                }
                Err(e) => Err(e),
            },
            other => return Err(anyhow!("'{}' is not available remotely", other)),
        };

        match result {
            Ok(text) => Ok(text),
            Err(e) => {
                self.notices.api_error(&e);
                Ok(String::new())
            }
        }
    }
}

fn require<'a>(arg: &'a str, what: &str) -> Result<&'a str> {
    if arg.is_empty() {
        Err(anyhow!("Missing {}", what))
    } else {
        Ok(arg)
    }
}

/// `id  date  category  title  views`, aligned by display width.
fn article_table(articles: &[&Article], now: DateTime<Utc>) -> String {
    if articles.is_empty() {
        return "  (no articles)".to_string();
    }

    let dates: Vec<String> = articles
        .iter()
        .map(|a| format_date(a.created_at, DateStyle::Date, now))
        .collect();
    let id_width = articles
        .iter()
        .map(|a| a.id.to_string().len())
        .max()
        .unwrap_or(1);
    let category_width = articles
        .iter()
        .map(|a| display_width(&a.category))
        .max()
        .unwrap_or(0);

    articles
        .iter()
        .zip(&dates)
        .map(|(article, date)| {
            format!(
                "  {:>id_width$}  {}  {}  {}  {}",
                article.id,
                date,
                pad_to_width(&article.category, category_width),
                pad_to_width(&fit_to_width(&article.title, TITLE_COLUMN), TITLE_COLUMN),
                format_number(article.views),
                id_width = id_width
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::bundled_store;
    use crate::storage::{KeyValueStore, MemoryStorage, THEME_COLOR_KEY};
    use std::sync::Arc;

    fn now() -> DateTime<Utc> {
        "2024-03-20T12:00:00Z".parse().unwrap()
    }

    fn reader_with(storage: Arc<dyn KeyValueStore>) -> Reader {
        Reader::new(
            bundled_store().unwrap(),
            ThemeStore::new(storage),
            Config::default(),
            None,
        )
    }

    fn reader() -> Reader {
        reader_with(Arc::new(MemoryStorage::new()))
    }

    #[tokio::test]
    async fn test_empty_input_prints_usage() {
        let out = reader().execute("  ", now()).await.unwrap();
        assert!(out.starts_with("Usage: syne"));
    }

    #[tokio::test]
    async fn test_home_lists_latest_first() {
        let mut reader = reader();
        let out = reader.execute("/", now()).await.unwrap();
        assert!(out.starts_with("Home - syne's blog"));

        let first_row = out.lines().nth(3).unwrap();
        assert!(first_row.trim_start().starts_with('6'), "{}", first_row);
    }

    #[tokio::test]
    async fn test_detail_increments_views() {
        let mut reader = reader();
        let before = reader.store.get_by_id(2).unwrap().views;

        let out = reader.execute("/article/2", now()).await.unwrap();
        assert!(out.starts_with("Article - syne's blog"));
        assert_eq!(reader.store.get_by_id(2).unwrap().views, before + 1);
        assert_eq!(reader.store.current().map(|a| a.id), Some(2));
    }

    #[test]
    fn test_detail_falls_back_to_generated_summary() {
        let mut reader = reader();
        reader.config.blog.summary_length = 12;
        let mut article = reader.store.get_by_id(3).unwrap().clone();
        article.summary.clear();

        let out = reader.detail(&article, now());
        let lead = out.lines().find(|l| l.starts_with("> ")).unwrap();
        assert_eq!(lead, "> Tailwind CSS...");
    }

    #[tokio::test]
    async fn test_missing_article_is_a_notice() {
        let mut reader = reader();
        let total = reader.store.total_views();

        let out = reader.execute("/article/99", now()).await.unwrap();
        assert!(out.ends_with("Article not found"));
        assert_eq!(reader.store.total_views(), total);
        assert!(reader.store.current().is_none());
        assert_eq!(reader.notices.len(), 1);
    }

    #[tokio::test]
    async fn test_article_list_paging() {
        let mut reader = reader();
        reader.config.blog.page_size = 4;

        let out = reader.execute("/articles?page=2", now()).await.unwrap();
        assert!(out.contains("Page 2/2 · 6 articles"));
        assert!(out.contains("prev: /articles?page=1"));
        assert!(!out.contains("next:"));
    }

    #[tokio::test]
    async fn test_tag_and_search_commands() {
        let mut reader = reader();
        let out = reader.execute("tag Vue3", now()).await.unwrap();
        assert!(out.starts_with("Tag: Vue3 (3)"));

        let out = reader.execute("search VUE3", now()).await.unwrap();
        assert!(out.starts_with("Search: VUE3 (3)"));

        assert!(reader.execute("tag", now()).await.is_err());
    }

    #[tokio::test]
    async fn test_theme_command_persists() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStorage::new());
        let mut reader = reader_with(storage.clone());

        let out = reader.execute("theme purple", now()).await.unwrap();
        assert!(out.contains("data-theme=\"purple\""));
        assert_eq!(storage.get(THEME_COLOR_KEY).as_deref(), Some("purple"));

        let out = reader.execute("theme dark", now()).await.unwrap();
        assert!(out.contains("class=\"dark\""));

        assert!(reader.execute("theme magenta", now()).await.is_err());

        let reloaded = reader_with(storage);
        assert_eq!(reloaded.root.attribute("data-theme"), Some("purple"));
    }

    #[tokio::test]
    async fn test_html_command_is_sanitized() {
        let created = now() - chrono::Duration::days(1);
        let hostile = Article {
            id: 1,
            title: "Embedded markup".to_string(),
            summary: "Raw HTML inside Markdown".to_string(),
            content: "# Embedded markup\n\n<script>alert(1)</script>\n\n\
                      Inline <img src=x onerror=alert(2)> image and \
                      [a link](javascript:alert(3))."
                .to_string(),
            author: "Syne".to_string(),
            category: "Security".to_string(),
            tags: vec!["HTML".to_string()],
            cover_image: None,
            created_at: created,
            updated_at: created,
            views: 0,
        };
        let mut reader = Reader::new(
            ArticleStore::new(vec![hostile]).unwrap(),
            ThemeStore::new(Arc::new(MemoryStorage::new())),
            Config::default(),
            None,
        );

        let out = reader.execute("html 1", now()).await.unwrap();
        assert!(out.contains("<h1>"));
        assert!(out.contains("&lt;script&gt;"));
        assert!(!out.contains("<script"));
        assert!(!out.contains("<img"));
        assert!(!out.contains("javascript:"));
        assert!(reader.execute("html x", now()).await.is_err());
    }

    #[tokio::test]
    async fn test_remote_without_client_fails() {
        let mut reader = reader();
        assert!(reader.execute("remote /articles", now()).await.is_err());
    }

    #[tokio::test]
    async fn test_remote_failure_becomes_notice() {
        let (base_url, server) =
            crate::api::testing::serve_once(404, r#"{"code":404,"message":"gone"}"#).await;
        let config = crate::config::ApiConfig {
            base_url,
            timeout_secs: 15,
        };
        let client = ApiClient::new(&config, Arc::new(MemoryStorage::new())).unwrap();
        let mut reader = Reader::new(
            bundled_store().unwrap(),
            ThemeStore::new(Arc::new(MemoryStorage::new())),
            Config::default(),
            Some(client),
        );

        let out = reader.execute("remote /article/5", now()).await.unwrap();
        assert!(out.is_empty());
        assert_eq!(
            reader.notices.latest().unwrap().content,
            "The requested resource does not exist"
        );
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_remote_detail_survives_failed_view_count() {
        // only the article request is answered; the view count call fails
        let (base_url, server) = crate::api::testing::serve_once(
            200,
            r#"{"code":200,"data":{"id":9,"title":"Remote article","summary":"s",
                "content":"Body","author":"Syne","category":"Vue","tags":[],
                "createdAt":"2024-03-01T08:00:00Z","updatedAt":"2024-03-01T08:00:00Z",
                "views":1234}}"#,
        )
        .await;
        let config = crate::config::ApiConfig {
            base_url,
            timeout_secs: 5,
        };
        let client = ApiClient::new(&config, Arc::new(MemoryStorage::new())).unwrap();
        let mut reader = Reader::new(
            bundled_store().unwrap(),
            ThemeStore::new(Arc::new(MemoryStorage::new())),
            Config::default(),
            Some(client),
        );

        let out = reader.execute("remote /article/9", now()).await.unwrap();
        assert!(out.contains("Remote article"));
        assert!(out.contains("1.2k views"));
        server.await.unwrap();
    }

    #[test]
    fn test_table_aligns_wide_categories() {
        let store = bundled_store().unwrap();
        let mut articles: Vec<Article> = store.articles().to_vec();
        articles[0].category = "前端".to_string();
        let rows: Vec<&Article> = articles.iter().take(2).collect();

        let table = article_table(&rows, now());
        let widths: Vec<usize> = table.lines().map(display_width).collect();
        assert_eq!(
            widths[0] - format_number(rows[0].views).len(),
            widths[1] - format_number(rows[1].views).len()
        );
    }
}
