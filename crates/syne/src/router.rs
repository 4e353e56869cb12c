//! Maps reader paths to pages.

use std::fmt;

pub const SITE_NAME: &str = "syne's blog";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    /// `/articles?page=N`; the page defaults to 1.
    ArticleList { page: usize },
    Navigation,
    ArticleDetail(u64),
    About,
    NotFound,
}

impl Route {
    /// Parses a path such as `/article/3` or `/articles?page=2`. Trailing
    /// slashes are ignored; anything unrecognized is [`Route::NotFound`].
    pub fn parse(path: &str) -> Self {
        let (path, query) = match path.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path, None),
        };
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["articles"] => Route::ArticleList {
                page: query.and_then(page_param).unwrap_or(1),
            },
            ["navigation"] => Route::Navigation,
            ["article", id] => id
                .parse()
                .map(Route::ArticleDetail)
                .unwrap_or(Route::NotFound),
            ["about"] => Route::About,
            _ => Route::NotFound,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::ArticleList { .. } => "Articles",
            Route::Navigation => "Navigation",
            Route::ArticleDetail(_) => "Article",
            Route::About => "About",
            Route::NotFound => "Not Found",
        }
    }

    /// `<title> - syne's blog`
    pub fn document_title(&self) -> String {
        format!("{} - {}", self.title(), SITE_NAME)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => write!(f, "/"),
            Route::ArticleList { page } if *page > 1 => write!(f, "/articles?page={}", page),
            Route::ArticleList { .. } => write!(f, "/articles"),
            Route::Navigation => write!(f, "/navigation"),
            Route::ArticleDetail(id) => write!(f, "/article/{}", id),
            Route::About => write!(f, "/about"),
            Route::NotFound => write!(f, "/404"),
        }
    }
}

fn page_param(query: &str) -> Option<usize> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "page")
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .map(|page| page.max(1))
}
