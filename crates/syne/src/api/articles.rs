use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::client::ApiClient;
use super::error::ApiError;
use crate::article::{Article, PaginationParams, PaginationResult};

pub const DEFAULT_LIST_LIMIT: usize = 5;

/// One page of a server-side listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub list: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

impl<T> From<PageResponse<T>> for PaginationResult<T> {
    fn from(page: PageResponse<T>) -> Self {
        PaginationResult {
            data: page.list,
            total: page.total,
            page: page.page,
            page_size: page.page_size,
            total_pages: page.total_pages,
        }
    }
}

/// Fields for create and update; unset fields are left out of the body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LikeResponse {
    pub likes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct FavoriteResponse {
    pub favorited: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ViewsResponse {
    pub views: u64,
}

/// Article endpoints below `/articles`.
pub struct ArticleApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ArticleApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        params: &PaginationParams,
        keyword: Option<&str>,
    ) -> Result<PageResponse<Article>, ApiError> {
        let mut query = page_query(params);
        if let Some(keyword) = keyword.filter(|k| !k.trim().is_empty()) {
            query.push(("keyword", keyword.to_string()));
        }
        self.client
            .send(Method::GET, &["articles"], &query, None)
            .await
    }

    pub async fn get_by_id(&self, id: u64) -> Result<Article, ApiError> {
        let id = id.to_string();
        self.client
            .send(Method::GET, &["articles", id.as_str()], &[], None)
            .await
    }

    pub async fn recommended(&self, limit: Option<usize>) -> Result<Vec<Article>, ApiError> {
        self.limited("recommended", limit).await
    }

    pub async fn hot(&self, limit: Option<usize>) -> Result<Vec<Article>, ApiError> {
        self.limited("hot", limit).await
    }

    pub async fn by_category(
        &self,
        category: &str,
        params: &PaginationParams,
    ) -> Result<PageResponse<Article>, ApiError> {
        self.client
            .send(
                Method::GET,
                &["articles", "category", category],
                &page_query(params),
                None,
            )
            .await
    }

    pub async fn by_tag(
        &self,
        tag: &str,
        params: &PaginationParams,
    ) -> Result<PageResponse<Article>, ApiError> {
        self.client
            .send(Method::GET, &["articles", "tag", tag], &page_query(params), None)
            .await
    }

    pub async fn search(
        &self,
        keyword: &str,
        params: &PaginationParams,
    ) -> Result<PageResponse<Article>, ApiError> {
        let mut query = page_query(params);
        query.push(("keyword", keyword.to_string()));
        self.client
            .send(Method::GET, &["articles", "search"], &query, None)
            .await
    }

    pub async fn create(&self, draft: &ArticleDraft) -> Result<Article, ApiError> {
        let body = to_body(draft)?;
        self.client
            .send(Method::POST, &["articles"], &[], Some(&body))
            .await
    }

    pub async fn update(&self, id: u64, draft: &ArticleDraft) -> Result<Article, ApiError> {
        let id = id.to_string();
        let body = to_body(draft)?;
        self.client
            .send(Method::PUT, &["articles", id.as_str()], &[], Some(&body))
            .await
    }

    pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
        let id = id.to_string();
        let _: Value = self
            .client
            .send(Method::DELETE, &["articles", id.as_str()], &[], None)
            .await?;
        Ok(())
    }

    pub async fn like(&self, id: u64) -> Result<LikeResponse, ApiError> {
        self.action(id, "like").await
    }

    pub async fn favorite(&self, id: u64) -> Result<FavoriteResponse, ApiError> {
        self.action(id, "favorite").await
    }

    pub async fn increase_views(&self, id: u64) -> Result<ViewsResponse, ApiError> {
        self.action(id, "views").await
    }

    async fn limited(&self, which: &str, limit: Option<usize>) -> Result<Vec<Article>, ApiError> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).to_string();
        self.client
            .send(Method::GET, &["articles", which], &[("limit", limit)], None)
            .await
    }

    async fn action<T: serde::de::DeserializeOwned>(&self, id: u64, action: &str) -> Result<T, ApiError> {
        let id = id.to_string();
        self.client
            .send(Method::POST, &["articles", id.as_str(), action], &[], None)
            .await
    }
}

fn page_query(params: &PaginationParams) -> Vec<(&'static str, String)> {
    vec![
        ("page", params.page.to_string()),
        ("pageSize", params.page_size.to_string()),
    ]
}

fn to_body(draft: &ArticleDraft) -> Result<Value, ApiError> {
    serde_json::to_value(draft).map_err(|e| ApiError::Request(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::serve_once;
    use crate::config::ApiConfig;
    use crate::storage::MemoryStorage;
    use serde_json::json;
    use std::sync::Arc;

    fn client_for(base_url: String) -> ApiClient {
        let config = ApiConfig {
            base_url,
            timeout_secs: 15,
        };
        ApiClient::new(&config, Arc::new(MemoryStorage::new())).unwrap()
    }

    fn article_json(id: u64) -> Value {
        json!({
            "id": id,
            "title": "Getting Started with Vue 3",
            "summary": "Composition API basics",
            "content": "# Vue 3",
            "author": "Syne",
            "category": "Vue",
            "tags": ["Vue3"],
            "createdAt": "2024-01-15T10:00:00Z",
            "updatedAt": "2024-01-15T10:00:00Z",
            "views": 1250
        })
    }

    #[test]
    fn test_page_response_converts_to_pagination_result() {
        let page: PageResponse<u8> = serde_json::from_value(json!({
            "list": [1, 2],
            "total": 12,
            "page": 2,
            "pageSize": 2,
            "totalPages": 6
        }))
        .unwrap();
        let result: PaginationResult<u8> = page.into();
        assert_eq!(result.data, vec![1, 2]);
        assert_eq!(result.total_pages, 6);
        assert!(result.has_next());
        assert!(result.has_prev());
    }

    #[test]
    fn test_draft_omits_unset_fields() {
        let draft = ArticleDraft {
            title: Some("New".to_string()),
            cover_image: Some("/img/a.png".to_string()),
            ..ArticleDraft::default()
        };
        assert_eq!(
            to_body(&draft).unwrap(),
            json!({"title": "New", "coverImage": "/img/a.png"})
        );
    }

    #[tokio::test]
    async fn test_list_sends_paging_and_keyword() {
        let body = json!({
            "code": 200,
            "data": {"list": [article_json(1)], "total": 1, "page": 1, "pageSize": 10, "totalPages": 1},
            "message": "ok"
        });
        let (base_url, server) = serve_once(200, &body.to_string()).await;
        let client = client_for(base_url);

        let page = ArticleApi::new(&client)
            .list(&PaginationParams::default(), Some("vue"))
            .await
            .unwrap();
        assert_eq!(page.list.len(), 1);
        assert_eq!(page.list[0].views, 1250);

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/articles?page=1&pageSize=10&keyword=vue HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_by_tag_encodes_segment() {
        let body = json!({
            "code": 0,
            "data": {"list": [], "total": 0, "page": 1, "pageSize": 5, "totalPages": 0}
        });
        let (base_url, server) = serve_once(200, &body.to_string()).await;
        let client = client_for(base_url);

        let page = ArticleApi::new(&client)
            .by_tag("C# / .NET", &PaginationParams::new(1, 5))
            .await
            .unwrap();
        assert!(page.list.is_empty());

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/articles/tag/C%23%20%2F%20.NET?page=1&pageSize=5 "));
    }

    #[tokio::test]
    async fn test_hot_defaults_limit() {
        let body = json!({"code": 200, "data": [article_json(6), article_json(2)]});
        let (base_url, server) = serve_once(200, &body.to_string()).await;
        let client = client_for(base_url);

        let hot = ArticleApi::new(&client).hot(None).await.unwrap();
        assert_eq!(hot.iter().map(|a| a.id).collect::<Vec<_>>(), vec![6, 2]);

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/articles/hot?limit=5 "));
    }

    #[tokio::test]
    async fn test_increase_views() {
        let (base_url, server) = serve_once(200, r#"{"code":200,"data":{"views":1251}}"#).await;
        let client = client_for(base_url);

        let views = ArticleApi::new(&client).increase_views(1).await.unwrap();
        assert_eq!(views, ViewsResponse { views: 1251 });

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/articles/1/views "));
    }

    #[tokio::test]
    async fn test_delete_discards_data() {
        let (base_url, server) = serve_once(200, r#"{"code":200,"data":null,"message":"deleted"}"#).await;
        let client = client_for(base_url);

        ArticleApi::new(&client).delete(3).await.unwrap();
        assert!(server.await.unwrap().starts_with("DELETE /api/articles/3 "));
    }
}
