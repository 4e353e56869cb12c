use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::envelope::Envelope;
use super::error::ApiError;
use crate::config::ApiConfig;
use crate::storage::{KeyValueStore, TOKEN_KEY};

/// Query pairs appended to a request URL.
pub type Query<'a> = [(&'a str, String)];

/// Shared HTTP client. Attaches the stored bearer token to every request and
/// unwraps response envelopes.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    storage: Arc<dyn KeyValueStore>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, storage: Arc<dyn KeyValueStore>) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim())
            .with_context(|| format!("Invalid API base URL: {}", config.base_url))?;
        if base_url.cannot_be_a_base() {
            bail!("API base URL cannot carry paths: {}", base_url);
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json;charset=UTF-8"),
        );

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        log::debug!(
            "API client ready: {} (timeout {}s)",
            base_url,
            config.timeout_secs
        );

        Ok(Self {
            http,
            base_url,
            storage,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &Query<'_>) -> Result<T, ApiError> {
        self.send(Method::GET, &split_path(path), query, None).await
    }

    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: Option<&Value>) -> Result<T, ApiError> {
        self.send(Method::POST, &split_path(path), &[], body).await
    }

    pub async fn put<T: DeserializeOwned>(&self, path: &str, body: Option<&Value>) -> Result<T, ApiError> {
        self.send(Method::PUT, &split_path(path), &[], body).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str, query: &Query<'_>) -> Result<T, ApiError> {
        self.send(Method::DELETE, &split_path(path), query, None).await
    }

    pub async fn patch<T: DeserializeOwned>(&self, path: &str, body: Option<&Value>) -> Result<T, ApiError> {
        self.send(Method::PATCH, &split_path(path), &[], body).await
    }

    /// Issues one request. Each entry of `segments` becomes exactly one
    /// percent-encoded path segment below the base URL.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        query: &Query<'_>,
        body: Option<&Value>,
    ) -> Result<T, ApiError> {
        let url = self.url(segments)?;

        let mut request = self.http.request(method.clone(), url.clone());
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        let request = self.authorize(request);

        log::debug!("--> {} {}", method, url);
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let err = ApiError::from(e);
                log::error!("{} {} failed: {}", method, url, err);
                return Err(err);
            }
        };

        let status = response.status().as_u16();
        // An unreadable error body still carries its status, so a 401 must
        // clear the token either way.
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) if !(200..300).contains(&status) => {
                log::warn!("Body of {} response from {} unreadable: {}", status, url, e);
                String::new()
            }
            Err(e) => return Err(ApiError::from(e)),
        };
        log::debug!("<-- {} {} {} ({} bytes)", status, method, url, text.len());

        self.handle_response(status, &text)
    }

    /// Adds `Authorization: Bearer <token>` when a token is stored.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.storage.get(TOKEN_KEY) {
            Some(token) if !token.is_empty() => request.bearer_auth(token),
            _ => request,
        }
    }

    fn handle_response<T: DeserializeOwned>(&self, status: u16, body: &str) -> Result<T, ApiError> {
        if (200..300).contains(&status) {
            let result = Envelope::parse(body).and_then(Envelope::into_result);
            if let Err(err) = &result {
                log::warn!("{}", err);
            }
            return result;
        }

        let err = ApiError::from_status(status, body);
        if err.is_unauthorized() {
            if let Err(e) = self.storage.remove(TOKEN_KEY) {
                log::warn!("Failed to clear stored token: {}", e);
            }
            log::warn!("Session rejected by server, stored token cleared");
        }
        log::error!("{}", err);
        Err(err)
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Request(format!("Invalid base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}
