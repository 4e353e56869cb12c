//! Backend access: a reqwest client that speaks the `{code, data, message}`
//! envelope, and the article endpoints built on it.

pub mod articles;
pub mod client;
pub mod envelope;
pub mod error;

#[cfg(test)]
pub(crate) mod testing;

pub use articles::{ArticleApi, ArticleDraft, PageResponse};
pub use client::ApiClient;
pub use envelope::Envelope;
pub use error::ApiError;
