//! External book metadata lookup contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::DomainError;

/// Metadata returned by a resolver for one ISBN
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookMetadata {
    pub title: String,
    pub subtitle: Option<String>,
    pub authors: Vec<String>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub categories: Vec<String>,
    pub page_count: Option<i32>,
}

/// Best-effort metadata source keyed by normalized ISBN.
///
/// `Ok(None)` means the source answered and knows nothing about the ISBN.
/// Transport failures and timeouts are `DomainError::UpstreamUnavailable`.
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    async fn lookup(&self, isbn: &str) -> Result<Option<BookMetadata>, DomainError>;
}
