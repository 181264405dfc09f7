use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::domain::{BookMetadata, DomainError, MetadataResolver};

pub const DEFAULT_API_URL: &str = "https://www.googleapis.com/books/v1/volumes";

#[derive(Debug, Deserialize)]
struct GoogleBooksResponse {
    items: Option<Vec<GoogleBookItem>>,
}

#[derive(Debug, Deserialize)]
struct GoogleBookItem {
    #[serde(rename = "volumeInfo")]
    volume_info: GoogleVolumeInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleVolumeInfo {
    #[serde(default)]
    title: String,
    subtitle: Option<String>,
    authors: Option<Vec<String>>,
    publisher: Option<String>,
    published_date: Option<String>,
    description: Option<String>,
    image_links: Option<GoogleImageLinks>,
    categories: Option<Vec<String>>,
    page_count: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleImageLinks {
    thumbnail: Option<String>,
    small_thumbnail: Option<String>,
}

impl From<GoogleVolumeInfo> for BookMetadata {
    fn from(info: GoogleVolumeInfo) -> Self {
        // Google Books returns http links often, upgrade to https
        let cover_image_url = info
            .image_links
            .and_then(|links| links.thumbnail.or(links.small_thumbnail))
            .map(|url| url.replacen("http:", "https:", 1));

        Self {
            title: info.title,
            subtitle: info.subtitle,
            authors: info.authors.unwrap_or_default(),
            publisher: info.publisher,
            published_date: info.published_date,
            description: info.description,
            cover_image_url,
            categories: info.categories.unwrap_or_default(),
            page_count: info.page_count,
        }
    }
}

/// Google Books volumes API client
pub struct GoogleBooksResolver {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl GoogleBooksResolver {
    pub fn new(
        api_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Internal(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key,
        })
    }
}

#[async_trait]
impl MetadataResolver for GoogleBooksResolver {
    async fn lookup(&self, isbn: &str) -> Result<Option<BookMetadata>, DomainError> {
        let mut query = vec![("q", format!("isbn:{}", isbn))];
        if let Some(key) = &self.api_key {
            query.push(("key", key.clone()));
        }

        let resp = self
            .client
            .get(&self.api_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Google Books request for {} failed: {}", isbn, e);
                DomainError::UpstreamUnavailable(e.to_string())
            })?;

        if !resp.status().is_success() {
            tracing::warn!("Google Books returned {} for {}", resp.status(), isbn);
            return Err(DomainError::UpstreamUnavailable(format!(
                "Google Books API error: {}",
                resp.status()
            )));
        }

        let parsed: GoogleBooksResponse = resp
            .json()
            .await
            .map_err(|e| DomainError::UpstreamUnavailable(e.to_string()))?;

        let first = parsed.items.and_then(|items| items.into_iter().next());
        Ok(first.map(|item| BookMetadata::from(item.volume_info)))
    }
}
