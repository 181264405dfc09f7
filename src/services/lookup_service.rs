//! ISBN lookup: catalog first, then the external metadata resolver.

use serde::Serialize;

use crate::domain::{BookMetadata, BookRepository, DomainError, MetadataResolver};
use crate::models::Book;
use crate::utils::isbn;

/// Lookup result, flagged with whether the catalog already holds the book
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSearchResult {
    pub isbn: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub authors: Vec<String>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub categories: Vec<String>,
    pub page_count: Option<i32>,
    pub exists_in_database: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_book_id: Option<String>,
}

impl BookSearchResult {
    fn from_catalog(isbn: String, book: Book) -> Self {
        Self {
            isbn,
            title: book.title,
            subtitle: book.subtitle,
            authors: book.authors,
            publisher: book.publisher,
            published_date: book.published_date,
            description: book.description,
            cover_image_url: book.cover_image_url,
            categories: book.categories,
            page_count: book.page_count,
            exists_in_database: true,
            existing_book_id: Some(book.id),
        }
    }

    fn from_metadata(isbn: String, meta: BookMetadata) -> Self {
        Self {
            isbn,
            title: meta.title,
            subtitle: meta.subtitle,
            authors: meta.authors,
            publisher: meta.publisher,
            published_date: meta.published_date,
            description: meta.description,
            cover_image_url: meta.cover_image_url,
            categories: meta.categories,
            page_count: meta.page_count,
            exists_in_database: false,
            existing_book_id: None,
        }
    }
}

/// Resolve an ISBN. Bad format is a validation error; an unknown ISBN and an
/// unreachable resolver are both `NotFound` to the caller.
pub async fn search_by_isbn(
    books: &dyn BookRepository,
    resolver: &dyn MetadataResolver,
    raw_isbn: &str,
) -> Result<BookSearchResult, DomainError> {
    let normalized = isbn::normalize(raw_isbn);
    if normalized.is_empty() {
        return Err(DomainError::Validation("ISBN is required".to_string()));
    }
    if !isbn::validate(&normalized) {
        return Err(DomainError::Validation("Invalid ISBN format".to_string()));
    }

    if let Some(book) = books.find_by_isbn(&normalized).await? {
        tracing::debug!("ISBN {} found in catalog as {}", normalized, book.id);
        return Ok(BookSearchResult::from_catalog(normalized, book));
    }

    match resolver.lookup(&normalized).await {
        Ok(Some(meta)) => Ok(BookSearchResult::from_metadata(normalized, meta)),
        Ok(None) => Err(DomainError::not_found("Book")),
        Err(DomainError::UpstreamUnavailable(reason)) => {
            tracing::warn!("Lookup for {} degraded to not found: {}", normalized, reason);
            Err(DomainError::not_found("Book"))
        }
        Err(e) => Err(e),
    }
}
