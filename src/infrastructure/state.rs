//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::{
    BookRepository, BookshelfRepository, CollectionRepository, DomainError, MetadataResolver,
};
use crate::infrastructure::config::Config;
use crate::infrastructure::{
    SeaOrmBookRepository, SeaOrmBookshelfRepository, SeaOrmCollectionRepository,
};
use crate::modules::integrations::google_books::GoogleBooksResolver;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Shared book catalog
    pub book_repo: Arc<dyn BookRepository>,
    /// Per-user bookshelves
    pub bookshelf_repo: Arc<dyn BookshelfRepository>,
    /// Per-user owned/unshelved/wanted memberships
    pub collection_repo: Arc<dyn CollectionRepository>,
    /// External metadata lookup
    pub resolver: Arc<dyn MetadataResolver>,
}

impl AppState {
    /// Create a new AppState with all repositories initialized
    pub fn new(db: DatabaseConnection, resolver: Arc<dyn MetadataResolver>) -> Self {
        let book_repo = Arc::new(SeaOrmBookRepository::new(db.clone()));
        let bookshelf_repo = Arc::new(SeaOrmBookshelfRepository::new(db.clone()));
        let collection_repo = Arc::new(SeaOrmCollectionRepository::new(db));

        Self {
            book_repo,
            bookshelf_repo,
            collection_repo,
            resolver,
        }
    }

    /// State backed by the Google Books resolver described by `config`
    pub fn from_config(db: DatabaseConnection, config: &Config) -> Result<Self, DomainError> {
        let resolver = GoogleBooksResolver::new(
            config.google_books_api_url.clone(),
            config.google_books_api_key.clone(),
            config.lookup_timeout,
        )?;
        Ok(Self::new(db, Arc::new(resolver)))
    }
}
