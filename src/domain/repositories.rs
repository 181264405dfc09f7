//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.
//! Every user-scoped method takes the caller's `user_id` explicitly; rows owned
//! by someone else are reported as `NotFound`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::DomainError;
use super::collection::{OwnedRemoval, ReadingStatus};
use crate::models::book::Book;

/// Input for registering a catalog entry
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookInput {
    pub isbn: Option<String>,
    #[serde(default)]
    pub title: String,
    pub subtitle: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub page_count: Option<i32>,
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl CreateBookInput {
    /// Trim strings, drop blanks, normalize the ISBN and require a title.
    pub fn sanitize(self) -> Result<Self, DomainError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(DomainError::Validation("Title is required".to_string()));
        }
        Ok(Self {
            isbn: self
                .isbn
                .map(|i| crate::utils::isbn::normalize(&i))
                .filter(|i| !i.is_empty()),
            title,
            subtitle: clean(self.subtitle),
            authors: self.authors,
            publisher: clean(self.publisher),
            published_date: clean(self.published_date),
            description: clean(self.description),
            cover_image_url: clean(self.cover_image_url),
            categories: self.categories,
            page_count: self.page_count,
        })
    }
}

/// Catalog entry returned together with whether this call created it
#[derive(Debug)]
pub struct RegisteredBook {
    pub book: Book,
    pub created: bool,
}

/// Repository trait for the shared book catalog
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Find a single book by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<Book>, DomainError>;

    /// Find a book by normalized ISBN
    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>, DomainError>;

    /// Return the existing book for `isbn`, or create it from `input`.
    /// Concurrent callers with the same new ISBN all observe one row.
    async fn find_or_create_by_isbn(
        &self,
        isbn: &str,
        input: CreateBookInput,
    ) -> Result<RegisteredBook, DomainError>;

    /// Register a manually entered book. With an ISBN this deduplicates like
    /// `find_or_create_by_isbn`.
    async fn create_manual(&self, input: CreateBookInput) -> Result<RegisteredBook, DomainError>;
}

/// Bookshelf reference embedded in owned-book responses
#[derive(Debug, Clone, Serialize)]
pub struct ShelfRef {
    pub id: String,
    pub name: String,
}

/// Bookshelf with its owned-book count
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookshelf {
    pub id: String,
    pub name: String,
    pub memo: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub owned_book_count: u64,
}

/// Bookshelf with the owned books placed on it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookshelfDetail {
    #[serde(flatten)]
    pub bookshelf: Bookshelf,
    pub owned_books: Vec<OwnedBook>,
}

/// Repository trait for user bookshelves
#[async_trait]
pub trait BookshelfRepository: Send + Sync {
    /// All shelves of the user, most recently created first
    async fn list(&self, user_id: &str) -> Result<Vec<Bookshelf>, DomainError>;

    async fn find(&self, user_id: &str, id: &str) -> Result<Option<BookshelfDetail>, DomainError>;

    async fn create(
        &self,
        user_id: &str,
        name: &str,
        memo: Option<String>,
    ) -> Result<Bookshelf, DomainError>;

    async fn rename(
        &self,
        user_id: &str,
        id: &str,
        name: &str,
        memo: Option<String>,
    ) -> Result<Bookshelf, DomainError>;

    /// Fails with `NonEmptyShelf` while any owned book references the shelf
    async fn delete(&self, user_id: &str, id: &str) -> Result<(), DomainError>;
}

/// Owned (shelved) membership
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedBook {
    pub id: String,
    pub book_id: String,
    pub bookshelf_id: String,
    pub reading_status: ReadingStatus,
    pub note: Option<String>,
    pub marathon_posted: bool,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book: Option<Book>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookshelf: Option<ShelfRef>,
}

/// Unshelved membership
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnshelvedBook {
    pub id: String,
    pub book_id: String,
    pub reading_status: ReadingStatus,
    pub note: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book: Option<Book>,
}

/// Wanted-list row; removal only clears `is_active`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WantedBook {
    pub id: String,
    pub book_id: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book: Option<Book>,
}

/// Initial attributes of a new unshelved or owned membership
#[derive(Debug, Clone, Default)]
pub struct NewEntry {
    pub reading_status: ReadingStatus,
    pub note: Option<String>,
}

impl NewEntry {
    pub fn new(reading_status: Option<ReadingStatus>, note: Option<String>) -> Self {
        Self {
            reading_status: reading_status.unwrap_or_default(),
            note: clean(note),
        }
    }
}

/// Partial update of an owned membership; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateOwnedInput {
    pub bookshelf_id: Option<String>,
    pub reading_status: Option<ReadingStatus>,
    pub note: Option<Option<String>>,
    pub marathon_posted: Option<bool>,
}

impl UpdateOwnedInput {
    pub fn normalized_note(&self) -> Option<Option<String>> {
        self.note.clone().map(clean)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PurchaseOutcome {
    AddedToShelf,
    AddedToUnshelved,
    AlreadyOwned,
    AlreadyUnshelved,
}

impl PurchaseOutcome {
    pub fn already_present(&self) -> bool {
        matches!(
            self,
            PurchaseOutcome::AlreadyOwned | PurchaseOutcome::AlreadyUnshelved
        )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResult {
    pub outcome: PurchaseOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owned_book: Option<OwnedBook>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unshelved_book: Option<UnshelvedBook>,
}

/// Wanted row together with whether it was newly inserted
#[derive(Debug)]
pub struct WantedAdded {
    pub wanted: WantedBook,
    pub created: bool,
}

/// Repository trait for the per-user collection state machine.
///
/// Every mutating method is a single transaction.
#[async_trait]
pub trait CollectionRepository: Send + Sync {
    async fn add_to_unshelved(
        &self,
        user_id: &str,
        book_id: &str,
        entry: NewEntry,
    ) -> Result<UnshelvedBook, DomainError>;

    async fn add_to_owned(
        &self,
        user_id: &str,
        book_id: &str,
        bookshelf_id: &str,
        entry: NewEntry,
    ) -> Result<OwnedBook, DomainError>;

    async fn add_to_wanted(&self, user_id: &str, book_id: &str)
    -> Result<WantedAdded, DomainError>;

    /// Shelve an unshelved entry, carrying over status and note.
    /// `reading_status` overrides the carried status when given.
    async fn move_unshelved_to_owned(
        &self,
        user_id: &str,
        unshelved_id: &str,
        bookshelf_id: &str,
        reading_status: Option<ReadingStatus>,
    ) -> Result<OwnedBook, DomainError>;

    /// Take an owned entry off its shelf, carrying over status and note
    async fn move_owned_to_unshelved(
        &self,
        user_id: &str,
        owned_id: &str,
    ) -> Result<UnshelvedBook, DomainError>;

    async fn purchase_wanted(
        &self,
        user_id: &str,
        wanted_id: &str,
        bookshelf_id: Option<&str>,
    ) -> Result<PurchaseResult, DomainError>;

    async fn remove_from_wanted(&self, user_id: &str, wanted_id: &str) -> Result<(), DomainError>;

    async fn remove_from_unshelved(
        &self,
        user_id: &str,
        unshelved_id: &str,
    ) -> Result<(), DomainError>;

    async fn remove_from_owned(
        &self,
        user_id: &str,
        owned_id: &str,
        mode: OwnedRemoval,
    ) -> Result<(), DomainError>;

    async fn update_owned(
        &self,
        user_id: &str,
        owned_id: &str,
        input: UpdateOwnedInput,
    ) -> Result<OwnedBook, DomainError>;

    /// Owned books, newest first, optionally restricted to one shelf
    async fn list_owned(
        &self,
        user_id: &str,
        bookshelf_id: Option<&str>,
    ) -> Result<Vec<OwnedBook>, DomainError>;

    async fn find_owned(&self, user_id: &str, id: &str) -> Result<Option<OwnedBook>, DomainError>;

    async fn list_unshelved(&self, user_id: &str) -> Result<Vec<UnshelvedBook>, DomainError>;

    async fn find_unshelved(
        &self,
        user_id: &str,
        id: &str,
    ) -> Result<Option<UnshelvedBook>, DomainError>;

    /// Active wanted rows only, newest first
    async fn list_wanted(&self, user_id: &str) -> Result<Vec<WantedBook>, DomainError>;

    /// Any wanted row of the user, active or not
    async fn find_wanted(&self, user_id: &str, id: &str)
    -> Result<Option<WantedBook>, DomainError>;
}
