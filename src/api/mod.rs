pub mod books;
pub mod error;
pub mod extract;
pub mod health;
pub mod lookup;
pub mod owned;
pub mod shelves;
pub mod unshelved;
pub mod wanted;

use axum::{
    Router,
    routing::{get, post},
};

use crate::domain::{DomainError, ReadingStatus};
use crate::infrastructure::AppState;

/// All `/api` routes; nest under `/api` when serving.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Catalog
        .route("/books", get(books::get_book).post(books::create_book))
        .route("/books/search", get(lookup::search_isbn))
        // Shelves
        .route(
            "/shelves",
            get(shelves::list_shelves).post(shelves::create_shelf),
        )
        .route(
            "/shelves/:id",
            get(shelves::get_shelf)
                .put(shelves::update_shelf)
                .delete(shelves::delete_shelf),
        )
        // Owned
        .route(
            "/owned-books",
            get(owned::list_owned).post(owned::add_owned),
        )
        .route(
            "/owned-books/:id",
            get(owned::get_owned)
                .put(owned::update_owned)
                .delete(owned::delete_owned),
        )
        // Unshelved
        .route(
            "/unshelved-books",
            get(unshelved::list_unshelved).post(unshelved::add_unshelved),
        )
        .route(
            "/unshelved-books/:id",
            get(unshelved::get_unshelved).delete(unshelved::delete_unshelved),
        )
        .route("/unshelved-books/:id/shelve", post(unshelved::shelve))
        // Wanted
        .route(
            "/wanted-books",
            get(wanted::list_wanted).post(wanted::add_wanted),
        )
        .route(
            "/wanted-books/:id",
            get(wanted::get_wanted).delete(wanted::delete_wanted),
        )
        .route("/wanted-books/:id/purchase", post(wanted::purchase))
        .with_state(state)
}

/// Required id field from a request body
pub(crate) fn require_field(value: Option<String>, label: &str) -> Result<String, DomainError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DomainError::Validation(format!("{} is required", label)))
}

pub(crate) fn parse_status(value: Option<String>) -> Result<Option<ReadingStatus>, DomainError> {
    value.map(|s| s.parse()).transpose()
}
