//! Catalog API handlers

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use super::extract::{ApiJson, ApiQuery};
use crate::domain::{CreateBookInput, DomainError};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::CurrentUser;

#[utoipa::path(
    post,
    path = "/api/books",
    responses(
        (status = 201, description = "Book created"),
        (status = 200, description = "A book with this ISBN already existed"),
        (status = 400, description = "Title missing")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiJson(payload): ApiJson<CreateBookInput>,
) -> Result<impl IntoResponse, DomainError> {
    let registered = state.book_repo.create_manual(payload).await?;
    let status = if registered.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(registered.book)))
}

#[derive(Debug, Deserialize)]
pub struct BookQuery {
    pub id: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/books",
    params(("id" = String, Query, description = "Book id")),
    responses(
        (status = 200, description = "Book found"),
        (status = 400, description = "Missing id"),
        (status = 404, description = "No such book")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiQuery(query): ApiQuery<BookQuery>,
) -> Result<impl IntoResponse, DomainError> {
    let id = query
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| DomainError::Validation("Book ID is required".to_string()))?;

    let book = state
        .book_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| DomainError::not_found("Book"))?;
    Ok(Json(book))
}
