//! Unshelved-book API handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use super::error::success;
use super::extract::ApiJson;
use super::{parse_status, require_field};
use crate::domain::{DomainError, NewEntry};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::CurrentUser;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddUnshelvedRequest {
    pub book_id: Option<String>,
    pub reading_status: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelveRequest {
    pub bookshelf_id: Option<String>,
    pub reading_status: Option<String>,
}

pub async fn list_unshelved(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, DomainError> {
    let books = state.collection_repo.list_unshelved(&user.user_id).await?;
    Ok(Json(books))
}

pub async fn add_unshelved(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<AddUnshelvedRequest>,
) -> Result<impl IntoResponse, DomainError> {
    let book_id = require_field(payload.book_id, "Book ID")?;
    let entry = NewEntry::new(parse_status(payload.reading_status)?, payload.note);

    let unshelved = state
        .collection_repo
        .add_to_unshelved(&user.user_id, &book_id, entry)
        .await?;
    Ok((StatusCode::CREATED, Json(unshelved)))
}

pub async fn get_unshelved(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, DomainError> {
    let unshelved = state
        .collection_repo
        .find_unshelved(&user.user_id, &id)
        .await?
        .ok_or_else(|| DomainError::not_found("Unshelved book"))?;
    Ok(Json(unshelved))
}

pub async fn delete_unshelved(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, DomainError> {
    state
        .collection_repo
        .remove_from_unshelved(&user.user_id, &id)
        .await?;
    Ok(success(json!({})))
}

#[utoipa::path(
    post,
    path = "/api/unshelved-books/{id}/shelve",
    params(("id" = String, Path, description = "Unshelved entry id")),
    responses(
        (status = 200, description = "Book moved onto the shelf"),
        (status = 400, description = "Missing bookshelfId"),
        (status = 404, description = "Entry or shelf not found"),
        (status = 409, description = "Book already owned")
    )
)]
pub async fn shelve(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<ShelveRequest>,
) -> Result<impl IntoResponse, DomainError> {
    let bookshelf_id = require_field(payload.bookshelf_id, "Bookshelf ID")?;
    let reading_status = parse_status(payload.reading_status)?;

    let owned = state
        .collection_repo
        .move_unshelved_to_owned(&user.user_id, &id, &bookshelf_id, reading_status)
        .await?;
    Ok(Json(owned))
}
