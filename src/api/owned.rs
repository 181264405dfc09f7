//! Owned-book API handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Deserializer};
use serde_json::json;

use super::error::success;
use super::extract::{ApiJson, ApiQuery};
use super::{parse_status, require_field};
use crate::domain::{DomainError, NewEntry, OwnedRemoval, UpdateOwnedInput};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::CurrentUser;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedQuery {
    pub bookshelf_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOwnedRequest {
    pub book_id: Option<String>,
    pub bookshelf_id: Option<String>,
    pub reading_status: Option<String>,
    pub note: Option<String>,
}

/// Partial update; an explicit `"note": null` clears the note
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOwnedRequest {
    pub bookshelf_id: Option<String>,
    pub reading_status: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub note: Option<Option<String>>,
    pub marathon_posted: Option<bool>,
}

// Distinguishes a field sent as null from one left out
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

pub async fn list_owned(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<OwnedQuery>,
) -> Result<impl IntoResponse, DomainError> {
    let shelf = query.bookshelf_id.filter(|id| !id.is_empty());
    let books = state
        .collection_repo
        .list_owned(&user.user_id, shelf.as_deref())
        .await?;
    Ok(Json(books))
}

#[utoipa::path(
    post,
    path = "/api/owned-books",
    responses(
        (status = 201, description = "Book placed on the shelf"),
        (status = 400, description = "Missing bookId or bookshelfId"),
        (status = 404, description = "Book or shelf not found"),
        (status = 409, description = "Book already owned or unshelved")
    )
)]
pub async fn add_owned(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<AddOwnedRequest>,
) -> Result<impl IntoResponse, DomainError> {
    let book_id = require_field(payload.book_id, "Book ID")?;
    let bookshelf_id = require_field(payload.bookshelf_id, "Bookshelf ID")?;
    let entry = NewEntry::new(parse_status(payload.reading_status)?, payload.note);

    let owned = state
        .collection_repo
        .add_to_owned(&user.user_id, &book_id, &bookshelf_id, entry)
        .await?;
    Ok((StatusCode::CREATED, Json(owned)))
}

pub async fn get_owned(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, DomainError> {
    let owned = state
        .collection_repo
        .find_owned(&user.user_id, &id)
        .await?
        .ok_or_else(|| DomainError::not_found("Owned book"))?;
    Ok(Json(owned))
}

pub async fn update_owned(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateOwnedRequest>,
) -> Result<impl IntoResponse, DomainError> {
    let input = UpdateOwnedInput {
        bookshelf_id: payload.bookshelf_id.filter(|id| !id.is_empty()),
        reading_status: parse_status(payload.reading_status)?,
        note: payload.note,
        marathon_posted: payload.marathon_posted,
    };

    let owned = state
        .collection_repo
        .update_owned(&user.user_id, &id, input)
        .await?;
    Ok(Json(owned))
}

#[utoipa::path(
    delete,
    path = "/api/owned-books/{id}",
    params(
        ("id" = String, Path, description = "Owned entry id"),
        ("type" = Option<String>, Query, description = "remove (default), unshelve or delete_all")
    ),
    responses(
        (status = 200, description = "Removal applied"),
        (status = 400, description = "Unknown removal type"),
        (status = 404, description = "No such owned entry for this user")
    )
)]
pub async fn delete_owned(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    ApiQuery(query): ApiQuery<DeleteQuery>,
) -> Result<impl IntoResponse, DomainError> {
    let mode: OwnedRemoval = query.kind.as_deref().unwrap_or("remove").parse()?;

    state
        .collection_repo
        .remove_from_owned(&user.user_id, &id, mode)
        .await?;
    Ok(success(json!({ "action": mode.action() })))
}
