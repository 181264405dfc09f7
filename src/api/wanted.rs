//! Wanted-book API handlers

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use super::error::success;
use super::extract::{ApiJson, optional_json_body};
use super::require_field;
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::infrastructure::auth::CurrentUser;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddWantedRequest {
    pub book_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub bookshelf_id: Option<String>,
}

pub async fn list_wanted(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, DomainError> {
    let books = state.collection_repo.list_wanted(&user.user_id).await?;
    Ok(Json(books))
}

pub async fn add_wanted(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<AddWantedRequest>,
) -> Result<impl IntoResponse, DomainError> {
    let book_id = require_field(payload.book_id, "Book ID")?;

    let added = state
        .collection_repo
        .add_to_wanted(&user.user_id, &book_id)
        .await?;
    let status = if added.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(added.wanted)))
}

pub async fn get_wanted(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, DomainError> {
    let wanted = state
        .collection_repo
        .find_wanted(&user.user_id, &id)
        .await?
        .ok_or_else(|| DomainError::not_found("Wanted book"))?;
    Ok(Json(wanted))
}

pub async fn delete_wanted(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, DomainError> {
    state
        .collection_repo
        .remove_from_wanted(&user.user_id, &id)
        .await?;
    Ok(success(json!({})))
}

#[utoipa::path(
    post,
    path = "/api/wanted-books/{id}/purchase",
    params(("id" = String, Path, description = "Wanted entry id")),
    responses(
        (status = 200, description = "Purchase recorded, or book was already present"),
        (status = 400, description = "Body is not valid JSON"),
        (status = 404, description = "Wanted entry inactive or missing, or shelf not found")
    )
)]
pub async fn purchase(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, DomainError> {
    let payload: PurchaseRequest = optional_json_body(&body)?;
    // A blank shelf id means "no shelf yet"
    let bookshelf_id = payload.bookshelf_id.filter(|id| !id.trim().is_empty());

    let result = state
        .collection_repo
        .purchase_wanted(&user.user_id, &id, bookshelf_id.as_deref())
        .await?;
    let body = serde_json::to_value(&result).map_err(|e| DomainError::Internal(e.to_string()))?;
    Ok(success(body))
}
