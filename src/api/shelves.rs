//! Bookshelf API handlers

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
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::infrastructure::auth::CurrentUser;

/// Request body for creating or renaming a shelf
#[derive(Debug, Deserialize)]
pub struct ShelfRequest {
    #[serde(default)]
    pub name: String,
    pub memo: Option<String>,
}

pub async fn list_shelves(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, DomainError> {
    let shelves = state.bookshelf_repo.list(&user.user_id).await?;
    Ok(Json(shelves))
}

pub async fn create_shelf(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<ShelfRequest>,
) -> Result<impl IntoResponse, DomainError> {
    let shelf = state
        .bookshelf_repo
        .create(&user.user_id, &payload.name, payload.memo)
        .await?;
    Ok((StatusCode::CREATED, Json(shelf)))
}

pub async fn get_shelf(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, DomainError> {
    let detail = state
        .bookshelf_repo
        .find(&user.user_id, &id)
        .await?
        .ok_or_else(|| DomainError::not_found("Bookshelf"))?;
    Ok(Json(detail))
}

pub async fn update_shelf(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<ShelfRequest>,
) -> Result<impl IntoResponse, DomainError> {
    let shelf = state
        .bookshelf_repo
        .rename(&user.user_id, &id, &payload.name, payload.memo)
        .await?;
    Ok(Json(shelf))
}

#[utoipa::path(
    delete,
    path = "/api/shelves/{id}",
    params(("id" = String, Path, description = "Bookshelf id")),
    responses(
        (status = 200, description = "Shelf deleted"),
        (status = 400, description = "Shelf still holds owned books"),
        (status = 404, description = "No such shelf for this user")
    )
)]
pub async fn delete_shelf(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, DomainError> {
    state.bookshelf_repo.delete(&user.user_id, &id).await?;
    Ok(success(json!({})))
}
