use axum::{
    Json,
    extract::State,
    response::IntoResponse,
};
use serde::Deserialize;

use super::extract::ApiQuery;
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::infrastructure::auth::CurrentUser;
use crate::services::search_by_isbn;

#[derive(Debug, Deserialize)]
pub struct IsbnQuery {
    pub isbn: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/books/search",
    params(("isbn" = String, Query, description = "ISBN-10 or ISBN-13, hyphens allowed")),
    responses(
        (status = 200, description = "Metadata found in the catalog or upstream"),
        (status = 400, description = "Missing or malformed ISBN"),
        (status = 404, description = "Nothing known about this ISBN")
    )
)]
pub async fn search_isbn(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiQuery(query): ApiQuery<IsbnQuery>,
) -> Result<impl IntoResponse, DomainError> {
    let raw = query.isbn.unwrap_or_default();
    let result = search_by_isbn(state.book_repo.as_ref(), state.resolver.as_ref(), &raw).await?;
    Ok(Json(result))
}
