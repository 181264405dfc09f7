//! Request extractors whose rejections use the `DomainError` envelope

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};

use crate::domain::DomainError;

/// `axum::Json` that rejects with a 400 `validation_error`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(DomainError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Query` that rejects with a 400 `validation_error`
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(DomainError))]
pub struct ApiQuery<T>(pub T);

impl From<JsonRejection> for DomainError {
    fn from(rejection: JsonRejection) -> Self {
        DomainError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for DomainError {
    fn from(rejection: QueryRejection) -> Self {
        DomainError::Validation(rejection.body_text())
    }
}

/// Body that may be empty; with content it must be JSON of `T`.
///
/// Parsed regardless of `Content-Type`, so a shelf id sent without the header
/// is still honored.
pub fn optional_json_body<T>(body: &[u8]) -> Result<T, DomainError>
where
    T: Default + serde::de::DeserializeOwned,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| DomainError::Validation(format!("Invalid JSON body: {}", e)))
}
