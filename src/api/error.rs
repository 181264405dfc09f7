//! HTTP mapping for domain errors

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::domain::DomainError;

impl DomainError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DomainError::Validation(_) | DomainError::NonEmptyShelf => StatusCode::BAD_REQUEST,
            DomainError::Unauthenticated => StatusCode::UNAUTHORIZED,
            DomainError::NotFound(_) | DomainError::UpstreamUnavailable(_) => StatusCode::NOT_FOUND,
            DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::Database(_) | DomainError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn public_message(&self) -> String {
        match self {
            DomainError::Validation(msg) | DomainError::Conflict(msg) => msg.clone(),
            DomainError::UpstreamUnavailable(_) => "Book not found".to_string(),
            DomainError::Database(_) | DomainError::Internal(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        (
            status,
            Json(json!({
                "error": self.public_message(),
                "kind": self.kind(),
            })),
        )
            .into_response()
    }
}

/// `{"success": true}` plus optional extra fields, for mutations with no entity to return
pub(crate) fn success(extra: serde_json::Value) -> Json<serde_json::Value> {
    let mut body = json!({ "success": true });
    if let (Some(target), serde_json::Value::Object(fields)) = (body.as_object_mut(), extra) {
        target.extend(fields);
    }
    Json(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            DomainError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(DomainError::NonEmptyShelf.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(DomainError::Unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(DomainError::not_found("Book").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            DomainError::UpstreamUnavailable("timeout".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(DomainError::Conflict("dup".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            DomainError::Database("locked".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = DomainError::Database("UNIQUE constraint failed: secret_table".into());
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_success_merges_fields() {
        let Json(body) = success(json!({ "action": "removed" }));
        assert_eq!(body["success"], true);
        assert_eq!(body["action"], "removed");
    }
}
