use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::services::{
    document_store::DocumentStoreError, identity_service::IdentityError, media_service::MediaError,
};

/// A classified request error. `code` is the stable machine-readable
/// classification surfaced to callers; `status` is the HTTP mapping.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, code: &'static str, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: msg.into(),
        }
    }

    /// No caller identity attached to the request.
    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthenticated", msg)
    }

    /// Authenticated but lacking the required privilege.
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "permission-denied", msg)
    }

    /// Payload shape or type mismatch.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid-argument", msg)
    }

    /// A uniqueness check failed.
    pub fn already_exists(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "already-exists", msg)
    }

    /// A referenced record is absent.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not-found", msg)
    }

    /// Anything unclassified: collaborator failures, malformed embedded data.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "code": self.code,
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::internal(format!("serialization failure: {err}"))
    }
}

impl From<DocumentStoreError> for AppError {
    fn from(err: DocumentStoreError) -> Self {
        AppError::internal(err.to_string())
    }
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::InvalidObjectKey => {
                AppError::invalid_argument("destination path is not a valid object key")
            }
            MediaError::ObjectNotFound(path) => {
                AppError::not_found(format!("media object `{path}` not found"))
            }
            // Malformed embedded data bypasses explicit validation and stays
            // unclassified in the surfaced taxonomy.
            other => AppError::internal(other.to_string()),
        }
    }
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        AppError::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_maps_to_status() {
        assert_eq!(
            AppError::unauthenticated("x").status,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::permission_denied("x").status,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::invalid_argument("x").status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::already_exists("x").status, StatusCode::CONFLICT);
        assert_eq!(AppError::not_found("x").status, StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::internal("x").status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn response_carries_status() {
        let response = AppError::already_exists("this author already exists").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
