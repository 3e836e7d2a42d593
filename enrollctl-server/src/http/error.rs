//! API error type with IntoResponse
//!
//! Every failure leaves the server as `(status, {"message": ...})`. Handlers
//! return `Result<_, ApiError>` and convert domain, repository and extractor
//! errors with `?`.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use enrollctl_core::{EnrollError, ValidationError};
use serde_json::json;

use crate::db::repos::DbError;

/// API error with an HTTP status and a client-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// Any failure without a more specific class.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Fallback for errors nothing else classifies.
    pub fn unexpected(err: &(dyn std::error::Error + 'static)) -> Self {
        Self::internal(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = self.status.as_u16(), "Request failed: {}", self.message);
        } else {
            tracing::debug!(status = self.status.as_u16(), "Request rejected: {}", self.message);
        }

        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

impl From<EnrollError> for ApiError {
    fn from(e: EnrollError) -> Self {
        let status = StatusCode::from_u16(e.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, e.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::bad_request(e.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { .. } => Self::not_found(e.to_string()),
            DbError::Conflict { message } => Self::conflict(message),
            DbError::Sqlx(err) => Self::unexpected(&err),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use enrollctl_core::StoreError;
    use serde_json::Value;

    async fn body_of(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn body_carries_message_only() {
        let (status, body) = body_of(ApiError::conflict("Student ID already exists")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body, json!({ "message": "Student ID already exists" }));
    }

    #[tokio::test]
    async fn enroll_errors_keep_class_and_message() {
        let (status, body) = body_of(EnrollError::CoursesNotFound { missing: vec![99] }.into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Some course IDs Are Not Found");

        let (status, body) =
            body_of(EnrollError::CapacityReached { course_ids: vec![1] }.into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "Some courses have reached max capacity");
    }

    #[tokio::test]
    async fn commit_failure_exposes_backend_text() {
        let err = EnrollError::Commit(StoreError::message("could not serialize access"));
        let (status, body) = body_of(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "could not serialize access");
    }

    #[tokio::test]
    async fn validation_error_is_400() {
        let err: ApiError = ValidationError::Empty { field: "name" }.into();
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "name cannot be empty");
    }

    #[test]
    fn db_errors_map_to_statuses() {
        let err: ApiError = DbError::NotFound {
            resource: "Course",
            id: "4".into(),
        }
        .into();
        assert_eq!(err, ApiError::not_found("Course Not Found"));

        let err: ApiError = DbError::Conflict {
            message: "Course name already exists",
        }
        .into();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let err: ApiError = DbError::Sqlx(sqlx::Error::PoolTimedOut).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.is_empty());
    }
}
