//! API error handling.
//!
//! Every failure leaves the API as `{"error": "<message>"}` with a matching
//! status code. Internal failures are logged here and answered with the
//! generic message of the route that hit them.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::app::storage::StoreError;
use crate::app::validation::ValidationError;

pub const TASK_NOT_FOUND: &str = "Task not found";

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Status code plus error body, returned by handlers on failure.
#[derive(Debug, Clone)]
pub struct ApiErrorResponse {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiErrorResponse {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: message.into(),
            },
        }
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    #[must_use]
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, TASK_NOT_FOUND)
    }

    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Maps a store failure for a route whose generic failure text is `context`.
    ///
    /// `NotFound` becomes a 404; anything else is logged and becomes a 500
    /// that carries only `context`.
    #[must_use]
    pub fn from_store(error: StoreError, context: &str) -> Self {
        match error {
            StoreError::NotFound(_) => Self::not_found(),
            other => {
                tracing::error!(error = %other, "{context}");
                Self::internal_error(context)
            }
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ValidationError> for ApiErrorResponse {
    fn from(error: ValidationError) -> Self {
        Self::bad_request(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ValidationError::MissingTitle, "Task title is required")]
    #[case(ValidationError::InvalidStatus, "Status must be active or done")]
    #[case(ValidationError::InvalidDirection, "Direction must be asc or desc")]
    #[case(ValidationError::InvalidTaskId, "Valid task ID is required")]
    fn validation_errors_are_bad_requests(#[case] error: ValidationError, #[case] message: &str) {
        let response = ApiErrorResponse::from(error);
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body.error, message);
    }

    #[test]
    fn missing_task_is_not_found() {
        let response = ApiErrorResponse::from_store(StoreError::NotFound(3), "Failed to fetch task");
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body.error, TASK_NOT_FOUND);
    }

    #[test]
    fn internal_errors_hide_details() {
        let response = ApiErrorResponse::from_store(StoreError::LockPoisoned, "Failed to create task");
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body.error, "Failed to create task");
    }

    #[test]
    fn into_response_keeps_status() {
        let response = ApiErrorResponse::bad_request("nope").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
