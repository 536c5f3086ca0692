//! JSON errors for the API routes.
//!
//! Every failure leaves the API as `{"error": {"code", "message", "details?"}}`.
//! Page routes take the status and message from the same [`ApiError`] and
//! render `error.html` instead.

use std::collections::BTreeMap;
use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::FilehostError;

/// Messages per request field.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Machine-readable error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Body is not valid JSON for the endpoint.
    BadRequest,
    /// No usable access token, or its user is gone.
    Unauthorized,
    /// Visible to the viewer but not theirs to change.
    Forbidden,
    /// Missing, or hidden from the viewer.
    NotFound,
    /// One or more fields broke their rules; see `details`.
    InvalidInput,
    /// Well-formed request refused by a file, comment or grant rule.
    Rejected,
    InternalError,
}

impl ErrorCode {
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::InvalidInput | ErrorCode::Rejected => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub message: String,
    /// Only present for `INVALID_INPUT`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<FieldErrors>,
}

/// Error returned by API handlers and extractors.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    details: Option<FieldErrors>,
}

impl ApiError {
    fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Rejected, message)
    }

    /// Opaque 500. The cause belongs in the log, not the response.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn status(&self) -> StatusCode {
        self.code.status_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&FieldErrors> {
        self.details.as_ref()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let details: FieldErrors = errors
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let messages = errors
                    .iter()
                    .map(|e| match &e.message {
                        Some(message) => message.to_string(),
                        None => format!("Invalid {}", field),
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();

        Self {
            code: ErrorCode::InvalidInput,
            message: "Validation failed".to_string(),
            details: Some(details),
        }
    }
}

impl From<FilehostError> for ApiError {
    fn from(err: FilehostError) -> Self {
        match err {
            FilehostError::Auth(msg) => ApiError::unauthorized(msg),
            FilehostError::Permission(msg) => ApiError::forbidden(msg),
            FilehostError::Validation(msg) => ApiError::rejected(msg),
            err @ FilehostError::NotFound(_) => ApiError::not_found(err.to_string()),
            err => {
                tracing::error!("Internal error: {}", err);
                ApiError::internal("An internal error occurred")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status(), self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Rename {
        #[validate(length(min = 1, message = "Name must not be empty"))]
        name: String,
        #[validate(range(min = 1))]
        user_id: i64,
    }

    #[test]
    fn test_from_filehost_error() {
        let err = ApiError::from(FilehostError::NotFound("file".to_string()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "file not found");

        let err = ApiError::from(FilehostError::Permission("no".to_string()));
        assert_eq!(err.code(), ErrorCode::Forbidden);

        let err = ApiError::from(FilehostError::Validation(
            "the author already has access".to_string(),
        ));
        assert_eq!(err.code(), ErrorCode::Rejected);
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.details().is_none());

        let err = ApiError::from(FilehostError::Auth("who".to_string()));
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_internal_errors_hide_the_cause() {
        let err = ApiError::from(FilehostError::Database("database is locked".to_string()));
        assert_eq!(err.code(), ErrorCode::InternalError);
        assert_eq!(err.message(), "An internal error occurred");
    }

    #[test]
    fn test_from_validation_errors() {
        let request = Rename {
            name: String::new(),
            user_id: 0,
        };
        let err = ApiError::from(request.validate().unwrap_err());

        assert_eq!(err.code(), ErrorCode::InvalidInput);
        let details = err.details().unwrap();
        assert_eq!(details["name"], vec!["Name must not be empty".to_string()]);
        assert_eq!(details["user_id"], vec!["Invalid user_id".to_string()]);
    }

    #[tokio::test]
    async fn test_error_body() {
        let response = ApiError::not_found("file not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["message"], "file not found");
        assert!(body["error"].get("details").is_none());
    }
}
