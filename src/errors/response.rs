use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::codes::ErrorCode;

/// Message used for every field-level validation failure
pub const INVALID_BODY_MESSAGE: &str = "The request body is invalid";

/// Message returned in place of any internal failure
pub const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Uniform error body returned by every endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Per-field problems, `null` unless the failure was field validation
    pub details: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: Vec<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn invalid_body(details: Vec<String>) -> Self {
        Self::with_details(ErrorCode::ValidationError, INVALID_BODY_MESSAGE, details)
    }

    pub fn internal_error() -> Self {
        Self::new(ErrorCode::InternalError, INTERNAL_ERROR_MESSAGE)
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.code.status_code(), Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    #[test]
    fn test_absent_details_serialize_as_null() {
        let err = ErrorResponse::not_found("post 123");
        let value: Value = serde_json::to_value(&err).unwrap();
        assert_eq!(
            value,
            json!({"code": "NOT_FOUND", "message": "post 123", "details": null})
        );
    }

    #[test]
    fn test_invalid_body_keeps_detail_order() {
        let err = ErrorResponse::invalid_body(vec![
            "username: must not be blank".to_string(),
            "content: must not be blank".to_string(),
        ]);
        let value: Value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["code"], "VALIDATION_ERROR");
        assert_eq!(value["message"], INVALID_BODY_MESSAGE);
        assert_eq!(
            value["details"],
            json!(["username: must not be blank", "content: must not be blank"])
        );
    }

    #[test]
    fn test_into_response_status() {
        assert_eq!(
            ErrorResponse::validation_error("bad").into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorResponse::not_found("gone").into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ErrorResponse::internal_error().into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
