//! Structured error handling for API responses
//!
//! Handlers and the service layer return [`ApiError`]. At the HTTP boundary
//! every variant is translated into an [`ErrorResponse`] and a status code;
//! internal failures are logged here and never shown to the caller.

pub mod codes;
pub mod response;

use std::fmt;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use crate::metrics::registry::API_ERRORS_TOTAL;

pub use codes::ErrorCode;
pub use response::{ErrorResponse, INTERNAL_ERROR_MESSAGE, INVALID_BODY_MESSAGE};

const NOT_FOUND_TAG: &str = "NOT_FOUND";
const VALIDATION_ERROR_TAG: &str = "VALIDATION_ERROR";

/// A single invalid input field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Field errors in the order they were reported
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![FieldError::new(field, message)])
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// `"<field>: <message>"` strings, one per error
    pub fn details(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }

    /// `Ok(())` when nothing was reported
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self))
        }
    }
}

impl FromIterator<FieldError> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Every failure a request can end in
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// One or more request fields are invalid
    #[error("invalid request fields: {}", .0.details().join(", "))]
    Validation(FieldErrors),

    /// The addressed resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// The request is well formed but cannot be applied
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    /// Classify an untyped failure by its message tag.
    ///
    /// A message starting with `NOT_FOUND` or `VALIDATION_ERROR` (checked in
    /// that order, case-sensitive) keeps its text minus the `"<TAG>: "`
    /// marker. Anything else, including a missing message, is internal.
    pub fn from_message(message: Option<&str>) -> Self {
        match message {
            Some(msg) if msg.starts_with(NOT_FOUND_TAG) => {
                Self::NotFound(msg.replace("NOT_FOUND: ", ""))
            }
            Some(msg) if msg.starts_with(VALIDATION_ERROR_TAG) => {
                Self::Invalid(msg.replace("VALIDATION_ERROR: ", ""))
            }
            Some(msg) => Self::Internal(anyhow::anyhow!(msg.to_string())),
            None => Self::Internal(anyhow::anyhow!("failure without a message")),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) | Self::Invalid(_) => ErrorCode::ValidationError,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Internal(_) => ErrorCode::InternalError,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.code().status_code()
    }

    /// Wire body for this failure. Internal details are dropped.
    pub fn to_response(&self) -> ErrorResponse {
        match self {
            Self::Validation(fields) => ErrorResponse::invalid_body(fields.details()),
            Self::NotFound(message) => ErrorResponse::not_found(message.clone()),
            Self::Invalid(message) => ErrorResponse::validation_error(message.clone()),
            Self::Internal(_) => ErrorResponse::internal_error(),
        }
    }
}

/// Map a failure to its status code and body
pub fn translate(err: &ApiError) -> (StatusCode, ErrorResponse) {
    (err.status_code(), err.to_response())
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ApiError>() {
            Ok(api_error) => api_error,
            Err(err) => match Self::from_message(Some(&err.to_string())) {
                Self::Internal(_) => Self::Internal(err),
                tagged => tagged,
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(FieldErrors::single("body", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(FieldErrors::single("query", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(FieldErrors::single("path", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.code();
        match &self {
            Self::Internal(err) => error!(error = ?err, "Request failed with internal error"),
            other => debug!(code = %code, error = %other, "Request rejected"),
        }
        API_ERRORS_TOTAL.with_label_values(&[code.as_str()]).inc();

        let (status, body) = translate(&self);
        (status, axum::Json(body)).into_response()
    }
}
