//! Request bodies and their field rules.
//!
//! Missing string fields deserialize as empty so they surface as
//! "must not be blank" rather than as a JSON parse error.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::errors::{ApiError, FieldErrors};

pub const USERNAME_MAX_CHARS: u64 = 50;
pub const CONTENT_MAX_CHARS: u64 = 2000;
pub const POST_ID_MAX_CHARS: u64 = 64;

/// A request type whose field errors are reported in declaration order
pub trait ValidateRequest: Validate {
    /// Field names in the order errors are reported
    const FIELDS: &'static [&'static str];

    fn check(&self) -> Result<(), ApiError> {
        match self.validate() {
            Ok(()) => Ok(()),
            Err(errors) => collect_field_errors(&errors, Self::FIELDS).into_result(),
        }
    }
}

fn collect_field_errors(errors: &ValidationErrors, order: &[&str]) -> FieldErrors {
    let by_field = errors.field_errors();
    let mut fields = FieldErrors::new();

    for &field in order {
        if let Some(list) = by_field.get(field) {
            for error in list.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                fields.push(field, message);
            }
        }
    }

    fields
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("must not be blank".into());
        return Err(error);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePostRequest {
    /// Optional client-chosen id; a UUID is generated when absent
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = POST_ID_MAX_CHARS, message = "must be at most 64 characters")
    )]
    pub id: Option<String>,
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = USERNAME_MAX_CHARS, message = "must be at most 50 characters")
    )]
    pub username: String,
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = CONTENT_MAX_CHARS, message = "must be at most 2000 characters")
    )]
    pub content: String,
}

impl ValidateRequest for CreatePostRequest {
    const FIELDS: &'static [&'static str] = &["id", "username", "content"];
}

/// Body shared by post and comment edits
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateContentRequest {
    /// Must match the author of the post or comment
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = USERNAME_MAX_CHARS, message = "must be at most 50 characters")
    )]
    pub username: String,
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = CONTENT_MAX_CHARS, message = "must be at most 2000 characters")
    )]
    pub content: String,
}

impl ValidateRequest for UpdateContentRequest {
    const FIELDS: &'static [&'static str] = &["username", "content"];
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCommentRequest {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = USERNAME_MAX_CHARS, message = "must be at most 50 characters")
    )]
    pub username: String,
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = CONTENT_MAX_CHARS, message = "must be at most 2000 characters")
    )]
    pub content: String,
}

impl ValidateRequest for CreateCommentRequest {
    const FIELDS: &'static [&'static str] = &["username", "content"];
}

/// Query string of the like and unlike endpoints
#[derive(Debug, Clone, Deserialize, Validate, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LikeParams {
    /// User liking or unliking the post
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = USERNAME_MAX_CHARS, message = "must be at most 50 characters")
    )]
    pub username: String,
}

impl ValidateRequest for LikeParams {
    const FIELDS: &'static [&'static str] = &["username"];
}
