use utoipa::OpenApi;

use crate::api::handlers::{HealthResponse, MessageResponse};
use crate::errors::{ErrorCode, ErrorResponse};
use crate::models::requests::{
    CreateCommentRequest, CreatePostRequest, LikeParams, UpdateContentRequest,
};
use crate::models::{Comment, Like, Post};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Social Media API",
        version = "1.0.0",
        description = "Posts, comments and likes. Every failure is returned as an ErrorResponse with a machine-readable code.",
    ),
    paths(
        crate::api::handlers::root,
        crate::api::handlers::openapi_yaml,
        crate::api::handlers::health,
        crate::api::handlers::health_ready,
        crate::api::handlers::list_posts,
        crate::api::handlers::create_post,
        crate::api::handlers::get_post,
        crate::api::handlers::update_post,
        crate::api::handlers::delete_post,
        crate::api::handlers::list_comments,
        crate::api::handlers::create_comment,
        crate::api::handlers::get_comment,
        crate::api::handlers::update_comment,
        crate::api::handlers::delete_comment,
        crate::api::handlers::list_likes,
        crate::api::handlers::like_post,
        crate::api::handlers::unlike_post,
    ),
    components(
        schemas(
            Post,
            Comment,
            Like,
            ErrorResponse,
            ErrorCode,
            CreatePostRequest,
            UpdateContentRequest,
            CreateCommentRequest,
            LikeParams,
            MessageResponse,
            HealthResponse,
        )
    ),
    tags(
        (name = "meta", description = "Service information and API documents"),
        (name = "health", description = "Health check endpoints"),
        (name = "posts", description = "Create, read, edit and delete posts"),
        (name = "comments", description = "Comments on a post"),
        (name = "likes", description = "Likes on a post"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_post_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/posts"));
        assert!(doc.paths.paths.contains_key("/api/posts/{post_id}/like"));
    }

    #[test]
    fn test_document_exports_as_yaml() {
        let yaml = ApiDoc::openapi().to_yaml().unwrap();
        assert!(yaml.contains("ErrorResponse"));
        assert!(yaml.contains("Social Media API"));
    }
}
