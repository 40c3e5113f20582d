use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use utoipa::ToSchema;

use crate::errors::ApiError;
use crate::models::requests::{
    CreateCommentRequest, CreatePostRequest, LikeParams, UpdateContentRequest,
};
use crate::models::{Comment, Like, Post};
use crate::service::SocialService;

lazy_static::lazy_static! {
    static ref START_TIME: Instant = Instant::now();
}

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub service: SocialService,
    /// File served at `/openapi.yaml`
    pub openapi_path: PathBuf,
    pub instance_id: String,
}

/// Plain confirmation message
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

/// Service health
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<Utc>,
    pub service: String,
    pub version: String,
    pub instance_id: String,
    pub uptime_seconds: u64,
}

/// Service information
#[utoipa::path(
    get,
    path = "/",
    tag = "meta",
    responses((status = 200, description = "Service information", body = serde_json::Value))
)]
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Social Media API",
        "version": env!("CARGO_PKG_VERSION"),
        "docs": "/docs",
        "openapi": "/openapi.yaml",
    }))
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses((status = 200, description = "Service is healthy", body = HealthResponse))
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        instance_id: state.instance_id.clone(),
        uptime_seconds: START_TIME.elapsed().as_secs(),
    })
}

pub async fn health_live() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "alive" }))
}

/// Readiness: storage must answer
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Ready to serve traffic", body = serde_json::Value),
        (status = 500, description = "Storage unreachable", body = crate::errors::ErrorResponse)
    )
)]
pub async fn health_ready(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    state.service.ready().await?;
    Ok(Json(serde_json::json!({ "status": "ready" })))
}

/// Serve the static OpenAPI document
#[utoipa::path(
    get,
    path = "/openapi.yaml",
    tag = "meta",
    responses(
        (status = 200, description = "OpenAPI document", content_type = "application/yaml", body = String),
        (status = 404, description = "Document missing", body = crate::errors::ErrorResponse),
        (status = 500, description = "Document unreadable", body = crate::errors::ErrorResponse)
    )
)]
pub async fn openapi_yaml(State(state): State<AppState>) -> Result<Response, ApiError> {
    let yaml = tokio::fs::read_to_string(&state.openapi_path)
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => ApiError::not_found("OpenAPI document not found"),
            _ => ApiError::Internal(anyhow::Error::new(e).context(format!(
                "Failed to read {}",
                state.openapi_path.display()
            ))),
        })?;

    Ok(([(header::CONTENT_TYPE, "application/yaml")], yaml).into_response())
}

/// Catch-all for unknown routes
pub async fn route_not_found() -> ApiError {
    ApiError::not_found("Resource not found")
}

/// List all posts, newest first
#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    responses(
        (status = 200, description = "All posts", body = [Post]),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    )
)]
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>, ApiError> {
    let posts = state.service.list_posts().await?;
    info!("Listed {} posts", posts.len());
    Ok(Json(posts))
}

/// Create a post
#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = Post),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    )
)]
pub async fn create_post(
    State(state): State<AppState>,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let Json(req) = payload?;
    let post = state.service.create_post(req).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// Get a post with its comments and likes
#[utoipa::path(
    get,
    path = "/api/posts/{post_id}",
    tag = "posts",
    params(("post_id" = String, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post found", body = Post),
        (status = 404, description = "Post not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn get_post(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Post>, ApiError> {
    let Path(post_id) = path?;
    Ok(Json(state.service.get_post(&post_id).await?))
}

/// Edit a post (author only)
#[utoipa::path(
    patch,
    path = "/api/posts/{post_id}",
    tag = "posts",
    params(("post_id" = String, Path, description = "Post id")),
    request_body = UpdateContentRequest,
    responses(
        (status = 200, description = "Post updated", body = Post),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Post not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn update_post(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<UpdateContentRequest>, JsonRejection>,
) -> Result<Json<Post>, ApiError> {
    let Path(post_id) = path?;
    let Json(req) = payload?;
    Ok(Json(state.service.update_post(&post_id, req).await?))
}

/// Delete a post with its comments and likes
#[utoipa::path(
    delete,
    path = "/api/posts/{post_id}",
    tag = "posts",
    params(("post_id" = String, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post deleted", body = MessageResponse),
        (status = 404, description = "Post not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn delete_post(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(post_id) = path?;
    state.service.delete_post(&post_id).await?;
    Ok(MessageResponse::new("Post deleted successfully"))
}

/// List the comments of a post, newest first
#[utoipa::path(
    get,
    path = "/api/posts/{post_id}/comments",
    tag = "comments",
    params(("post_id" = String, Path, description = "Post id")),
    responses(
        (status = 200, description = "Comments", body = [Comment]),
        (status = 404, description = "Post not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn list_comments(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let Path(post_id) = path?;
    Ok(Json(state.service.list_comments(&post_id).await?))
}

/// Comment on a post
#[utoipa::path(
    post,
    path = "/api/posts/{post_id}/comments",
    tag = "comments",
    params(("post_id" = String, Path, description = "Post id")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = Comment),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Post not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn create_comment(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let Path(post_id) = path?;
    let Json(req) = payload?;
    let comment = state.service.create_comment(&post_id, req).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

#[utoipa::path(
    get,
    path = "/api/posts/{post_id}/comments/{comment_id}",
    tag = "comments",
    params(
        ("post_id" = String, Path, description = "Post id"),
        ("comment_id" = String, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Comment found", body = Comment),
        (status = 404, description = "Comment not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn get_comment(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<Json<Comment>, ApiError> {
    let Path((post_id, comment_id)) = path?;
    Ok(Json(state.service.get_comment(&post_id, &comment_id).await?))
}

/// Edit a comment (author only)
#[utoipa::path(
    patch,
    path = "/api/posts/{post_id}/comments/{comment_id}",
    tag = "comments",
    params(
        ("post_id" = String, Path, description = "Post id"),
        ("comment_id" = String, Path, description = "Comment id")
    ),
    request_body = UpdateContentRequest,
    responses(
        (status = 200, description = "Comment updated", body = Comment),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Comment not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn update_comment(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
    payload: Result<Json<UpdateContentRequest>, JsonRejection>,
) -> Result<Json<Comment>, ApiError> {
    let Path((post_id, comment_id)) = path?;
    let Json(req) = payload?;
    Ok(Json(
        state
            .service
            .update_comment(&post_id, &comment_id, req)
            .await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{post_id}/comments/{comment_id}",
    tag = "comments",
    params(
        ("post_id" = String, Path, description = "Post id"),
        ("comment_id" = String, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Comment deleted", body = MessageResponse),
        (status = 404, description = "Comment not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn delete_comment(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path((post_id, comment_id)) = path?;
    state.service.delete_comment(&post_id, &comment_id).await?;
    Ok(MessageResponse::new("Comment deleted successfully"))
}

/// Who liked a post, oldest first
#[utoipa::path(
    get,
    path = "/api/posts/{post_id}/likes",
    tag = "likes",
    params(("post_id" = String, Path, description = "Post id")),
    responses(
        (status = 200, description = "Likes", body = [Like]),
        (status = 404, description = "Post not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn list_likes(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Like>>, ApiError> {
    let Path(post_id) = path?;
    Ok(Json(state.service.list_likes(&post_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/posts/{post_id}/like",
    tag = "likes",
    params(("post_id" = String, Path, description = "Post id"), LikeParams),
    responses(
        (status = 201, description = "Post liked", body = MessageResponse),
        (status = 400, description = "Invalid username or already liked", body = crate::errors::ErrorResponse),
        (status = 404, description = "Post not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn like_post(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    params: Result<Query<LikeParams>, QueryRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Path(post_id) = path?;
    let Query(params) = params?;
    state.service.like_post(&post_id, params).await?;
    Ok((
        StatusCode::CREATED,
        MessageResponse::new("Post liked successfully"),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{post_id}/like",
    tag = "likes",
    params(("post_id" = String, Path, description = "Post id"), LikeParams),
    responses(
        (status = 200, description = "Post unliked", body = MessageResponse),
        (status = 404, description = "Like not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn unlike_post(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    params: Result<Query<LikeParams>, QueryRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(post_id) = path?;
    let Query(params) = params?;
    state.service.unlike_post(&post_id, params).await?;
    Ok(MessageResponse::new("Post unliked successfully"))
}
