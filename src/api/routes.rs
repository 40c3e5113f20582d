use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    create_comment, create_post, delete_comment, delete_post, get_comment, get_post, health,
    health_live, health_ready, like_post, list_comments, list_likes, list_posts, openapi_yaml,
    root, route_not_found, unlike_post, update_comment, update_post, AppState,
};
use super::middleware::logging_middleware;
use super::openapi::ApiDoc;
use crate::metrics;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root).fallback(route_not_found))
        .route("/openapi.yaml", get(openapi_yaml).fallback(route_not_found))
        // Health check
        .route("/api/health", get(health).fallback(route_not_found))
        .route("/health", get(health).fallback(route_not_found))
        .route("/health/live", get(health_live).fallback(route_not_found))
        .route("/health/ready", get(health_ready).fallback(route_not_found))
        // Posts
        .route(
            "/api/posts",
            get(list_posts)
                .post(create_post)
                .fallback(route_not_found),
        )
        .route(
            "/api/posts/:post_id",
            get(get_post)
                .patch(update_post)
                .delete(delete_post)
                .fallback(route_not_found),
        )
        // Comments
        .route(
            "/api/posts/:post_id/comments",
            get(list_comments)
                .post(create_comment)
                .fallback(route_not_found),
        )
        .route(
            "/api/posts/:post_id/comments/:comment_id",
            get(get_comment)
                .patch(update_comment)
                .delete(delete_comment)
                .fallback(route_not_found),
        )
        // Likes
        .route(
            "/api/posts/:post_id/likes",
            get(list_likes).fallback(route_not_found),
        )
        .route(
            "/api/posts/:post_id/like",
            post(like_post)
                .delete(unlike_post)
                .fallback(route_not_found),
        )
        // Metrics endpoint (Prometheus)
        .route(
            "/metrics",
            get(metrics::metrics_handler).fallback(route_not_found),
        )
        // Interactive documentation generated from the handlers
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Unknown paths; unsupported methods on known paths use the per-route fallbacks
        .fallback(route_not_found)
        // Order matters: compression -> logging -> metrics -> cors -> trace
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics::middleware::track_metrics))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
