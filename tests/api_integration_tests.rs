use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use std::path::PathBuf;
use tower::Service;

// Helper to create test app on a throwaway SQLite file
async fn create_test_app() -> axum::Router {
    create_test_app_with_docs(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("openapi.yaml"))
        .await
}

async fn create_test_app_with_docs(openapi_path: PathBuf) -> axum::Router {
    use socialapp::{api, config, db, service};
    use std::sync::Arc;

    let path = std::env::temp_dir().join(format!("socialapp-it-{}.db", uuid::Uuid::new_v4()));
    let config = config::DatabaseConfig {
        url: format!("sqlite:{}", path.display()),
        max_connections: 4,
        acquire_timeout_ms: 5_000,
    };
    let db = db::init_database(&config)
        .await
        .expect("Failed to open database");

    let state = Arc::new(api::handlers::AppStateInner {
        service: service::SocialService::new(db),
        openapi_path,
        instance_id: "test".to_string(),
    });

    api::routes::create_router(state)
}

// Helper to send request and parse JSON response
async fn send_json_request(app: &mut axum::Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap_or(json!({}));

    (status, json)
}

// Helper to send JSON request with JSON body
async fn send_json_body_request(
    app: &mut axum::Router,
    method: &str,
    uri: &str,
    body: Value,
) -> (StatusCode, Value) {
    let bytes = serde_json::to_vec(&body).unwrap();
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(bytes))
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap_or(json!({}));

    (status, json)
}

async fn create_post(app: &mut axum::Router, username: &str, content: &str) -> Value {
    let (status, body) = send_json_body_request(
        app,
        "POST",
        "/api/posts",
        json!({ "username": username, "content": content }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {body}");
    body
}

fn assert_error(body: &Value, code: &str, message: &str) {
    assert_eq!(body["code"], code);
    assert_eq!(body["message"], message);
}

#[tokio::test]
async fn test_health_endpoint() {
    let mut app = create_test_app().await;
    let (status, body) = send_json_request(&mut app, "GET", "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["instanceId"], "test");
}

#[tokio::test]
async fn test_health_ready_endpoint() {
    let mut app = create_test_app().await;
    let (status, body) = send_json_request(&mut app, "GET", "/health/ready").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_post_lifecycle() {
    let mut app = create_test_app().await;
    let post = create_post(&mut app, "alice", "Hello world! This is Alice.").await;
    let id = post["id"].as_str().unwrap().to_string();
    assert_eq!(post["likesCount"], 0);
    assert_eq!(post["commentsCount"], 0);

    let (status, list) = send_json_request(&mut app, "GET", "/api/posts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, updated) = send_json_body_request(
        &mut app,
        "PATCH",
        &format!("/api/posts/{id}"),
        json!({ "username": "alice", "content": "edited" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["content"], "edited");

    let (status, body) = send_json_request(&mut app, "DELETE", &format!("/api/posts/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Post deleted successfully");

    let (status, body) = send_json_request(&mut app, "GET", &format!("/api/posts/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&body, "NOT_FOUND", "Post not found");
    assert!(body["details"].is_null());
}

#[tokio::test]
async fn test_create_post_missing_fields() {
    let mut app = create_test_app().await;
    let (status, body) = send_json_body_request(&mut app, "POST", "/api/posts", json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, "VALIDATION_ERROR", "The request body is invalid");
    assert_eq!(
        body["details"],
        json!(["username: must not be blank", "content: must not be blank"])
    );
}

#[tokio::test]
async fn test_create_post_content_too_long() {
    let mut app = create_test_app().await;
    let (status, body) = send_json_body_request(
        &mut app,
        "POST",
        "/api/posts",
        json!({ "username": "alice", "content": "x".repeat(2001) }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["details"],
        json!(["content: must be at most 2000 characters"])
    );
}

#[tokio::test]
async fn test_malformed_json_body() {
    let mut app = create_test_app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/posts")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_error(&body, "VALIDATION_ERROR", "The request body is invalid");
    assert_eq!(body["details"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_post_id() {
    let mut app = create_test_app().await;
    let payload = json!({ "id": "post-1", "username": "alice", "content": "hi" });

    let (status, _) = send_json_body_request(&mut app, "POST", "/api/posts", payload.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send_json_body_request(&mut app, "POST", "/api/posts", payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, "VALIDATION_ERROR", "Post ID already exists");
}

#[tokio::test]
async fn test_update_post_by_other_user() {
    let mut app = create_test_app().await;
    let post = create_post(&mut app, "alice", "mine").await;
    let id = post["id"].as_str().unwrap();

    let (status, body) = send_json_body_request(
        &mut app,
        "PATCH",
        &format!("/api/posts/{id}"),
        json!({ "username": "mallory", "content": "hijacked" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, "VALIDATION_ERROR", "Only the author can modify this post");
}

#[tokio::test]
async fn test_comments_flow() {
    let mut app = create_test_app().await;
    let post = create_post(&mut app, "alice", "hello").await;
    let id = post["id"].as_str().unwrap();

    let (status, comment) = send_json_body_request(
        &mut app,
        "POST",
        &format!("/api/posts/{id}/comments"),
        json!({ "username": "bob", "content": "nice post" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let comment_id = comment["id"].as_str().unwrap();
    assert_eq!(comment["postId"], id);

    let (status, fetched) = send_json_request(&mut app, "GET", &format!("/api/posts/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["commentsCount"], 1);
    assert_eq!(fetched["comments"].as_array().unwrap().len(), 1);

    let (status, body) = send_json_body_request(
        &mut app,
        "POST",
        &format!("/api/posts/{id}/comments"),
        json!({ "username": "bob" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], json!(["content: must not be blank"]));

    let (status, _) = send_json_request(
        &mut app,
        "DELETE",
        &format!("/api/posts/{id}/comments/{comment_id}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json_request(
        &mut app,
        "GET",
        &format!("/api/posts/{id}/comments/{comment_id}"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&body, "NOT_FOUND", "Comment not found");
}

#[tokio::test]
async fn test_comment_on_missing_post() {
    let mut app = create_test_app().await;
    let (status, body) = send_json_body_request(
        &mut app,
        "POST",
        "/api/posts/nope/comments",
        json!({ "username": "bob", "content": "hi" }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&body, "NOT_FOUND", "Post not found");
}

#[tokio::test]
async fn test_likes_flow() {
    let mut app = create_test_app().await;
    let post = create_post(&mut app, "alice", "like me").await;
    let id = post["id"].as_str().unwrap();
    let like_uri = format!("/api/posts/{id}/like?username=bob");

    let (status, body) = send_json_request(&mut app, "POST", &like_uri).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Post liked successfully");

    let (status, body) = send_json_request(&mut app, "POST", &like_uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, "VALIDATION_ERROR", "Already liked this post");

    let (status, likes) = send_json_request(&mut app, "GET", &format!("/api/posts/{id}/likes")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(likes.as_array().unwrap().len(), 1);
    assert_eq!(likes[0]["username"], "bob");

    let (status, _) = send_json_request(&mut app, "DELETE", &like_uri).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json_request(&mut app, "DELETE", &like_uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&body, "NOT_FOUND", "Like not found");

    let (_, fetched) = send_json_request(&mut app, "GET", &format!("/api/posts/{id}")).await;
    assert_eq!(fetched["likesCount"], 0);
}

#[tokio::test]
async fn test_like_without_username() {
    let mut app = create_test_app().await;
    let post = create_post(&mut app, "alice", "hello").await;
    let id = post["id"].as_str().unwrap();

    let (status, body) =
        send_json_request(&mut app, "POST", &format!("/api/posts/{id}/like")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], json!(["username: must not be blank"]));
}

#[tokio::test]
async fn test_like_missing_post() {
    let mut app = create_test_app().await;
    let (status, body) =
        send_json_request(&mut app, "POST", "/api/posts/nope/like?username=bob").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&body, "NOT_FOUND", "Post not found");
}

#[tokio::test]
async fn test_unknown_route_returns_error_body() {
    let mut app = create_test_app().await;
    let (status, body) = send_json_request(&mut app, "GET", "/api/nothing-here").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&body, "NOT_FOUND", "Resource not found");
}

#[tokio::test]
async fn test_undecodable_path_param_returns_error_body() {
    let mut app = create_test_app().await;
    let (status, body) = send_json_request(&mut app, "GET", "/api/posts/%FF").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, "VALIDATION_ERROR", "The request body is invalid");
    let details = body["details"].as_array().unwrap();
    assert_eq!(details.len(), 1);
    assert!(details[0].as_str().unwrap().starts_with("path: "));

    let (status, body) =
        send_json_request(&mut app, "DELETE", "/api/posts/p1/comments/%FF").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_unsupported_method_returns_error_body() {
    let mut app = create_test_app().await;
    for (method, uri) in [
        ("PUT", "/api/posts"),
        ("POST", "/api/posts/p1/likes"),
        ("PUT", "/api/posts/p1/like"),
        ("DELETE", "/api/health"),
    ] {
        let (status, body) = send_json_request(&mut app, method, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert_error(&body, "NOT_FOUND", "Resource not found");
        assert!(body["details"].is_null());
    }
}

#[tokio::test]
async fn test_openapi_yaml_served() {
    let mut app = create_test_app().await;
    let request = Request::builder()
        .uri("/openapi.yaml")
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/yaml"
    );

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(String::from_utf8_lossy(&body).contains("openapi:"));
}

#[tokio::test]
async fn test_openapi_yaml_missing() {
    let mut app = create_test_app_with_docs(PathBuf::from("/nonexistent/openapi.yaml")).await;
    let (status, body) = send_json_request(&mut app, "GET", "/openapi.yaml").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&body, "NOT_FOUND", "OpenAPI document not found");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let mut app = create_test_app().await;
    let request = Request::builder()
        .uri("/api/health")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-42");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let mut app = create_test_app().await;
    send_json_request(&mut app, "GET", "/api/health").await;

    let request = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(String::from_utf8_lossy(&body).contains("http_requests_total"));
}
