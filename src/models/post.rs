use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use utoipa::ToSchema;
use uuid::Uuid;

/// Generate a fresh entity id
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// A post with its counters.
///
/// `comments` and `likes` are only filled in when a single post is fetched;
/// list endpoints leave them empty and they are then omitted from the JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Always equal to the number of likes stored for the post
    pub likes_count: i64,
    /// Always equal to the number of comments stored for the post
    pub comments_count: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[cfg_attr(feature = "postgres", sqlx(skip))]
    pub comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "HashSet::is_empty")]
    #[schema(value_type = Vec<Like>)]
    #[cfg_attr(feature = "postgres", sqlx(skip))]
    pub likes: HashSet<Like>,
}

impl Post {
    pub fn new(id: String, username: String, content: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            username,
            content,
            created_at: now,
            updated_at: now,
            likes_count: 0,
            comments_count: 0,
            comments: Vec::new(),
            likes: HashSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(post_id: String, username: String, content: String, now: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            post_id,
            username,
            content,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Composite key of a like
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LikeId {
    pub post_id: String,
    pub username: String,
}

/// A user's like on a post. Identity is `(post_id, username)`; `liked_at`
/// does not take part in equality.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub post_id: String,
    pub username: String,
    pub liked_at: DateTime<Utc>,
}

impl Like {
    pub fn new(post_id: String, username: String, now: DateTime<Utc>) -> Self {
        Self {
            post_id,
            username,
            liked_at: now,
        }
    }

    pub fn id(&self) -> LikeId {
        LikeId {
            post_id: self.post_id.clone(),
            username: self.username.clone(),
        }
    }
}

impl PartialEq for Like {
    fn eq(&self, other: &Self) -> bool {
        self.post_id == other.post_id && self.username == other.username
    }
}

impl Eq for Like {}

impl Hash for Like {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.post_id.hash(state);
        self.username.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_like_identity_ignores_timestamp() {
        let now = Utc::now();
        let mut likes = HashSet::new();
        assert!(likes.insert(Like::new("p1".into(), "alice".into(), now)));
        assert!(!likes.insert(Like::new(
            "p1".into(),
            "alice".into(),
            now + Duration::seconds(5)
        )));
        assert!(likes.insert(Like::new("p1".into(), "bob".into(), now)));
        assert_eq!(likes.len(), 2);
    }

    #[test]
    fn test_post_serializes_camel_case_without_empty_collections() {
        let post = Post::new("p1".into(), "alice".into(), "hello".into(), Utc::now());
        let value = serde_json::to_value(&post).unwrap();
        assert_eq!(value["likesCount"], 0);
        assert_eq!(value["commentsCount"], 0);
        assert!(value.get("createdAt").is_some());
        assert!(value.get("comments").is_none());
        assert!(value.get("likes").is_none());
    }

    #[test]
    fn test_comment_gets_fresh_id() {
        let now = Utc::now();
        let a = Comment::new("p1".into(), "bob".into(), "hi".into(), now);
        let b = Comment::new("p1".into(), "bob".into(), "hi".into(), now);
        assert_ne!(a.id, b.id);
        assert_eq!(a.created_at, a.updated_at);
    }
}
