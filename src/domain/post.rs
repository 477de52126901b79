use mongodb::bson::oid::ObjectId;
use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::user::UserSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub content: String,
    pub author_id: ObjectId,
    #[serde(default)]
    pub comments: Vec<ObjectId>,
    #[serde(default)]
    pub likes: Vec<ObjectId>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Post {
    pub fn new(author_id: ObjectId, content: String) -> Self {
        let now = DateTime::now();
        Self {
            id: ObjectId::new(),
            content,
            author_id,
            comments: Vec::new(),
            likes: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Like-count is derived from the denormalized like set, never stored.
    pub fn like_count(&self) -> usize {
        self.likes.len()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub id: String,
    pub content: String,
    pub like_count: usize,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<&Post> for PostSummary {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.to_hex(),
            content: post.content.clone(),
            like_count: post.like_count(),
            created_at: post.created_at.to_time_0_3(),
            updated_at: post.updated_at.to_time_0_3(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: String,
    pub content: String,
    pub author: UserSummary,
    pub like_count: usize,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl PostView {
    pub fn new(post: &Post, author: UserSummary) -> Self {
        Self {
            id: post.id.to_hex(),
            content: post.content.clone(),
            author,
            like_count: post.like_count(),
            created_at: post.created_at.to_time_0_3(),
            updated_at: post.updated_at.to_time_0_3(),
        }
    }
}
