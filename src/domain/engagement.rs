use mongodb::bson::oid::ObjectId;
use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub content: String,
    pub author_id: ObjectId,
    pub post_id: ObjectId,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Comment {
    pub fn new(author_id: ObjectId, post_id: ObjectId, content: String) -> Self {
        let now = DateTime::now();
        Self {
            id: ObjectId::new(),
            content,
            author_id,
            post_id,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Like {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub author_id: ObjectId,
    pub post_id: ObjectId,
    pub created_at: DateTime,
}

impl Like {
    pub fn new(author_id: ObjectId, post_id: ObjectId) -> Self {
        Self {
            id: ObjectId::new(),
            author_id,
            post_id,
            created_at: DateTime::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: String,
    pub content: String,
    pub author_id: String,
    pub post_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&Comment> for CommentView {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id.to_hex(),
            content: comment.content.clone(),
            author_id: comment.author_id.to_hex(),
            post_id: comment.post_id.to_hex(),
            created_at: comment.created_at.to_time_0_3(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LikeView {
    pub id: String,
    pub author_id: String,
    pub post_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&Like> for LikeView {
    fn from(like: &Like) -> Self {
        Self {
            id: like.id.to_hex(),
            author_id: like.author_id.to_hex(),
            post_id: like.post_id.to_hex(),
            created_at: like.created_at.to_time_0_3(),
        }
    }
}
