use mongodb::bson::oid::ObjectId;
use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

use crate::domain::engagement::{CommentView, LikeView};
use crate::domain::post::PostSummary;

/// Canonical user document. The reference arrays are denormalized copies
/// maintained by `$addToSet`/`$pull` partial updates; the canonical records
/// live in their own collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub username: String,
    pub password_hash: String,
    #[serde(default)]
    pub posts: Vec<ObjectId>,
    #[serde(default)]
    pub favorite_posts: Vec<ObjectId>,
    #[serde(default)]
    pub followers: Vec<ObjectId>,
    #[serde(default)]
    pub following: Vec<ObjectId>,
    #[serde(default)]
    pub comments: Vec<ObjectId>,
    #[serde(default)]
    pub likes: Vec<ObjectId>,
    #[serde(default)]
    pub refresh_tokens: Vec<ObjectId>,
    #[serde(default)]
    pub authorities: Vec<ObjectId>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl User {
    pub fn new(username: String, password_hash: String) -> Self {
        let now = DateTime::now();
        Self {
            id: ObjectId::new(),
            username,
            password_hash,
            posts: Vec::new(),
            favorite_posts: Vec::new(),
            followers: Vec::new(),
            following: Vec::new(),
            comments: Vec::new(),
            likes: Vec::new(),
            refresh_tokens: Vec::new(),
            authorities: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_hex(),
            username: user.username.clone(),
        }
    }
}

/// Profile page: a projection of the stored denormalized reference sets,
/// hydrated from the canonical collections. Dangling references resolve to
/// nothing and are filtered out.
#[derive(Debug, Clone, Serialize)]
pub struct UserPage {
    pub id: String,
    pub username: String,
    pub posts: Vec<PostSummary>,
    pub favorite_posts: Vec<PostSummary>,
    pub comments: Vec<CommentView>,
    pub likes: Vec<LikeView>,
    pub followers: Vec<UserSummary>,
    pub following: Vec<UserSummary>,
}
