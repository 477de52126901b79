use anyhow::Result;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use serde::de::DeserializeOwned;

use crate::config::AppConfig;
use crate::domain::authority::Authority;
use crate::domain::engagement::{Comment, Like};
use crate::domain::post::Post;
use crate::domain::token::RefreshToken;
use crate::domain::user::User;

#[derive(Clone)]
pub struct Db {
    database: Database,
}

impl Db {
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let options = ClientOptions::parse(&config.mongodb_uri).await?;
        let client = Client::with_options(options)?;
        let database = client.database(&config.mongodb_database);
        Ok(Self { database })
    }

    pub fn from_database(database: Database) -> Self {
        Self { database }
    }

    pub fn users(&self) -> Collection<User> {
        self.database.collection("users")
    }

    pub fn posts(&self) -> Collection<Post> {
        self.database.collection("posts")
    }

    pub fn comments(&self) -> Collection<Comment> {
        self.database.collection("comments")
    }

    pub fn likes(&self) -> Collection<Like> {
        self.database.collection("likes")
    }

    pub fn refresh_tokens(&self) -> Collection<RefreshToken> {
        self.database.collection("refresh_tokens")
    }

    pub fn authorities(&self) -> Collection<Authority> {
        self.database.collection("authorities")
    }

    /// Unique indexes the services rely on. Like records deliberately carry
    /// no (author, post) uniqueness constraint; that check lives in the
    /// application layer.
    pub async fn ensure_indexes(&self) -> Result<()> {
        let unique = IndexOptions::builder().unique(true).build();

        self.users()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "username": 1 })
                    .options(unique.clone())
                    .build(),
                None,
            )
            .await?;

        self.refresh_tokens()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "token_hash": 1 })
                    .options(unique)
                    .build(),
                None,
            )
            .await?;

        Ok(())
    }

    pub async fn ping(&self) -> Result<()> {
        self.database.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }
}

/// Hydrates a denormalized reference set from its canonical collection.
/// Ids that no longer resolve (dangling references) are silently dropped.
pub async fn find_by_ids<T>(
    collection: &Collection<T>,
    ids: &[ObjectId],
) -> mongodb::error::Result<Vec<T>>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    collection
        .find(doc! { "_id": { "$in": ids } }, None)
        .await?
        .try_collect()
        .await
}
