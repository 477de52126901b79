use mongodb::bson::{doc, oid::ObjectId, DateTime, Document};

use crate::app::auth::hash_password;
use crate::app::authorities::AuthorityService;
use crate::app::error::ServiceError;
use crate::domain::authority::ROLE_USER;
use crate::domain::user::{User, UserPage, UserSummary};
use crate::infra::db::{self, Db};

#[derive(Clone)]
pub struct UserService {
    db: Db,
}

impl UserService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn register(
        &self,
        username: String,
        password: String,
    ) -> Result<UserSummary, ServiceError> {
        if self
            .db
            .users()
            .find_one(doc! { "username": &username }, None)
            .await?
            .is_some()
        {
            return Err(ServiceError::DuplicateUsername(username));
        }

        let user = User::new(username, hash_password(&password)?);
        self.db.users().insert_one(&user, None).await?;

        let authority_id = AuthorityService::new(self.db.clone())
            .grant(ROLE_USER, user.id)
            .await?;
        self.db
            .users()
            .update_one(
                doc! { "_id": user.id },
                doc! { "$addToSet": { "authorities": authority_id } },
                None,
            )
            .await?;

        Ok(UserSummary::from(&user))
    }

    /// Partial profile edit. Callers short-circuit when neither field is
    /// present, so at least one `$set` entry always applies here.
    pub async fn edit(
        &self,
        user_id: ObjectId,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<UserSummary, ServiceError> {
        let mut user = self
            .db
            .users()
            .find_one(doc! { "_id": user_id }, None)
            .await?
            .ok_or(ServiceError::UserNotFound(user_id))?;

        let mut changes = Document::new();

        if let Some(new_username) = username {
            if new_username != user.username {
                if self
                    .db
                    .users()
                    .find_one(doc! { "username": &new_username }, None)
                    .await?
                    .is_some()
                {
                    return Err(ServiceError::DuplicateUsername(new_username));
                }
                changes.insert("username", &new_username);
                user.username = new_username;
            }
        }

        if let Some(new_password) = password {
            changes.insert("password_hash", hash_password(&new_password)?);
        }

        if !changes.is_empty() {
            changes.insert("updated_at", DateTime::now());
            self.db
                .users()
                .update_one(doc! { "_id": user_id }, doc! { "$set": changes }, None)
                .await?;
        }

        Ok(UserSummary::from(&user))
    }

    /// Profile page assembly: hydrates each stored reference set from its
    /// canonical collection. No re-aggregation, no joins at write time.
    pub async fn get_page(&self, user_id: ObjectId) -> Result<UserPage, ServiceError> {
        let user = self
            .db
            .users()
            .find_one(doc! { "_id": user_id }, None)
            .await?
            .ok_or(ServiceError::UserNotFound(user_id))?;

        let posts = db::find_by_ids(&self.db.posts(), &user.posts).await?;
        let favorite_posts = db::find_by_ids(&self.db.posts(), &user.favorite_posts).await?;
        let comments = db::find_by_ids(&self.db.comments(), &user.comments).await?;
        let likes = db::find_by_ids(&self.db.likes(), &user.likes).await?;
        let followers = db::find_by_ids(&self.db.users(), &user.followers).await?;
        let following = db::find_by_ids(&self.db.users(), &user.following).await?;

        Ok(UserPage {
            id: user.id.to_hex(),
            username: user.username,
            posts: posts.iter().map(Into::into).collect(),
            favorite_posts: favorite_posts.iter().map(Into::into).collect(),
            comments: comments.iter().map(Into::into).collect(),
            likes: likes.iter().map(Into::into).collect(),
            followers: followers.iter().map(Into::into).collect(),
            following: following.iter().map(Into::into).collect(),
        })
    }

    /// Deletes the user and every post they authored. Comments, likes and
    /// refresh tokens are left in place; readers filter the dangling refs.
    pub async fn delete_user(&self, user_id: ObjectId) -> Result<(), ServiceError> {
        let user = self
            .db
            .users()
            .find_one(doc! { "_id": user_id }, None)
            .await?
            .ok_or(ServiceError::UserNotFound(user_id))?;

        self.db
            .posts()
            .delete_many(doc! { "author_id": user.id }, None)
            .await?;
        self.db.users().delete_one(doc! { "_id": user.id }, None).await?;

        Ok(())
    }

    /// Adds the symmetric follower/following edge. `$addToSet` keeps the
    /// operation idempotent; the two writes are independent per-document
    /// updates, not a transaction.
    pub async fn follow(
        &self,
        requester_id: ObjectId,
        target_id: ObjectId,
    ) -> Result<(), ServiceError> {
        if self
            .db
            .users()
            .find_one(doc! { "_id": target_id }, None)
            .await?
            .is_none()
        {
            return Err(ServiceError::UserNotFound(target_id));
        }

        self.db
            .users()
            .update_one(
                doc! { "_id": requester_id },
                doc! { "$addToSet": { "following": target_id } },
                None,
            )
            .await?;
        self.db
            .users()
            .update_one(
                doc! { "_id": target_id },
                doc! { "$addToSet": { "followers": requester_id } },
                None,
            )
            .await?;

        Ok(())
    }

    /// Symmetric removal. Succeeds whether or not the edge existed.
    pub async fn unfollow(
        &self,
        requester_id: ObjectId,
        target_id: ObjectId,
    ) -> Result<(), ServiceError> {
        self.db
            .users()
            .update_one(
                doc! { "_id": requester_id },
                doc! { "$pull": { "following": target_id } },
                None,
            )
            .await?;
        self.db
            .users()
            .update_one(
                doc! { "_id": target_id },
                doc! { "$pull": { "followers": requester_id } },
                None,
            )
            .await?;

        Ok(())
    }
}
