use std::collections::HashSet;

use mongodb::bson::{doc, oid::ObjectId, DateTime};
use serde::Serialize;

use crate::app::error::ServiceError;
use crate::domain::engagement::{CommentView, Like, LikeView};
use crate::domain::post::{Post, PostSummary, PostView};
use crate::domain::user::UserSummary;
use crate::infra::db::{self, Db};

#[derive(Clone)]
pub struct PostService {
    db: Db,
}

/// Aggregated activity of every followed user, each collection ordered by
/// creation time ascending with duplicates collapsed by id.
#[derive(Debug, Serialize)]
pub struct Newsfeed {
    pub posts: Vec<PostSummary>,
    pub likes: Vec<LikeView>,
    pub comments: Vec<CommentView>,
}

impl PostService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Inserts the post, then patches the author's denormalized post set.
    /// Two independent writes; a crash in between leaves the post without
    /// its back-reference.
    pub async fn create_post(
        &self,
        user_id: ObjectId,
        content: String,
    ) -> Result<PostView, ServiceError> {
        let author = self
            .db
            .users()
            .find_one(doc! { "_id": user_id }, None)
            .await?
            .ok_or(ServiceError::UserNotFound(user_id))?;

        let post = Post::new(author.id, content);
        self.db.posts().insert_one(&post, None).await?;
        self.db
            .users()
            .update_one(
                doc! { "_id": author.id },
                doc! { "$addToSet": { "posts": post.id } },
                None,
            )
            .await?;

        Ok(PostView::new(&post, UserSummary::from(&author)))
    }

    pub async fn edit_post(
        &self,
        post_id: ObjectId,
        new_content: String,
        requester_id: ObjectId,
    ) -> Result<PostView, ServiceError> {
        let mut post = self
            .db
            .posts()
            .find_one(doc! { "_id": post_id }, None)
            .await?
            .ok_or(ServiceError::PostNotFound(post_id))?;

        if post.author_id != requester_id {
            return Err(ServiceError::Forbidden);
        }

        if post.content != new_content {
            let updated_at = DateTime::now();
            self.db
                .posts()
                .update_one(
                    doc! { "_id": post.id },
                    doc! { "$set": { "content": &new_content, "updated_at": updated_at } },
                    None,
                )
                .await?;
            post.content = new_content;
            post.updated_at = updated_at;
        }

        let author = self
            .db
            .users()
            .find_one(doc! { "_id": post.author_id }, None)
            .await?
            .ok_or(ServiceError::UserNotFound(post.author_id))?;

        Ok(PostView::new(&post, UserSummary::from(&author)))
    }

    /// Deleting an absent post is a success, not an error. The author-side
    /// back-reference and any comment/like records stay behind.
    pub async fn delete_post(
        &self,
        post_id: ObjectId,
        requester_id: ObjectId,
    ) -> Result<(), ServiceError> {
        let post = match self
            .db
            .posts()
            .find_one(doc! { "_id": post_id }, None)
            .await?
        {
            Some(post) => post,
            None => return Ok(()),
        };

        if post.author_id != requester_id {
            return Err(ServiceError::Forbidden);
        }

        self.db.posts().delete_one(doc! { "_id": post.id }, None).await?;
        Ok(())
    }

    pub async fn add_favorite(
        &self,
        user_id: ObjectId,
        post_id: ObjectId,
    ) -> Result<(), ServiceError> {
        if self
            .db
            .posts()
            .find_one(doc! { "_id": post_id }, None)
            .await?
            .is_none()
        {
            return Err(ServiceError::PostNotFound(post_id));
        }

        self.db
            .users()
            .update_one(
                doc! { "_id": user_id },
                doc! { "$addToSet": { "favorite_posts": post_id } },
                None,
            )
            .await?;
        Ok(())
    }

    pub async fn remove_favorite(
        &self,
        user_id: ObjectId,
        post_id: ObjectId,
    ) -> Result<(), ServiceError> {
        self.db
            .users()
            .update_one(
                doc! { "_id": user_id },
                doc! { "$pull": { "favorite_posts": post_id } },
                None,
            )
            .await?;
        Ok(())
    }

    /// Creates the like record and patches both parent documents. An
    /// existing like by the same user on the same post makes this a no-op;
    /// the return value reports whether a like was created.
    pub async fn add_like(
        &self,
        user_id: ObjectId,
        post_id: ObjectId,
    ) -> Result<bool, ServiceError> {
        if self
            .db
            .posts()
            .find_one(doc! { "_id": post_id }, None)
            .await?
            .is_none()
        {
            return Err(ServiceError::PostNotFound(post_id));
        }
        if self
            .db
            .users()
            .find_one(doc! { "_id": user_id }, None)
            .await?
            .is_none()
        {
            return Err(ServiceError::UserNotFound(user_id));
        }

        if self
            .db
            .likes()
            .find_one(doc! { "author_id": user_id, "post_id": post_id }, None)
            .await?
            .is_some()
        {
            return Ok(false);
        }

        let like = Like::new(user_id, post_id);
        self.db.likes().insert_one(&like, None).await?;
        self.db
            .posts()
            .update_one(
                doc! { "_id": post_id },
                doc! { "$addToSet": { "likes": like.id } },
                None,
            )
            .await?;
        self.db
            .users()
            .update_one(
                doc! { "_id": user_id },
                doc! { "$addToSet": { "likes": like.id } },
                None,
            )
            .await?;

        Ok(true)
    }

    /// Removing a like that was never made is a typed not-found, not a
    /// silent success.
    pub async fn remove_like(
        &self,
        user_id: ObjectId,
        post_id: ObjectId,
    ) -> Result<(), ServiceError> {
        let like = self
            .db
            .likes()
            .find_one(doc! { "author_id": user_id, "post_id": post_id }, None)
            .await?
            .ok_or(ServiceError::LikeNotFound(user_id, post_id))?;

        self.db
            .posts()
            .update_one(
                doc! { "_id": post_id },
                doc! { "$pull": { "likes": like.id } },
                None,
            )
            .await?;
        self.db
            .users()
            .update_one(
                doc! { "_id": user_id },
                doc! { "$pull": { "likes": like.id } },
                None,
            )
            .await?;
        self.db.likes().delete_one(doc! { "_id": like.id }, None).await?;

        Ok(())
    }

    /// Fan-out on read: flat-maps the denormalized reference sets of every
    /// followed user, hydrates them in one `$in` query per collection, and
    /// orders each stream chronologically. O(total items across followees).
    pub async fn newsfeed(&self, user_id: ObjectId) -> Result<Newsfeed, ServiceError> {
        let user = self
            .db
            .users()
            .find_one(doc! { "_id": user_id }, None)
            .await?
            .ok_or(ServiceError::UserNotFound(user_id))?;

        let followees = db::find_by_ids(&self.db.users(), &user.following).await?;

        let post_ids: Vec<ObjectId> = followees
            .iter()
            .flat_map(|followee| followee.posts.iter().copied())
            .collect();
        let like_ids: Vec<ObjectId> = followees
            .iter()
            .flat_map(|followee| followee.likes.iter().copied())
            .collect();
        let comment_ids: Vec<ObjectId> = followees
            .iter()
            .flat_map(|followee| followee.comments.iter().copied())
            .collect();

        let posts = db::find_by_ids(&self.db.posts(), &post_ids).await?;
        let likes = db::find_by_ids(&self.db.likes(), &like_ids).await?;
        let comments = db::find_by_ids(&self.db.comments(), &comment_ids).await?;

        let posts = chronological(posts, |post| (post.created_at, post.id));
        let likes = chronological(likes, |like| (like.created_at, like.id));
        let comments = chronological(comments, |comment| (comment.created_at, comment.id));

        Ok(Newsfeed {
            posts: posts.iter().map(Into::into).collect(),
            likes: likes.iter().map(Into::into).collect(),
            comments: comments.iter().map(Into::into).collect(),
        })
    }
}

/// Sorts ascending by creation time and collapses duplicates by id,
/// keeping the first occurrence.
fn chronological<T>(mut items: Vec<T>, key: fn(&T) -> (DateTime, ObjectId)) -> Vec<T> {
    items.sort_by_key(key);
    let mut seen = HashSet::new();
    items.retain(|item| seen.insert(key(item).1));
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_at(millis: i64) -> Post {
        let mut post = Post::new(ObjectId::new(), format!("post at {}", millis));
        post.created_at = DateTime::from_millis(millis);
        post
    }

    #[test]
    fn chronological_orders_ascending() {
        let items = vec![post_at(300), post_at(100), post_at(200)];
        let ordered = chronological(items, |post| (post.created_at, post.id));

        let times: Vec<i64> = ordered
            .iter()
            .map(|post| post.created_at.timestamp_millis())
            .collect();
        assert_eq!(times, vec![100, 200, 300]);
    }

    #[test]
    fn chronological_collapses_duplicates_by_id() {
        let first = post_at(100);
        let duplicate = first.clone();
        let second = post_at(200);

        let ordered = chronological(
            vec![first.clone(), second.clone(), duplicate],
            |post| (post.created_at, post.id),
        );

        assert_eq!(ordered.len(), 2);
        assert_eq!(ordered[0].id, first.id);
        assert_eq!(ordered[1].id, second.id);
    }

    #[test]
    fn chronological_keeps_empty_empty() {
        let ordered = chronological(Vec::<Post>::new(), |post| (post.created_at, post.id));
        assert!(ordered.is_empty());
    }
}
