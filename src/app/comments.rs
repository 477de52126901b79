use mongodb::bson::{doc, oid::ObjectId};

use crate::app::error::ServiceError;
use crate::domain::engagement::{Comment, CommentView};
use crate::infra::db::{self, Db};

#[derive(Clone)]
pub struct CommentService {
    db: Db,
}

impl CommentService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Inserts the comment, then links it into both the author's and the
    /// post's comment sets. Three writes, no transaction.
    pub async fn create_comment(
        &self,
        user_id: ObjectId,
        content: String,
        post_id: ObjectId,
    ) -> Result<CommentView, ServiceError> {
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
            .posts()
            .find_one(doc! { "_id": post_id }, None)
            .await?
            .is_none()
        {
            return Err(ServiceError::PostNotFound(post_id));
        }

        let comment = Comment::new(user_id, post_id, content);
        self.db.comments().insert_one(&comment, None).await?;

        self.db
            .users()
            .update_one(
                doc! { "_id": user_id },
                doc! { "$addToSet": { "comments": comment.id } },
                None,
            )
            .await?;
        self.db
            .posts()
            .update_one(
                doc! { "_id": post_id },
                doc! { "$addToSet": { "comments": comment.id } },
                None,
            )
            .await?;

        Ok(CommentView::from(&comment))
    }

    /// Comments of a single post, hydrated from the post's denormalized
    /// comment set, oldest first.
    pub async fn post_comments(
        &self,
        post_id: ObjectId,
    ) -> Result<Vec<CommentView>, ServiceError> {
        let post = self
            .db
            .posts()
            .find_one(doc! { "_id": post_id }, None)
            .await?
            .ok_or(ServiceError::PostNotFound(post_id))?;

        let mut comments = db::find_by_ids(&self.db.comments(), &post.comments).await?;
        comments.sort_by_key(|comment| (comment.created_at, comment.id));

        Ok(comments.iter().map(Into::into).collect())
    }
}
