use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};

use crate::app::error::ServiceError;
use crate::infra::db::Db;

/// Role assignment over the many-to-many authority collection.
#[derive(Clone)]
pub struct AuthorityService {
    db: Db,
}

impl AuthorityService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Adds the user to the named role, creating the authority document on
    /// first use. Returns the authority id so callers can maintain the
    /// user-side back-reference.
    pub async fn grant(&self, role: &str, user_id: ObjectId) -> Result<ObjectId, ServiceError> {
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        let authority = self
            .db
            .authorities()
            .find_one_and_update(
                doc! { "role": role },
                doc! { "$addToSet": { "users": user_id } },
                options,
            )
            .await?
            .ok_or_else(|| ServiceError::Internal(format!("failed to upsert role {}", role)))?;

        Ok(authority.id)
    }

    pub async fn roles_for_user(&self, user_id: ObjectId) -> Result<Vec<String>, ServiceError> {
        let authorities: Vec<_> = self
            .db
            .authorities()
            .find(doc! { "users": user_id }, None)
            .await?
            .try_collect()
            .await?;

        Ok(authorities
            .into_iter()
            .map(|authority| authority.role)
            .collect())
    }
}
