use mongodb::bson::oid::ObjectId;
use thiserror::Error;

/// Failure taxonomy shared by every service. The HTTP layer owns the
/// translation to status codes.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("user with id \"{0}\" doesn't exist")]
    UserNotFound(ObjectId),
    #[error("post with id \"{0}\" doesn't exist")]
    PostNotFound(ObjectId),
    #[error("user \"{0}\" has no like on post \"{1}\"")]
    LikeNotFound(ObjectId, ObjectId),
    #[error("user with username \"{0}\" already exists")]
    DuplicateUsername(String),
    #[error("access denied, insufficient permissions")]
    Forbidden,
    #[error("invalid user credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Storage(#[from] mongodb::error::Error),
    #[error("internal error: {0}")]
    Internal(String),
}
