use mongodb::bson::oid::ObjectId;
use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

/// Persisted half of a refresh credential. Only a sha256 digest of the
/// opaque token value is stored; the value itself goes to the client once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshToken {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub token_hash: String,
    pub user_id: ObjectId,
    pub expires_at: DateTime,
    pub created_at: DateTime,
}

impl RefreshToken {
    pub fn new(user_id: ObjectId, token_hash: String, expires_at: DateTime) -> Self {
        Self {
            id: ObjectId::new(),
            token_hash,
            user_id,
            expires_at,
            created_at: DateTime::now(),
        }
    }

    pub fn is_expired(&self, now: DateTime) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_boundary_is_inclusive() {
        let expires_at = DateTime::from_millis(10_000);
        let token = RefreshToken::new(ObjectId::new(), "digest".to_string(), expires_at);

        assert!(!token.is_expired(DateTime::from_millis(9_999)));
        assert!(token.is_expired(DateTime::from_millis(10_000)));
        assert!(token.is_expired(DateTime::from_millis(10_001)));
    }
}
