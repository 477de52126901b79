use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, DateTime};
use pasetors::claims::{Claims, ClaimsValidationRules};
use pasetors::keys::SymmetricKey;
use pasetors::token::UntrustedToken;
use pasetors::{local, version4::V4, Local};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::app::authorities::AuthorityService;
use crate::app::error::ServiceError;
use crate::domain::token::RefreshToken;
use crate::infra::db::Db;

const TOKEN_ISSUER: &str = "ripple";

/// Authenticated identity decoded from an access token: a plain value with
/// an id and a role set, nothing framework-specific.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: ObjectId,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct AuthService {
    db: Db,
    access_key: [u8; 32],
    access_ttl_seconds: u64,
    refresh_ttl_seconds: u64,
}

impl AuthService {
    pub fn new(
        db: Db,
        access_key: [u8; 32],
        access_ttl_seconds: u64,
        refresh_ttl_seconds: u64,
    ) -> Self {
        Self {
            db,
            access_key,
            access_ttl_seconds,
            refresh_ttl_seconds,
        }
    }

    /// Verifies username/password and issues a fresh token pair. The opaque
    /// refresh token is persisted by digest only. Previously issued refresh
    /// tokens stay valid; sessions are independent.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, ServiceError> {
        let user = self
            .db
            .users()
            .find_one(doc! { "username": username }, None)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(ServiceError::InvalidCredentials);
        }

        let roles = AuthorityService::new(self.db.clone())
            .roles_for_user(user.id)
            .await?;
        let access_token = self.issue_access_token(user.id, &roles)?;
        let refresh_token = self.issue_refresh_token(user.id).await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Exchanges a refresh token for a new access token. The refresh token
    /// itself is returned unchanged; reissue does not revoke other sessions.
    /// Expired tokens are deleted when detected.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ServiceError> {
        let token_hash = hash_token(refresh_token);
        let stored = self
            .db
            .refresh_tokens()
            .find_one(doc! { "token_hash": &token_hash }, None)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        if stored.is_expired(DateTime::now()) {
            self.db
                .refresh_tokens()
                .delete_one(doc! { "_id": stored.id }, None)
                .await?;
            self.db
                .users()
                .update_one(
                    doc! { "_id": stored.user_id },
                    doc! { "$pull": { "refresh_tokens": stored.id } },
                    None,
                )
                .await?;
            return Err(ServiceError::InvalidCredentials);
        }

        let roles = AuthorityService::new(self.db.clone())
            .roles_for_user(stored.user_id)
            .await?;
        let access_token = self.issue_access_token(stored.user_id, &roles)?;

        Ok(TokenPair {
            access_token,
            refresh_token: refresh_token.to_string(),
        })
    }

    /// Decodes and validates an access token. Malformed, forged and expired
    /// tokens all come back as `None`; the request then proceeds (or fails)
    /// as unauthenticated.
    pub fn authenticate_access_token(&self, token: &str) -> Option<Principal> {
        let key = SymmetricKey::<V4>::from(&self.access_key).ok()?;
        let mut rules = ClaimsValidationRules::new();
        rules.validate_issuer_with(TOKEN_ISSUER);
        rules.validate_audience_with(TOKEN_ISSUER);

        let untrusted = UntrustedToken::<Local, V4>::try_from(token).ok()?;
        let trusted = local::decrypt(&key, &untrusted, &rules, None, None).ok()?;
        let claims = trusted.payload_claims()?;

        let user_id = claims
            .get_claim("sub")
            .and_then(|value| value.as_str())
            .and_then(|value| ObjectId::parse_str(value).ok())?;
        let roles = claims
            .get_claim("roles")
            .and_then(|value| value.as_str())
            .map(|value| {
                value
                    .split(',')
                    .filter(|role| !role.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Some(Principal { user_id, roles })
    }

    pub fn issue_access_token(
        &self,
        user_id: ObjectId,
        roles: &[String],
    ) -> Result<String, ServiceError> {
        let duration = std::time::Duration::from_secs(self.access_ttl_seconds);
        let mut claims = Claims::new_expires_in(&duration).map_err(token_error)?;
        claims.issuer(TOKEN_ISSUER).map_err(token_error)?;
        claims.audience(TOKEN_ISSUER).map_err(token_error)?;
        claims.subject(&user_id.to_hex()).map_err(token_error)?;
        claims
            .add_additional("roles", roles.join(","))
            .map_err(token_error)?;

        let key = SymmetricKey::<V4>::from(&self.access_key).map_err(token_error)?;
        local::encrypt(&key, &claims, None, None).map_err(token_error)
    }

    async fn issue_refresh_token(&self, user_id: ObjectId) -> Result<String, ServiceError> {
        let token_value = Uuid::new_v4().to_string();
        let expires_at = DateTime::from_millis(
            DateTime::now().timestamp_millis() + (self.refresh_ttl_seconds as i64) * 1000,
        );
        let record = RefreshToken::new(user_id, hash_token(&token_value), expires_at);

        self.db.refresh_tokens().insert_one(&record, None).await?;
        self.db
            .users()
            .update_one(
                doc! { "_id": user_id },
                doc! { "$addToSet": { "refresh_tokens": record.id } },
                None,
            )
            .await?;

        Ok(token_value)
    }
}

pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| ServiceError::Internal(format!("failed to hash password: {}", err)))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, ServiceError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|err| ServiceError::Internal(format!("failed to parse password hash: {}", err)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

fn token_error(err: pasetors::errors::Error) -> ServiceError {
    ServiceError::Internal(format!("token error: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::options::ClientOptions;
    use mongodb::Client;

    const KEY_A: [u8; 32] = *b"0123456789abcdef0123456789abcdef";
    const KEY_B: [u8; 32] = *b"fedcba9876543210fedcba9876543210";

    // No I/O happens until a query runs, so a default client is enough for
    // the token paths.
    fn service(key: [u8; 32], access_ttl_seconds: u64) -> AuthService {
        let client = Client::with_options(ClientOptions::default()).unwrap();
        let db = Db::from_database(client.database("ripple_unit"));
        AuthService::new(db, key, access_ttl_seconds, 3600)
    }

    #[tokio::test]
    async fn access_token_round_trip() {
        let service = service(KEY_A, 900);
        let user_id = ObjectId::new();
        let roles = vec!["ROLE_USER".to_string()];

        let token = service.issue_access_token(user_id, &roles).unwrap();
        let principal = service.authenticate_access_token(&token).unwrap();

        assert_eq!(principal.user_id, user_id);
        assert_eq!(principal.roles, roles);
    }

    #[tokio::test]
    async fn expired_token_rejected() {
        let service = service(KEY_A, 0);
        let token = service
            .issue_access_token(ObjectId::new(), &[])
            .unwrap();

        std::thread::sleep(std::time::Duration::from_millis(1100));
        assert!(service.authenticate_access_token(&token).is_none());
    }

    #[tokio::test]
    async fn malformed_token_rejected() {
        let service = service(KEY_A, 900);
        assert!(service.authenticate_access_token("not-a-token").is_none());
        assert!(service.authenticate_access_token("").is_none());
    }

    #[tokio::test]
    async fn token_from_other_key_rejected() {
        let issuer = service(KEY_A, 900);
        let verifier = service(KEY_B, 900);

        let token = issuer.issue_access_token(ObjectId::new(), &[]).unwrap();
        assert!(verifier.authenticate_access_token(&token).is_none());
    }

    #[tokio::test]
    async fn token_without_roles_claim_yields_empty_role_set() {
        let service = service(KEY_A, 900);
        let token = service.issue_access_token(ObjectId::new(), &[]).unwrap();
        let principal = service.authenticate_access_token(&token).unwrap();
        assert!(principal.roles.is_empty());
    }

    #[test]
    fn password_hash_and_verify() {
        let hash = hash_password("hunter2-but-longer").unwrap();
        assert!(verify_password("hunter2-but-longer", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn token_digest_is_stable_and_hex() {
        let digest = hash_token("some-opaque-value");
        assert_eq!(digest, hash_token("some-opaque-value"));
        assert_eq!(digest.len(), 64);
        assert_ne!(digest, hash_token("other-value"));
    }
}
