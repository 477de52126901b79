use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use mongodb::bson::oid::ObjectId;

use crate::app::auth::AuthService;
use crate::http::AppError;
use crate::AppState;

/// Name of the cookie carrying the access token. Identity is read from
/// this cookie only; there is no Authorization header path.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Authenticated principal: a plain value with an id and a role set.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: ObjectId,
    pub roles: Vec<String>,
}

impl AuthUser {
    /// Gate for self-only routes: true iff the authenticated identity
    /// matches the path-specified user id.
    pub fn is_self(&self, user_id: ObjectId) -> bool {
        self.user_id == user_id
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = cookie_value(parts, ACCESS_TOKEN_COOKIE)
            .ok_or_else(|| AppError::unauthorized("missing access token cookie"))?;

        let service = AuthService::new(
            state.db.clone(),
            state.paseto_access_key,
            state.access_ttl_seconds,
            state.refresh_ttl_seconds,
        );
        let principal = service
            .authenticate_access_token(&token)
            .ok_or_else(|| AppError::unauthorized("invalid access token"))?;

        Ok(AuthUser {
            user_id: principal.user_id,
            roles: principal.roles,
        })
    }
}

fn cookie_value(parts: &Parts, name: &str) -> Option<String> {
    let header = parts
        .headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())?;

    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

/// `Set-Cookie` value installing the access token: HttpOnly, whole-site
/// path, not Secure, bounded by the configured max-age.
pub fn access_token_cookie(token: &str, max_age_seconds: u64) -> String {
    format!(
        "{}={}; HttpOnly; Path=/; Max-Age={}",
        ACCESS_TOKEN_COOKIE, token, max_age_seconds
    )
}

/// `Set-Cookie` value that overwrites the access token cookie on logout.
pub fn clear_access_token_cookie() -> String {
    format!("{}=; HttpOnly; Path=/; Max-Age=0", ACCESS_TOKEN_COOKIE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_cookie(value: &str) -> Parts {
        let request = Request::builder()
            .header(header::COOKIE, value)
            .body(())
            .unwrap();
        request.into_parts().0
    }

    #[test]
    fn cookie_value_finds_named_cookie() {
        let parts = parts_with_cookie("theme=dark; accessToken=v4.local.abc; lang=en");
        assert_eq!(
            cookie_value(&parts, ACCESS_TOKEN_COOKIE).as_deref(),
            Some("v4.local.abc")
        );
    }

    #[test]
    fn cookie_value_missing_cookie() {
        let parts = parts_with_cookie("theme=dark; lang=en");
        assert!(cookie_value(&parts, ACCESS_TOKEN_COOKIE).is_none());

        let request = Request::builder().body(()).unwrap();
        let (parts, _) = request.into_parts();
        assert!(cookie_value(&parts, ACCESS_TOKEN_COOKIE).is_none());
    }

    #[test]
    fn cookie_value_does_not_match_prefixes() {
        let parts = parts_with_cookie("accessTokenOld=stale");
        assert!(cookie_value(&parts, ACCESS_TOKEN_COOKIE).is_none());
    }

    #[test]
    fn set_cookie_attributes() {
        let cookie = access_token_cookie("tok", 900);
        assert_eq!(cookie, "accessToken=tok; HttpOnly; Path=/; Max-Age=900");
        assert_eq!(
            clear_access_token_cookie(),
            "accessToken=; HttpOnly; Path=/; Max-Age=0"
        );
    }

    #[test]
    fn is_self_matches_only_same_id() {
        let id = ObjectId::new();
        let auth = AuthUser {
            user_id: id,
            roles: vec![],
        };
        assert!(auth.is_self(id));
        assert!(!auth.is_self(ObjectId::new()));
    }
}
