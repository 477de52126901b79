use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::Json;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::app::auth::AuthService;
use crate::app::comments::CommentService;
use crate::app::posts::{Newsfeed, PostService};
use crate::app::users::UserService;
use crate::domain::engagement::CommentView;
use crate::domain::post::PostView;
use crate::domain::user::{UserPage, UserSummary};
use crate::http::auth::{access_token_cookie, clear_access_token_cookie};
use crate::http::{AppError, AuthUser};
use crate::AppState;

const MAX_PASSWORD_LEN: usize = 128;
const MAX_USERNAME_LEN: usize = 32;
const MAX_CONTENT_LEN: usize = 255;

fn parse_object_id(value: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(value).map_err(|_| AppError::bad_request("invalid id"))
}

fn validate_username(username: &str) -> Result<(), AppError> {
    if username.trim().is_empty() {
        return Err(AppError::bad_request("username is required"));
    }
    if username.len() > MAX_USERNAME_LEN {
        return Err(AppError::bad_request("username must be at most 32 characters"));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.trim().is_empty() {
        return Err(AppError::bad_request("password is required"));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::bad_request("password must be at most 128 characters"));
    }
    Ok(())
}

fn validate_content(content: &str) -> Result<(), AppError> {
    if content.trim().is_empty() {
        return Err(AppError::bad_request("content is required"));
    }
    if content.chars().count() > MAX_CONTENT_LEN {
        return Err(AppError::bad_request("content must be at most 255 characters"));
    }
    Ok(())
}

fn auth_service(state: &AppState) -> AuthService {
    AuthService::new(
        state.db.clone(),
        state.paseto_access_key,
        state.access_ttl_seconds,
        state.refresh_ttl_seconds,
    )
}

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = if state.db.ping().await.is_ok() {
        "ok"
    } else {
        "degraded"
    };
    Json(HealthResponse { status })
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct RegistrationRequest {
    pub username: String,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegistrationRequest>,
) -> Result<(StatusCode, Json<UserSummary>), AppError> {
    validate_username(&payload.username)?;
    validate_password(&payload.password)?;

    let summary = UserService::new(state.db.clone())
        .register(payload.username, payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(summary)))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AppError> {
    if payload.username.trim().is_empty() || payload.password.trim().is_empty() {
        return Err(AppError::bad_request("username and password are required"));
    }
    if payload.password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::bad_request("password must be at most 128 characters"));
    }

    let tokens = auth_service(&state)
        .login(&payload.username, &payload.password)
        .await?;

    let cookie = access_token_cookie(&tokens.access_token, state.cookie_max_age_seconds);
    let body = TokenResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    };

    Ok((AppendHeaders([(header::SET_COOKIE, cookie)]), Json(body)).into_response())
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub token: String,
}

pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    if payload.token.trim().is_empty() {
        return Err(AppError::bad_request("token is required"));
    }

    let tokens = auth_service(&state).refresh(&payload.token).await?;

    Ok(Json(TokenResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    }))
}

pub async fn logout() -> impl IntoResponse {
    (
        StatusCode::OK,
        AppendHeaders([(header::SET_COOKIE, clear_access_token_cookie())]),
        (),
    )
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

pub async fn view_user_page(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<UserPage>, AppError> {
    let user_id = parse_object_id(&user_id)?;
    let page = UserService::new(state.db.clone()).get_page(user_id).await?;
    Ok(Json(page))
}

#[derive(Deserialize)]
pub struct EditUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

pub async fn edit_user(
    Path(user_id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<EditUserRequest>,
) -> Result<Response, AppError> {
    let user_id = parse_object_id(&user_id)?;
    if !auth.is_self(user_id) {
        return Err(AppError::forbidden("access denied, insufficient permissions"));
    }

    if let Some(username) = &payload.username {
        validate_username(username)?;
    }
    if let Some(password) = &payload.password {
        validate_password(password)?;
    }

    // Nothing to change is a successful no-op.
    if payload.username.is_none() && payload.password.is_none() {
        return Ok(StatusCode::OK.into_response());
    }

    let summary = UserService::new(state.db.clone())
        .edit(user_id, payload.username, payload.password)
        .await?;

    Ok(Json(summary).into_response())
}

pub async fn delete_user(
    Path(user_id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let user_id = parse_object_id(&user_id)?;
    if !auth.is_self(user_id) {
        return Err(AppError::forbidden("access denied, insufficient permissions"));
    }

    UserService::new(state.db.clone()).delete_user(user_id).await?;
    Ok(StatusCode::OK)
}

pub async fn follow_user(
    Path(user_id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let target_id = parse_object_id(&user_id)?;
    if auth.user_id == target_id {
        return Err(AppError::bad_request(
            "user requested and user mentioned is the same",
        ));
    }

    UserService::new(state.db.clone())
        .follow(auth.user_id, target_id)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn unfollow_user(
    Path(user_id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let target_id = parse_object_id(&user_id)?;
    if auth.user_id == target_id {
        return Err(AppError::bad_request(
            "user requested and user mentioned is the same",
        ));
    }

    UserService::new(state.db.clone())
        .unfollow(auth.user_id, target_id)
        .await?;
    Ok(StatusCode::OK)
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct PostContentRequest {
    pub content: String,
}

pub async fn create_post(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<PostContentRequest>,
) -> Result<(StatusCode, Json<PostView>), AppError> {
    validate_content(&payload.content)?;

    let post = PostService::new(state.db.clone())
        .create_post(auth.user_id, payload.content)
        .await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn edit_post(
    Path(post_id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<PostContentRequest>,
) -> Result<Json<PostView>, AppError> {
    let post_id = parse_object_id(&post_id)?;
    validate_content(&payload.content)?;

    let post = PostService::new(state.db.clone())
        .edit_post(post_id, payload.content, auth.user_id)
        .await?;
    Ok(Json(post))
}

pub async fn delete_post(
    Path(post_id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let post_id = parse_object_id(&post_id)?;

    PostService::new(state.db.clone())
        .delete_post(post_id, auth.user_id)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn add_favorite(
    Path(post_id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let post_id = parse_object_id(&post_id)?;

    PostService::new(state.db.clone())
        .add_favorite(auth.user_id, post_id)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn remove_favorite(
    Path(post_id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let post_id = parse_object_id(&post_id)?;

    PostService::new(state.db.clone())
        .remove_favorite(auth.user_id, post_id)
        .await?;
    Ok(StatusCode::OK)
}

#[derive(Serialize)]
pub struct LikeResponse {
    pub liked: bool,
}

pub async fn add_like(
    Path(post_id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<LikeResponse>, AppError> {
    let post_id = parse_object_id(&post_id)?;

    let liked = PostService::new(state.db.clone())
        .add_like(auth.user_id, post_id)
        .await?;
    Ok(Json(LikeResponse { liked }))
}

pub async fn remove_like(
    Path(post_id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let post_id = parse_object_id(&post_id)?;

    PostService::new(state.db.clone())
        .remove_like(auth.user_id, post_id)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn newsfeed(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Newsfeed>, AppError> {
    let user_id = parse_object_id(&user_id)?;

    let feed = PostService::new(state.db.clone()).newsfeed(user_id).await?;
    Ok(Json(feed))
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CommentCreationRequest {
    pub content: String,
    pub post_id: String,
}

pub async fn create_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CommentCreationRequest>,
) -> Result<(StatusCode, Json<CommentView>), AppError> {
    let post_id = parse_object_id(&payload.post_id)?;
    validate_content(&payload.content)?;

    let comment = CommentService::new(state.db.clone())
        .create_comment(auth.user_id, payload.content, post_id)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn post_comments(
    Path(post_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<CommentView>>, AppError> {
    let post_id = parse_object_id(&post_id)?;

    let comments = CommentService::new(state.db.clone())
        .post_comments(post_id)
        .await?;
    Ok(Json(comments))
}
