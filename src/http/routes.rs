use axum::{routing::delete, routing::get, routing::post, Router};

use crate::http::handlers;
use crate::AppState;

pub fn health() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health))
}

pub fn auth() -> Router<AppState> {
    Router::new()
        .route("/user/registration", post(handlers::register))
        .route("/user/login", post(handlers::login))
        .route("/user/refreshToken", post(handlers::refresh_token))
        .route("/user/logout", post(handlers::logout))
}

pub fn users() -> Router<AppState> {
    Router::new()
        .route("/user/page/:user_id", get(handlers::view_user_page))
        .route("/user/edit/:user_id", post(handlers::edit_user))
        .route("/user/delete/:user_id", delete(handlers::delete_user))
        .route("/user/follow/:user_id", post(handlers::follow_user))
        .route("/user/unfollow/:user_id", delete(handlers::unfollow_user))
}

pub fn posts() -> Router<AppState> {
    Router::new()
        .route("/post/create", post(handlers::create_post))
        .route("/post/edit/:post_id", post(handlers::edit_post))
        .route("/post/delete/:post_id", delete(handlers::delete_post))
        .route("/post/favorite/add/:post_id", post(handlers::add_favorite))
        .route(
            "/post/favorite/remove/:post_id",
            delete(handlers::remove_favorite),
        )
        .route("/post/like/add/:post_id", post(handlers::add_like))
        .route("/post/like/remove/:post_id", delete(handlers::remove_like))
        .route("/post/newsfeed/:user_id", get(handlers::newsfeed))
}

pub fn comments() -> Router<AppState> {
    Router::new()
        .route("/comment/create", post(handlers::create_comment))
        .route("/comment/postComments/:post_id", post(handlers::post_comments))
}
