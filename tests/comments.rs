//! Comment creation and per-post listing tests.

mod common;

use axum::http::StatusCode;
use common::app;
use mongodb::bson::oid::ObjectId;
use serde_json::json;

#[tokio::test]
async fn create_comment_links_user_and_post() {
    let Some(app) = app().await else { return };
    let author = app.create_user("cmt_author").await;
    let commenter = app.create_user("cmt_commenter").await;
    let post_id = app.create_post(&author, "discuss").await;

    let resp = app
        .post_json(
            "/comment/create",
            json!({ "content": "first!", "post_id": post_id }),
            Some(&commenter.access_token),
        )
        .await;

    assert_eq!(resp.status, StatusCode::CREATED);
    let body = resp.json();
    assert_eq!(body["content"].as_str().unwrap(), "first!");
    assert_eq!(body["author_id"].as_str().unwrap(), commenter.id);
    assert_eq!(body["post_id"].as_str().unwrap(), post_id);

    let listing = app
        .post(&format!("/comment/postComments/{}", post_id), None)
        .await;
    assert_eq!(listing.status, StatusCode::OK);
    assert_eq!(listing.json().as_array().unwrap().len(), 1);

    let page = app.get(&format!("/user/page/{}", commenter.id), None).await;
    assert_eq!(page.json()["comments"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn create_comment_on_unknown_post() {
    let Some(app) = app().await else { return };
    let user = app.create_user("cmt_ghost_post").await;

    let resp = app
        .post_json(
            "/comment/create",
            json!({ "content": "hello?", "post_id": ObjectId::new().to_hex() }),
            Some(&user.access_token),
        )
        .await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_comment_requires_auth() {
    let Some(app) = app().await else { return };
    let author = app.create_user("cmt_auth_author").await;
    let post_id = app.create_post(&author, "members only").await;

    let resp = app
        .post_json(
            "/comment/create",
            json!({ "content": "drive-by", "post_id": post_id }),
            None,
        )
        .await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_comment_content_bounds() {
    let Some(app) = app().await else { return };
    let user = app.create_user("cmt_bounds").await;
    let post_id = app.create_post(&user, "measured response").await;

    let resp = app
        .post_json(
            "/comment/create",
            json!({ "content": "x".repeat(256), "post_id": post_id }),
            Some(&user.access_token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = app
        .post_json(
            "/comment/create",
            json!({ "content": "", "post_id": post_id }),
            Some(&user.access_token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn post_comments_sorted_by_creation() {
    let Some(app) = app().await else { return };
    let user = app.create_user("cmt_sorted").await;
    let post_id = app.create_post(&user, "thread").await;

    for content in ["one", "two", "three"] {
        let resp = app
            .post_json(
                "/comment/create",
                json!({ "content": content, "post_id": post_id }),
                Some(&user.access_token),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED);
    }

    let resp = app
        .post(&format!("/comment/postComments/{}", post_id), None)
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    let contents: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|comment| comment["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["one", "two", "three"]);
}

#[tokio::test]
async fn post_comments_unknown_post() {
    let Some(app) = app().await else { return };

    let resp = app
        .post(
            &format!("/comment/postComments/{}", ObjectId::new().to_hex()),
            None,
        )
        .await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}
