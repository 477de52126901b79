#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use mongodb::bson::oid::ObjectId;
use mongodb::Client;
use serde_json::{json, Value};
use tokio::sync::OnceCell;
use tower::ServiceExt;

use ripple::infra::db::Db;
use ripple::AppState;

// 32 bytes; test-only key, never used in production.
const TEST_PASETO_ACCESS_KEY: [u8; 32] = *b"0123456789abcdef0123456789abcdef";
pub const DEFAULT_PASSWORD: &str = "testpassword123";

pub struct TestApp {
    router: Router,
    pub state: AppState,
}

pub struct TestResponse {
    pub status: StatusCode,
    body_bytes: bytes::Bytes,
    pub set_cookie: Option<String>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body_bytes).unwrap_or(Value::Null)
    }

    pub fn error_message(&self) -> String {
        self.json()["message"].as_str().unwrap_or("").to_string()
    }
}

pub struct TestUser {
    pub id: String,
    pub username: String,
    pub access_token: String,
    pub refresh_token: String,
}

static TEST_APP: OnceCell<Option<TestApp>> = OnceCell::const_new();

/// Get (or lazily create) the shared TestApp. Returns `None` — and the
/// calling test exits early — when TEST_MONGODB_URI is not set.
pub async fn app() -> Option<&'static TestApp> {
    TEST_APP
        .get_or_init(|| async { TestApp::setup().await })
        .await
        .as_ref()
}

impl TestApp {
    async fn setup() -> Option<Self> {
        let uri = match std::env::var("TEST_MONGODB_URI") {
            Ok(uri) => uri,
            Err(_) => {
                eprintln!("TEST_MONGODB_URI not set; skipping integration tests");
                return None;
            }
        };

        let client = Client::with_uri_str(&uri)
            .await
            .expect("cannot connect to mongodb");

        // Fresh database per test binary so runs never interfere.
        let database_name = format!("ripple_test_{}", ObjectId::new().to_hex());
        let db = Db::from_database(client.database(&database_name));
        db.ensure_indexes().await.expect("failed to create indexes");

        let state = AppState {
            db,
            paseto_access_key: TEST_PASETO_ACCESS_KEY,
            access_ttl_seconds: 900,
            refresh_ttl_seconds: 3600,
            cookie_max_age_seconds: 900,
        };

        let router = ripple::http::router(state.clone());

        Some(Self { router, state })
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        access_token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);

        if let Some(token) = access_token {
            builder = builder.header(header::COOKIE, format!("accessToken={}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");

        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body_bytes = http_body_util::BodyExt::collect(response.into_body())
            .await
            .expect("failed to read body")
            .to_bytes();

        TestResponse {
            status,
            body_bytes,
            set_cookie,
        }
    }

    pub async fn post_json(
        &self,
        path: &str,
        body: Value,
        access_token: Option<&str>,
    ) -> TestResponse {
        self.request(Method::POST, path, Some(body), access_token)
            .await
    }

    pub async fn post(&self, path: &str, access_token: Option<&str>) -> TestResponse {
        self.request(Method::POST, path, None, access_token).await
    }

    pub async fn get(&self, path: &str, access_token: Option<&str>) -> TestResponse {
        self.request(Method::GET, path, None, access_token).await
    }

    pub async fn delete(&self, path: &str, access_token: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, path, None, access_token).await
    }

    /// Registers and logs in a fresh user.
    pub async fn create_user(&self, username: &str) -> TestUser {
        let resp = self
            .post_json(
                "/user/registration",
                json!({ "username": username, "password": DEFAULT_PASSWORD }),
                None,
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "registration failed");
        let id = resp.json()["id"].as_str().expect("missing id").to_string();

        let resp = self
            .post_json(
                "/user/login",
                json!({ "username": username, "password": DEFAULT_PASSWORD }),
                None,
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK, "login failed");
        let body = resp.json();

        TestUser {
            id,
            username: username.to_string(),
            access_token: body["accessToken"].as_str().unwrap().to_string(),
            refresh_token: body["refreshToken"].as_str().unwrap().to_string(),
        }
    }

    /// Creates a post and returns its id.
    pub async fn create_post(&self, user: &TestUser, content: &str) -> String {
        let resp = self
            .post_json(
                "/post/create",
                json!({ "content": content }),
                Some(&user.access_token),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "post creation failed");
        resp.json()["id"].as_str().expect("missing post id").to_string()
    }
}
