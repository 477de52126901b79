pub mod app;
pub mod config;
pub mod domain;
pub mod http;
pub mod infra;

use crate::infra::db::Db;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub paseto_access_key: [u8; 32],
    pub access_ttl_seconds: u64,
    pub refresh_ttl_seconds: u64,
    pub cookie_max_age_seconds: u64,
}
