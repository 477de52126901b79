use anyhow::{anyhow, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::net::SocketAddr;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub http_addr: String,
    pub mongodb_uri: String,
    pub mongodb_database: String,
    pub paseto_access_key: [u8; 32],
    pub access_ttl_seconds: u64,
    pub refresh_ttl_seconds: u64,
    pub cookie_max_age_seconds: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let http_addr = env_or("HTTP_ADDR", "0.0.0.0:8080");
        let _parsed_http_addr = SocketAddr::from_str(&http_addr)
            .map_err(|err| anyhow!("invalid HTTP_ADDR: {}", err))?;

        let access_ttl_seconds: u64 = env_or_parse("ACCESS_TTL_SECONDS", "900")?;
        // The cookie carrying the access token defaults to the token's own lifetime.
        let cookie_max_age_seconds =
            env_or_parse("COOKIE_MAX_AGE_SECONDS", &access_ttl_seconds.to_string())?;

        Ok(Self {
            http_addr,
            mongodb_uri: env_or_err("MONGODB_URI")?,
            mongodb_database: env_or("MONGODB_DATABASE", "ripple"),
            paseto_access_key: env_key_32("PASETO_ACCESS_KEY")?,
            access_ttl_seconds,
            refresh_ttl_seconds: env_or_parse("REFRESH_TTL_SECONDS", "2592000")?,
            cookie_max_age_seconds,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_err(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| anyhow!("missing required env var: {}", key))
}

fn env_or_parse<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    let value = std::env::var(key).unwrap_or_else(|_| default.to_string());
    value
        .parse::<T>()
        .map_err(|err| anyhow!("invalid {}: {}", key, err))
}

fn env_key_32(key: &str) -> Result<[u8; 32]> {
    let value = env_or_err(key)?;
    let decoded = STANDARD
        .decode(value.as_bytes())
        .map_err(|err| anyhow!("invalid {}: {}", key, err))?;
    if decoded.len() != 32 {
        return Err(anyhow!("invalid {}: expected 32 bytes", key));
    }
    let mut key_bytes = [0u8; 32];
    key_bytes.copy_from_slice(&decoded);
    Ok(key_bytes)
}
