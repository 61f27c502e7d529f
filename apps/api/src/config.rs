use std::time::Duration;

use anyhow::{Context, Result};

use crate::auth::session::{
    SessionCacheConfig, DEFAULT_SESSION_CACHE_CAPACITY, DEFAULT_SESSION_TTL_SECONDS,
};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// Absent means the process keeps its data in memory.
    pub database_url: Option<String>,
    pub auth_url: String,
    pub auth_anon_key: String,
    pub port: u16,
    pub rust_log: String,
    pub cors_allow_any: bool,
    pub session_ttl_seconds: u64,
    pub session_cache_capacity: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            auth_url: require_env("AUTH_URL")?,
            auth_anon_key: require_env("AUTH_ANON_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            cors_allow_any: std::env::var("CORS_ALLOW_ANY")
                .map(|v| parse_bool(&v))
                .unwrap_or(Ok(true))
                .context("CORS_ALLOW_ANY must be true or false")?,
            session_ttl_seconds: parse_env_or("SESSION_TTL_SECONDS", DEFAULT_SESSION_TTL_SECONDS)?,
            session_cache_capacity: parse_env_or(
                "SESSION_CACHE_CAPACITY",
                DEFAULT_SESSION_CACHE_CAPACITY,
            )?,
        })
    }

    pub fn session_cache(&self) -> SessionCacheConfig {
        SessionCacheConfig {
            ttl: Duration::from_secs(self.session_ttl_seconds),
            max_capacity: self.session_cache_capacity,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env_or(key: &str, default: u64) -> Result<u64> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a non-negative integer")),
        Err(_) => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("not a boolean: '{other}'"),
    }
}
