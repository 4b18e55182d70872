use std::fmt;

use anyhow::{Context, Result};

use crate::storage::StorageKind;

/// Application configuration loaded from environment variables.
/// Only the listen port and tuning knobs have defaults; which storage URLs are
/// required depends on the selected backend (see `storage::selector`).
#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Deployment-context signal. Unset, empty, `local` or `dev` means local development.
    pub deploy_context: Option<String>,
    /// Explicit backend override, bypasses the deployment-context decision.
    pub storage_backend: Option<StorageKind>,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub kv_prefix: String,
    pub db_max_connections: u32,
    pub max_body_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            deploy_context: optional_env("DEPLOY_CONTEXT"),
            storage_backend: optional_env("STORAGE_BACKEND")
                .map(|v| v.parse::<StorageKind>())
                .transpose()?,
            database_url: optional_env("DATABASE_URL"),
            redis_url: optional_env("REDIS_URL"),
            kv_prefix: optional_env("KV_PREFIX").unwrap_or_else(|| "careers".to_string()),
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", 5)
                .context("DB_MAX_CONNECTIONS must be a positive integer")?,
            max_body_bytes: parse_env("MAX_BODY_BYTES", 10 * 1024 * 1024)
                .context("MAX_BODY_BYTES must be a byte count")?,
        })
    }

    /// True when running inside the hosted platform rather than on a developer machine.
    pub fn is_hosted(&self) -> bool {
        match self.deploy_context.as_deref().map(str::trim) {
            None | Some("") => false,
            Some(ctx) => !ctx.eq_ignore_ascii_case("local") && !ctx.eq_ignore_ascii_case("dev"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            deploy_context: None,
            storage_backend: None,
            database_url: None,
            redis_url: None,
            kv_prefix: "careers".to_string(),
            db_max_connections: 5,
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

// Connection strings carry credentials; keep them out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("rust_log", &self.rust_log)
            .field("deploy_context", &self.deploy_context)
            .field("storage_backend", &self.storage_backend)
            .field("database_url", &redact(&self.database_url))
            .field("redis_url", &redact(&self.redis_url))
            .field("kv_prefix", &self.kv_prefix)
            .field("db_max_connections", &self.db_max_connections)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Invalid value for environment variable '{key}': {raw}")),
        None => Ok(default),
    }
}
