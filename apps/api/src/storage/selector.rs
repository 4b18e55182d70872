//! Picks the storage backend for this process. `main` calls `connect` once at startup and
//! the resulting `Storage` handle lives in `AppState` until shutdown.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use tracing::info;

use super::{KvStore, MemoryStore, PgStore, RedisBlobStore, Storage};
use crate::config::Config;
use crate::db::{create_pool, ensure_schema};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Memory,
    KeyValue,
    Postgres,
}

impl StorageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKind::Memory => "memory",
            StorageKind::KeyValue => "kv",
            StorageKind::Postgres => "postgres",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(StorageKind::Memory),
            "kv" | "redis" => Ok(StorageKind::KeyValue),
            "postgres" | "pg" => Ok(StorageKind::Postgres),
            other => Err(anyhow!(
                "Unknown STORAGE_BACKEND '{other}' (expected memory, kv or postgres)"
            )),
        }
    }
}

/// Decides which backend this process uses.
///
/// 1. `STORAGE_BACKEND` wins when set.
/// 2. Hosted deployments use Postgres when `DATABASE_URL` is set, else the KV store when
///    `REDIS_URL` is set. A hosted deployment with neither is a startup error.
/// 3. Local development uses process memory.
pub fn select_kind(config: &Config) -> Result<StorageKind> {
    if let Some(kind) = config.storage_backend {
        match kind {
            StorageKind::Postgres if config.database_url.is_none() => {
                bail!("STORAGE_BACKEND=postgres requires DATABASE_URL")
            }
            StorageKind::KeyValue if config.redis_url.is_none() => {
                bail!("STORAGE_BACKEND=kv requires REDIS_URL")
            }
            _ => return Ok(kind),
        }
    }

    if !config.is_hosted() {
        return Ok(StorageKind::Memory);
    }
    if config.database_url.is_some() {
        Ok(StorageKind::Postgres)
    } else if config.redis_url.is_some() {
        Ok(StorageKind::KeyValue)
    } else {
        bail!("Hosted deployment needs DATABASE_URL or REDIS_URL; refusing to run on volatile memory")
    }
}

/// Builds the selected backend and wraps it in the shared `Storage` handle.
pub async fn connect(config: &Config) -> Result<Storage> {
    let kind = select_kind(config)?;
    info!("Storage backend: {kind}");

    let storage = match kind {
        StorageKind::Memory => Storage::new(Arc::new(MemoryStore::new()), kind),
        StorageKind::KeyValue => {
            let url = config.redis_url.as_deref().unwrap_or_default();
            let client = redis::Client::open(url).context("Invalid REDIS_URL")?;
            let blobs = RedisBlobStore::new(client);
            Storage::new(Arc::new(KvStore::new(blobs, &config.kv_prefix)), kind)
        }
        StorageKind::Postgres => {
            let url = config.database_url.as_deref().unwrap_or_default();
            let pool = create_pool(url, config.db_max_connections).await?;
            ensure_schema(&pool).await?;
            Storage::new(Arc::new(PgStore::new(pool)), kind)
        }
    };
    Ok(storage)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(
        context: Option<&str>,
        backend: Option<StorageKind>,
        database_url: Option<&str>,
        redis_url: Option<&str>,
    ) -> Config {
        Config {
            deploy_context: context.map(String::from),
            storage_backend: backend,
            database_url: database_url.map(String::from),
            redis_url: redis_url.map(String::from),
            ..Config::default()
        }
    }

    #[test]
    fn test_parse_kind_aliases() {
        assert_eq!("memory".parse::<StorageKind>().unwrap(), StorageKind::Memory);
        assert_eq!("Redis".parse::<StorageKind>().unwrap(), StorageKind::KeyValue);
        assert_eq!(" pg ".parse::<StorageKind>().unwrap(), StorageKind::Postgres);
        assert!("sqlite".parse::<StorageKind>().is_err());
    }

    #[test]
    fn test_local_defaults_to_memory_even_with_urls() {
        let cfg = config(None, None, Some("postgres://db"), Some("redis://kv"));
        assert_eq!(select_kind(&cfg).unwrap(), StorageKind::Memory);
    }

    #[test]
    fn test_hosted_prefers_postgres_then_kv() {
        let both = config(
            Some("production"),
            None,
            Some("postgres://db"),
            Some("redis://kv"),
        );
        assert_eq!(select_kind(&both).unwrap(), StorageKind::Postgres);

        let kv_only = config(Some("production"), None, None, Some("redis://kv"));
        assert_eq!(select_kind(&kv_only).unwrap(), StorageKind::KeyValue);
    }

    #[test]
    fn test_hosted_without_durable_store_is_rejected() {
        let cfg = config(Some("production"), None, None, None);
        assert!(select_kind(&cfg).is_err());
    }

    #[test]
    fn test_override_wins_but_needs_its_url() {
        let forced = config(
            Some("production"),
            Some(StorageKind::Memory),
            Some("postgres://db"),
            None,
        );
        assert_eq!(select_kind(&forced).unwrap(), StorageKind::Memory);

        let local_kv = config(None, Some(StorageKind::KeyValue), None, Some("redis://kv"));
        assert_eq!(select_kind(&local_kv).unwrap(), StorageKind::KeyValue);

        let missing = config(None, Some(StorageKind::Postgres), None, None);
        assert!(select_kind(&missing).is_err());
    }

    #[tokio::test]
    async fn test_connect_memory_backend() {
        let storage = connect(&Config::default()).await.unwrap();
        assert_eq!(storage.kind(), StorageKind::Memory);
        assert!(storage.list_applications().await.is_empty());
    }
}
