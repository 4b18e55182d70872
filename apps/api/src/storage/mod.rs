//! Storage: one contract, three interchangeable backends.
//!
//! - `MemoryStore`: process memory, for local development. Lost on restart.
//! - `KvStore`: whole collections serialized as JSON blobs in a key-value store.
//! - `PgStore`: one row per application in Postgres.
//!
//! Handlers never see a backend directly. They go through `Storage`, which applies the
//! failure policy: reads fail open (empty list, `None`, or a regenerated default) and
//! writes fail closed (the error reaches the router and becomes a 500).

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::codec::ResumeFile;
use crate::models::{AboutUs, Application, ApplicationSummary, NewApplication};

#[cfg(test)]
pub(crate) mod contract;
pub mod kv;
pub mod memory;
pub mod postgres;
pub mod selector;

pub use kv::{KvStore, RedisBlobStore};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use selector::{connect, StorageKind};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Key-value store error: {0}")]
    KeyValue(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The persistence contract every backend implements.
///
/// Listings are newest first (ties broken by the higher id) and never carry résumé content.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn list_applications(&self) -> Result<Vec<ApplicationSummary>, StorageError>;

    async fn get_application(&self, id: i64) -> Result<Option<Application>, StorageError>;

    /// `None` when the application is unknown or has no usable résumé.
    async fn get_application_resume(&self, id: i64) -> Result<Option<ResumeFile>, StorageError>;

    /// Assigns a fresh id and `created_at`, persists, and returns the full record.
    async fn create_application(&self, new: NewApplication) -> Result<Application, StorageError>;

    /// Returns the singleton, materializing the default on first read.
    async fn get_about_us(&self) -> Result<AboutUs, StorageError>;

    /// Upserts the singleton and refreshes `updated_at`.
    async fn update_about_us(&self, content: String) -> Result<AboutUs, StorageError>;
}

/// Shared handle to the active backend, threaded through `AppState`.
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn StorageBackend>,
    kind: StorageKind,
}

impl Storage {
    pub fn new(backend: Arc<dyn StorageBackend>, kind: StorageKind) -> Self {
        Storage { backend, kind }
    }

    pub fn kind(&self) -> StorageKind {
        self.kind
    }

    pub async fn list_applications(&self) -> Vec<ApplicationSummary> {
        self.backend.list_applications().await.unwrap_or_else(|e| {
            warn!("Listing applications failed, returning empty list: {e}");
            Vec::new()
        })
    }

    pub async fn get_application(&self, id: i64) -> Option<Application> {
        self.backend.get_application(id).await.unwrap_or_else(|e| {
            warn!("Reading application {id} failed, treating as missing: {e}");
            None
        })
    }

    pub async fn get_application_resume(&self, id: i64) -> Option<ResumeFile> {
        self.backend
            .get_application_resume(id)
            .await
            .unwrap_or_else(|e| {
                warn!("Reading resume for application {id} failed, treating as missing: {e}");
                None
            })
    }

    pub async fn create_application(
        &self,
        new: NewApplication,
    ) -> Result<Application, StorageError> {
        self.backend.create_application(new).await
    }

    pub async fn get_about_us(&self) -> AboutUs {
        self.backend.get_about_us().await.unwrap_or_else(|e| {
            warn!("Reading about-us failed, serving default content: {e}");
            AboutUs::default_now()
        })
    }

    pub async fn update_about_us(&self, content: String) -> Result<AboutUs, StorageError> {
        self.backend.update_about_us(content).await
    }
}
