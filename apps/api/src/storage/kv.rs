//! Key-value backend.
//!
//! The whole application collection is one JSON array stored under a single key and
//! rewritten in full on every creation. The About Us singleton lives under its own key.
//!
//! KNOWN RACE: creation is read-modify-write with no version check. Two concurrent
//! creations can read the same collection, compute the same next id, and the later write
//! replaces the earlier one (last writer wins). Closing this needs a compare-and-swap or a
//! versioned write (e.g. WATCH/MULTI); until then use `PgStore` where concurrent writers
//! are expected.

use async_trait::async_trait;
use chrono::Utc;
use redis::AsyncCommands;
use tracing::debug;

use super::{StorageBackend, StorageError};
use crate::codec::ResumeFile;
use crate::models::{AboutUs, Application, ApplicationSummary, NewApplication};

/// Minimal blob interface the KV backend needs: whole values in, whole values out.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;
}

/// `BlobStore` over Redis. A connection is acquired for each call and dropped on return.
pub struct RedisBlobStore {
    client: redis::Client,
}

impl RedisBlobStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BlobStore for RedisBlobStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }
}

pub struct KvStore<B> {
    blobs: B,
    applications_key: String,
    about_us_key: String,
}

impl<B: BlobStore> KvStore<B> {
    pub fn new(blobs: B, prefix: &str) -> Self {
        Self {
            blobs,
            applications_key: format!("{prefix}:all-applications"),
            about_us_key: format!("{prefix}:about-us"),
        }
    }

    async fn load_applications(&self) -> Result<Vec<Application>, StorageError> {
        match self.blobs.get(&self.applications_key).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    async fn find(&self, id: i64) -> Result<Option<Application>, StorageError> {
        Ok(self
            .load_applications()
            .await?
            .into_iter()
            .find(|a| a.id == id))
    }

    async fn store_about_us(&self, about_us: &AboutUs) -> Result<(), StorageError> {
        self.blobs
            .set(&self.about_us_key, serde_json::to_string(about_us)?)
            .await
    }
}

#[async_trait]
impl<B: BlobStore> StorageBackend for KvStore<B> {
    async fn list_applications(&self) -> Result<Vec<ApplicationSummary>, StorageError> {
        let mut applications = self.load_applications().await?;
        applications.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(applications.iter().map(ApplicationSummary::from).collect())
    }

    async fn get_application(&self, id: i64) -> Result<Option<Application>, StorageError> {
        self.find(id).await
    }

    async fn get_application_resume(&self, id: i64) -> Result<Option<ResumeFile>, StorageError> {
        Ok(self.find(id).await?.and_then(|a| {
            ResumeFile::from_parts(a.resume_file_name, a.resume_file_content, a.resume_file_type)
        }))
    }

    async fn create_application(&self, new: NewApplication) -> Result<Application, StorageError> {
        let mut applications = self.load_applications().await?;
        let id = applications.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        let application = new.into_application(id, Utc::now());
        applications.push(application.clone());

        self.blobs
            .set(&self.applications_key, serde_json::to_string(&applications)?)
            .await?;
        debug!("Stored application {id} ({} total)", applications.len());
        Ok(application)
    }

    async fn get_about_us(&self) -> Result<AboutUs, StorageError> {
        if let Some(raw) = self.blobs.get(&self.about_us_key).await? {
            return Ok(serde_json::from_str(&raw)?);
        }
        let about_us = AboutUs::default_now();
        self.store_about_us(&about_us).await?;
        Ok(about_us)
    }

    async fn update_about_us(&self, content: String) -> Result<AboutUs, StorageError> {
        let about_us = AboutUs::new(content, Utc::now());
        self.store_about_us(&about_us).await?;
        Ok(about_us)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tokio::sync::Mutex;

    use super::*;
    use crate::storage::contract;

    #[derive(Default)]
    struct MapBlobStore {
        values: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl BlobStore for MapBlobStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            Ok(self.values.lock().await.get(key).cloned())
        }

        async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
            self.values.lock().await.insert(key.to_string(), value);
            Ok(())
        }
    }

    fn store() -> KvStore<MapBlobStore> {
        KvStore::new(MapBlobStore::default(), "test")
    }

    #[tokio::test]
    async fn test_ids_are_sequential_and_listed_newest_first() {
        contract::ids_increase_and_listing_is_newest_first(&store()).await;
    }

    #[tokio::test]
    async fn test_resume_lookup() {
        contract::resume_only_when_uploaded(&store()).await;
    }

    #[tokio::test]
    async fn test_unknown_application() {
        contract::unknown_ids_are_missing(&store()).await;
    }

    #[tokio::test]
    async fn test_about_us_lifecycle() {
        contract::about_us_default_then_update(&store()).await;
    }

    #[tokio::test]
    async fn test_collection_is_one_blob_under_prefixed_key() {
        let store = store();
        store
            .create_application(contract::new_application("Ada", None))
            .await
            .unwrap();
        store
            .create_application(contract::new_application("Grace", None))
            .await
            .unwrap();

        let values = store.blobs.values.lock().await;
        let raw = values.get("test:all-applications").expect("collection blob");
        let stored: Vec<Application> = serde_json::from_str(raw).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].name, "Ada");
    }

    #[tokio::test]
    async fn test_next_id_follows_existing_maximum() {
        let store = store();
        let seeded = contract::new_application("Seeded", None).into_application(41, Utc::now());
        store
            .blobs
            .set(
                "test:all-applications",
                serde_json::to_string(&vec![seeded]).unwrap(),
            )
            .await
            .unwrap();

        let created = store
            .create_application(contract::new_application("Ada", None))
            .await
            .unwrap();
        assert_eq!(created.id, 42);
    }

    #[tokio::test]
    async fn test_corrupt_collection_is_an_error() {
        let store = store();
        store
            .blobs
            .set("test:all-applications", "{not json".to_string())
            .await
            .unwrap();
        assert!(matches!(
            store.list_applications().await,
            Err(StorageError::Serialization(_))
        ));
    }
}
