//! Behaviour every `StorageBackend` must share. Each backend's test module runs these
//! against a fresh instance.

use std::time::Duration;

use async_trait::async_trait;

use super::{StorageBackend, StorageError};
use crate::codec::{self, ResumeFile};
use crate::models::about_us::DEFAULT_ABOUT_US_CONTENT;
use crate::models::{AboutUs, Application, ApplicationSummary, NewApplication, ResumeUpload};

/// Backend whose every call fails, as if the database were unreachable.
pub struct UnreachableBackend;

fn unreachable() -> StorageError {
    StorageError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl StorageBackend for UnreachableBackend {
    async fn list_applications(&self) -> Result<Vec<ApplicationSummary>, StorageError> {
        Err(unreachable())
    }

    async fn get_application(&self, _id: i64) -> Result<Option<Application>, StorageError> {
        Err(unreachable())
    }

    async fn get_application_resume(&self, _id: i64) -> Result<Option<ResumeFile>, StorageError> {
        Err(unreachable())
    }

    async fn create_application(&self, _new: NewApplication) -> Result<Application, StorageError> {
        Err(unreachable())
    }

    async fn get_about_us(&self) -> Result<AboutUs, StorageError> {
        Err(unreachable())
    }

    async fn update_about_us(&self, _content: String) -> Result<AboutUs, StorageError> {
        Err(unreachable())
    }
}

pub fn new_application(name: &str, resume: Option<ResumeUpload>) -> NewApplication {
    NewApplication {
        name: name.to_string(),
        department: "Engineering".to_string(),
        branch: "Avionics".to_string(),
        year: "3".to_string(),
        resume,
        ..NewApplication::default()
    }
}

pub fn pdf_upload(bytes: &[u8]) -> ResumeUpload {
    ResumeUpload {
        file_name: "cv.pdf".to_string(),
        content: codec::encode(bytes),
        mime_type: Some("application/pdf".to_string()),
    }
}

pub async fn ids_increase_and_listing_is_newest_first(backend: &dyn StorageBackend) {
    let first = backend
        .create_application(new_application("Ada Lovelace", None))
        .await
        .unwrap();
    assert_eq!(first.id, 1);
    assert_eq!(first.contact_info, "");
    assert_eq!(first.experience, "");
    assert!(first.resume_file_name.is_none());

    let second = backend
        .create_application(new_application("Grace Hopper", Some(pdf_upload(b"%PDF"))))
        .await
        .unwrap();
    let third = backend
        .create_application(new_application("Katherine Johnson", None))
        .await
        .unwrap();
    assert!(second.id > first.id);
    assert!(third.id > second.id);

    let listed = backend.list_applications().await.unwrap();
    let ids: Vec<i64> = listed.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![third.id, second.id, first.id]);
    assert!(listed[1].has_resume);
    assert!(!listed[0].has_resume);

    let stored = backend.get_application(second.id).await.unwrap().unwrap();
    assert_eq!(stored, second);
    assert_eq!(stored.created_at, second.created_at);
}

pub async fn resume_only_when_uploaded(backend: &dyn StorageBackend) {
    let bytes = b"%PDF-1.4\n\x00\xff binary body";
    let with = backend
        .create_application(new_application("Ada", Some(pdf_upload(bytes))))
        .await
        .unwrap();
    let without = backend
        .create_application(new_application("Grace", None))
        .await
        .unwrap();

    let resume = backend
        .get_application_resume(with.id)
        .await
        .unwrap()
        .expect("resume should be present");
    assert_eq!(resume.file_name, "cv.pdf");
    assert_eq!(resume.mime_type.as_deref(), Some("application/pdf"));
    assert_eq!(codec::decode(&resume.content).unwrap(), bytes.to_vec());

    assert!(backend
        .get_application_resume(without.id)
        .await
        .unwrap()
        .is_none());
}

pub async fn unknown_ids_are_missing(backend: &dyn StorageBackend) {
    assert!(backend.get_application(999).await.unwrap().is_none());
    assert!(backend.get_application_resume(999).await.unwrap().is_none());
}

pub async fn about_us_default_then_update(backend: &dyn StorageBackend) {
    let first = backend.get_about_us().await.unwrap();
    assert_eq!(first.id, "about-us");
    assert_eq!(first.content, DEFAULT_ABOUT_US_CONTENT);
    let again = backend.get_about_us().await.unwrap();
    assert_eq!(first, again);

    tokio::time::sleep(Duration::from_millis(5)).await;
    let updated = backend.update_about_us("Hello".to_string()).await.unwrap();
    assert_eq!(updated.content, "Hello");
    assert!(updated.updated_at > first.updated_at);

    let read_back = backend.get_about_us().await.unwrap();
    assert_eq!(read_back, updated);
}
