//! Volatile backend for local development.
//!
//! State lives in this instance only. Nothing survives a restart, and separate processes
//! never see each other's writes.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{StorageBackend, StorageError};
use crate::codec::ResumeFile;
use crate::models::{AboutUs, Application, ApplicationSummary, NewApplication};

#[derive(Default)]
struct MemoryState {
    /// Insertion order; listings walk it backwards.
    applications: Vec<Application>,
    last_id: i64,
    about_us: Option<AboutUs>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryStore {
    async fn list_applications(&self) -> Result<Vec<ApplicationSummary>, StorageError> {
        let state = self.state.read().await;
        Ok(state
            .applications
            .iter()
            .rev()
            .map(ApplicationSummary::from)
            .collect())
    }

    async fn get_application(&self, id: i64) -> Result<Option<Application>, StorageError> {
        let state = self.state.read().await;
        Ok(state.applications.iter().find(|a| a.id == id).cloned())
    }

    async fn get_application_resume(&self, id: i64) -> Result<Option<ResumeFile>, StorageError> {
        let state = self.state.read().await;
        Ok(state
            .applications
            .iter()
            .find(|a| a.id == id)
            .and_then(|a| {
                ResumeFile::from_parts(
                    a.resume_file_name.clone(),
                    a.resume_file_content.clone(),
                    a.resume_file_type.clone(),
                )
            }))
    }

    async fn create_application(&self, new: NewApplication) -> Result<Application, StorageError> {
        let mut state = self.state.write().await;
        state.last_id += 1;
        let application = new.into_application(state.last_id, Utc::now());
        state.applications.push(application.clone());
        Ok(application)
    }

    async fn get_about_us(&self) -> Result<AboutUs, StorageError> {
        let mut state = self.state.write().await;
        Ok(state
            .about_us
            .get_or_insert_with(AboutUs::default_now)
            .clone())
    }

    async fn update_about_us(&self, content: String) -> Result<AboutUs, StorageError> {
        let mut state = self.state.write().await;
        let about_us = AboutUs::new(content, Utc::now());
        state.about_us = Some(about_us.clone());
        Ok(about_us)
    }
}
