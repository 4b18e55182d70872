use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A submitted job application. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub contact_info: String,
    pub department: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub experience: String,
    pub resume_file_name: Option<String>,
    /// Base64 payload, never a data URL.
    pub resume_file_content: Option<String>,
    pub resume_file_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Listing view of an application: the résumé payload is replaced by `has_resume`.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSummary {
    pub id: i64,
    pub name: String,
    pub contact_info: String,
    pub department: String,
    pub branch: String,
    pub year: String,
    pub experience: String,
    pub resume_file_name: Option<String>,
    pub resume_file_type: Option<String>,
    pub has_resume: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Application> for ApplicationSummary {
    fn from(app: &Application) -> Self {
        ApplicationSummary {
            id: app.id,
            name: app.name.clone(),
            contact_info: app.contact_info.clone(),
            department: app.department.clone(),
            branch: app.branch.clone(),
            year: app.year.clone(),
            experience: app.experience.clone(),
            resume_file_name: app.resume_file_name.clone(),
            resume_file_type: app.resume_file_type.clone(),
            has_resume: app.has_resume(),
            created_at: app.created_at,
        }
    }
}

impl Application {
    pub fn has_resume(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        present(&self.resume_file_name) && present(&self.resume_file_content)
    }
}

/// An uploaded résumé that already passed through `codec::normalize_upload`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeUpload {
    pub file_name: String,
    pub content: String,
    pub mime_type: Option<String>,
}

/// Validated creation payload. Storage backends assign `id` and `created_at`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewApplication {
    pub name: String,
    pub contact_info: String,
    pub department: String,
    pub branch: String,
    pub year: String,
    pub experience: String,
    pub resume: Option<ResumeUpload>,
}

impl NewApplication {
    pub fn into_application(self, id: i64, created_at: DateTime<Utc>) -> Application {
        let (resume_file_name, resume_file_content, resume_file_type) = match self.resume {
            Some(r) => (Some(r.file_name), Some(r.content), r.mime_type),
            None => (None, None, None),
        };
        Application {
            id,
            name: self.name,
            contact_info: self.contact_info,
            department: self.department,
            branch: self.branch,
            year: self.year,
            experience: self.experience,
            resume_file_name,
            resume_file_content,
            resume_file_type,
            created_at,
        }
    }
}
