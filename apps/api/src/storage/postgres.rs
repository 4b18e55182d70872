//! Relational backend. Ids come from the `BIGSERIAL` sequence via `INSERT ... RETURNING`,
//! so concurrent creations never collide. Every query checks a connection out of the pool
//! and hands it back when the query future completes or is dropped.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use super::{StorageBackend, StorageError};
use crate::codec::ResumeFile;
use crate::models::about_us::{ABOUT_US_ID, DEFAULT_ABOUT_US_CONTENT};
use crate::models::{AboutUs, Application, ApplicationSummary, NewApplication};

const SELECT_ABOUT_US: &str = "SELECT id, content, updated_at FROM about_us WHERE id = $1";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_about_us(&self) -> Result<Option<AboutUs>, StorageError> {
        Ok(sqlx::query_as::<_, AboutUs>(SELECT_ABOUT_US)
            .bind(ABOUT_US_ID)
            .fetch_optional(&self.pool)
            .await?)
    }
}

#[async_trait]
impl StorageBackend for PgStore {
    async fn list_applications(&self) -> Result<Vec<ApplicationSummary>, StorageError> {
        Ok(sqlx::query_as::<_, ApplicationSummary>(
            r#"
            SELECT id, name, contact_info, department, branch, year, experience,
                   resume_file_name, resume_file_type,
                   (COALESCE(resume_file_name, '') <> ''
                    AND COALESCE(resume_file_content, '') <> '') AS has_resume,
                   created_at
            FROM applications
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_application(&self, id: i64) -> Result<Option<Application>, StorageError> {
        Ok(
            sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn get_application_resume(&self, id: i64) -> Result<Option<ResumeFile>, StorageError> {
        let row: Option<(Option<String>, Option<String>, Option<String>)> = sqlx::query_as(
            r#"
            SELECT resume_file_name, resume_file_content, resume_file_type
            FROM applications
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(|(name, content, mime)| ResumeFile::from_parts(name, content, mime)))
    }

    async fn create_application(&self, new: NewApplication) -> Result<Application, StorageError> {
        let (file_name, content, mime_type) = match new.resume {
            Some(r) => (Some(r.file_name), Some(r.content), r.mime_type),
            None => (None, None, None),
        };

        let application = sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications
                (name, contact_info, department, branch, year, experience,
                 resume_file_name, resume_file_content, resume_file_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&new.name)
        .bind(&new.contact_info)
        .bind(&new.department)
        .bind(&new.branch)
        .bind(&new.year)
        .bind(&new.experience)
        .bind(file_name)
        .bind(content)
        .bind(mime_type)
        .fetch_one(&self.pool)
        .await?;

        info!("Inserted application {}", application.id);
        Ok(application)
    }

    async fn get_about_us(&self) -> Result<AboutUs, StorageError> {
        if let Some(existing) = self.fetch_about_us().await? {
            return Ok(existing);
        }

        // Concurrent first reads may race here; DO NOTHING lets the loser re-read the winner's row.
        sqlx::query("INSERT INTO about_us (id, content) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING")
            .bind(ABOUT_US_ID)
            .bind(DEFAULT_ABOUT_US_CONTENT)
            .execute(&self.pool)
            .await?;

        Ok(sqlx::query_as::<_, AboutUs>(SELECT_ABOUT_US)
            .bind(ABOUT_US_ID)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_about_us(&self, content: String) -> Result<AboutUs, StorageError> {
        Ok(sqlx::query_as::<_, AboutUs>(
            r#"
            INSERT INTO about_us (id, content, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (id) DO UPDATE
                SET content = EXCLUDED.content, updated_at = NOW()
            RETURNING id, content, updated_at
            "#,
        )
        .bind(ABOUT_US_ID)
        .bind(content)
        .fetch_one(&self.pool)
        .await?)
    }
}
