use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

const CREATE_APPLICATIONS: &str = r#"
    CREATE TABLE IF NOT EXISTS applications (
        id                  BIGSERIAL PRIMARY KEY,
        name                TEXT NOT NULL,
        contact_info        TEXT NOT NULL DEFAULT '',
        department          TEXT NOT NULL,
        branch              TEXT NOT NULL DEFAULT '',
        year                TEXT NOT NULL DEFAULT '',
        experience          TEXT NOT NULL DEFAULT '',
        resume_file_name    TEXT,
        resume_file_content TEXT,
        resume_file_type    TEXT,
        created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

const CREATE_ABOUT_US: &str = r#"
    CREATE TABLE IF NOT EXISTS about_us (
        id         TEXT PRIMARY KEY,
        content    TEXT NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the tables if they are missing. Safe to run on every startup.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    for statement in [CREATE_APPLICATIONS, CREATE_ABOUT_US] {
        sqlx::query(statement)
            .execute(pool)
            .await
            .context("Failed to bootstrap database schema")?;
    }
    info!("Database schema ready");
    Ok(())
}
