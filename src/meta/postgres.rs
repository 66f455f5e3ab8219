use crate::config::DatabaseConfig;
use crate::meta::error::MetadataError;
use crate::meta::models::{Job, JobOptions, JobPatch, JobStatus};
use crate::meta::store::MetadataStore;
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::time::Duration;
use tracing::{debug, error, info};
use uuid::Uuid;

/// A PostgreSQL implementation of the MetadataStore trait. Job records are
/// kept as one flat row per job in the `jobs` table.
pub struct PostgresMetadataStore {
    pool: PgPool,
}

const CREATE_JOBS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS jobs (
        id UUID PRIMARY KEY,
        owner_name TEXT NOT NULL,
        raw_key TEXT NOT NULL DEFAULT '',
        resized_key TEXT NOT NULL DEFAULT '',
        collage_key TEXT NOT NULL DEFAULT '',
        uploaded_at TIMESTAMPTZ NOT NULL,
        resize_width INT NOT NULL,
        resize_height INT NOT NULL,
        collage_rows INT NOT NULL,
        collage_cols INT NOT NULL,
        output_width INT NOT NULL,
        output_height INT NOT NULL,
        natural_width INT,
        natural_height INT,
        raw_size_bytes BIGINT,
        is_public BOOLEAN NOT NULL DEFAULT TRUE,
        status TEXT NOT NULL,
        progress INT NOT NULL DEFAULT 0,
        raw_url TEXT NOT NULL DEFAULT '',
        resized_url TEXT NOT NULL DEFAULT '',
        collage_url TEXT NOT NULL DEFAULT ''
    )
"#;

const JOB_COLUMNS: &str = "id, owner_name, raw_key, resized_key, collage_key, uploaded_at, \
     resize_width, resize_height, collage_rows, collage_cols, output_width, output_height, \
     natural_width, natural_height, raw_size_bytes, is_public, status, progress, \
     raw_url, resized_url, collage_url";

impl PostgresMetadataStore {
    /// Create a new PostgresMetadataStore and ensure the jobs table exists
    pub async fn new(config: &DatabaseConfig) -> Result<Self, MetadataError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(60))
            .connect_lazy(&config.url)
            .map_err(|e| {
                error!("Failed to create connection pool: {}", e);
                MetadataError::ConnectionError(e.to_string())
            })?;

        if let Err(e) = sqlx::query("SELECT 1").execute(&pool).await {
            error!("Metadata store connectivity test failed: {}", e);
            return Err(MetadataError::ConnectionError(format!(
                "Database is not accessible: {}",
                e
            )));
        }

        sqlx::query(CREATE_JOBS_TABLE)
            .execute(&pool)
            .await
            .map_err(|e| {
                error!("Failed to create jobs table: {}", e);
                MetadataError::QueryError(format!("Failed to create jobs table: {}", e))
            })?;

        info!("PostgreSQL metadata store connection established");
        Ok(PostgresMetadataStore { pool })
    }
}

fn u32_column(row: &PgRow, name: &str) -> Result<u32, MetadataError> {
    let value: i32 = row
        .try_get(name)
        .map_err(|e| MetadataError::DeserializationError(e.to_string()))?;
    u32::try_from(value)
        .map_err(|_| MetadataError::DeserializationError(format!("negative {name}: {value}")))
}

fn row_to_job(row: &PgRow) -> Result<Job, MetadataError> {
    let deser = |e: sqlx::Error| MetadataError::DeserializationError(e.to_string());

    let status_text: String = row.try_get("status").map_err(deser)?;
    let status: JobStatus = status_text
        .parse()
        .map_err(MetadataError::DeserializationError)?;

    let progress: i32 = row.try_get("progress").map_err(deser)?;
    let natural_width: Option<i32> = row.try_get("natural_width").map_err(deser)?;
    let natural_height: Option<i32> = row.try_get("natural_height").map_err(deser)?;

    Ok(Job {
        id: row.try_get("id").map_err(deser)?,
        owner: row.try_get("owner_name").map_err(deser)?,
        raw_key: row.try_get("raw_key").map_err(deser)?,
        resized_key: row.try_get("resized_key").map_err(deser)?,
        collage_key: row.try_get("collage_key").map_err(deser)?,
        uploaded_at: row.try_get("uploaded_at").map_err(deser)?,
        options: JobOptions {
            resize_width: u32_column(row, "resize_width")?,
            resize_height: u32_column(row, "resize_height")?,
            collage_rows: u32_column(row, "collage_rows")?,
            collage_cols: u32_column(row, "collage_cols")?,
            output_width: u32_column(row, "output_width")?,
            output_height: u32_column(row, "output_height")?,
        },
        natural_width: natural_width.map(|w| w as u32),
        natural_height: natural_height.map(|h| h as u32),
        raw_size_bytes: row.try_get("raw_size_bytes").map_err(deser)?,
        is_public: row.try_get("is_public").map_err(deser)?,
        status,
        progress: progress.clamp(0, 100) as u8,
        raw_url: row.try_get("raw_url").map_err(deser)?,
        resized_url: row.try_get("resized_url").map_err(deser)?,
        collage_url: row.try_get("collage_url").map_err(deser)?,
    })
}

#[async_trait]
impl MetadataStore for PostgresMetadataStore {
    async fn create_job(&self, job: &Job) -> Result<(), MetadataError> {
        debug!("Inserting job record {}", job.id);

        let insert = format!(
            "INSERT INTO jobs ({JOB_COLUMNS}) VALUES \
             ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)"
        );

        sqlx::query(&insert)
            .bind(job.id)
            .bind(&job.owner)
            .bind(&job.raw_key)
            .bind(&job.resized_key)
            .bind(&job.collage_key)
            .bind(job.uploaded_at)
            .bind(job.options.resize_width as i32)
            .bind(job.options.resize_height as i32)
            .bind(job.options.collage_rows as i32)
            .bind(job.options.collage_cols as i32)
            .bind(job.options.output_width as i32)
            .bind(job.options.output_height as i32)
            .bind(job.natural_width.map(|w| w as i32))
            .bind(job.natural_height.map(|h| h as i32))
            .bind(job.raw_size_bytes)
            .bind(job.is_public)
            .bind(job.status.as_str())
            .bind(job.progress as i32)
            .bind(&job.raw_url)
            .bind(&job.resized_url)
            .bind(&job.collage_url)
            .execute(&self.pool)
            .await
            .map_err(|e| MetadataError::QueryError(e.to_string()))?;

        Ok(())
    }

    async fn get_job(&self, id: Uuid) -> Result<Job, MetadataError> {
        let select = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1");
        let row = sqlx::query(&select)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| MetadataError::QueryError(e.to_string()))?;

        match row {
            Some(row) => row_to_job(&row),
            None => Err(MetadataError::JobNotFound(id)),
        }
    }

    async fn update_job(&self, id: Uuid, patch: JobPatch) -> Result<(), MetadataError> {
        if patch.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE jobs SET ");
        {
            let mut fields = builder.separated(", ");
            if let Some(status) = patch.status {
                fields.push("status = ");
                fields.push_bind_unseparated(status.as_str());
            }
            if let Some(progress) = patch.progress {
                fields.push("progress = ");
                fields.push_bind_unseparated(progress as i32);
            }
            if let Some(raw_key) = &patch.raw_key {
                fields.push("raw_key = ");
                fields.push_bind_unseparated(raw_key.clone());
            }
            if let Some(resized_key) = &patch.resized_key {
                fields.push("resized_key = ");
                fields.push_bind_unseparated(resized_key.clone());
            }
            if let Some(collage_key) = &patch.collage_key {
                fields.push("collage_key = ");
                fields.push_bind_unseparated(collage_key.clone());
            }
            if let Some(width) = patch.natural_width {
                fields.push("natural_width = ");
                fields.push_bind_unseparated(width as i32);
            }
            if let Some(height) = patch.natural_height {
                fields.push("natural_height = ");
                fields.push_bind_unseparated(height as i32);
            }
            if let Some(size) = patch.raw_size_bytes {
                fields.push("raw_size_bytes = ");
                fields.push_bind_unseparated(size);
            }
            if let Some(url) = &patch.raw_url {
                fields.push("raw_url = ");
                fields.push_bind_unseparated(url.clone());
            }
            if let Some(url) = &patch.resized_url {
                fields.push("resized_url = ");
                fields.push_bind_unseparated(url.clone());
            }
            if let Some(url) = &patch.collage_url {
                fields.push("collage_url = ");
                fields.push_bind_unseparated(url.clone());
            }
        }
        builder.push(" WHERE id = ");
        builder.push_bind(id);

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| MetadataError::QueryError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(MetadataError::JobNotFound(id));
        }

        Ok(())
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Job>, MetadataError> {
        debug!("Listing jobs for owner {}", owner);

        let select =
            format!("SELECT {JOB_COLUMNS} FROM jobs WHERE owner_name = $1 ORDER BY uploaded_at ASC");
        let rows = sqlx::query(&select)
            .bind(owner)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| MetadataError::QueryError(e.to_string()))?;

        rows.iter().map(row_to_job).collect()
    }
}
