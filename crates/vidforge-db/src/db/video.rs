use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use vidforge_core::{AppError, VideoRecord};

/// Record store operations needed by the upload pipeline.
///
/// Kept as a trait so handlers and the pipeline can run against an
/// in-memory store in tests.
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Get a video by ID
    async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError>;

    /// Persist the mutable fields of `record` and return the stored row.
    ///
    /// Fails with `NotFound` when the row no longer exists.
    async fn update_video(&self, record: &VideoRecord) -> Result<VideoRecord, AppError>;

    /// Cheap round-trip used by readiness checks.
    async fn ping(&self) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoRepository for PgVideoRepository {
    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select", db.record_id = %id))]
    async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError> {
        let row = sqlx::query_as::<Postgres, VideoRecord>(
            "SELECT id, user_id, title, description, thumbnail_url, video_url, created_at, updated_at \
             FROM videos WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    #[tracing::instrument(skip(self, record), fields(db.table = "videos", db.operation = "update", db.record_id = %record.id))]
    async fn update_video(&self, record: &VideoRecord) -> Result<VideoRecord, AppError> {
        let row = sqlx::query_as::<Postgres, VideoRecord>(
            "UPDATE videos \
             SET title = $2, description = $3, thumbnail_url = $4, video_url = $5, updated_at = $6 \
             WHERE id = $1 \
             RETURNING id, user_id, title, description, thumbnail_url, video_url, created_at, updated_at",
        )
        .bind(record.id)
        .bind(&record.title)
        .bind(&record.description)
        .bind(&record.thumbnail_url)
        .bind(&record.video_url)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| AppError::NotFound(format!("Video {} not found", record.id)))
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
