//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    short_code: String,
    long_url: String,
    user_id: Option<i64>,
    title: Option<String>,
    created_at: DateTime<Utc>,
    is_active: bool,
}

impl From<LinkRow> for ShortLink {
    fn from(row: LinkRow) -> Self {
        Self {
            id: row.id,
            short_code: row.short_code,
            long_url: row.long_url,
            owner_id: row.user_id,
            title: row.title,
            created_at: row.created_at,
            is_active: row.is_active,
        }
    }
}

/// PostgreSQL repository for the `urls` table.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            INSERT INTO urls (short_code, long_url, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, short_code, long_url, user_id, title, created_at, is_active
            "#,
        )
        .bind(&new_link.short_code)
        .bind(&new_link.long_url)
        .bind(new_link.owner_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_active_by_code(&self, short_code: &str) -> Result<Option<ShortLink>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, short_code, long_url, user_id, title, created_at, is_active
            FROM urls
            WHERE short_code = $1 AND is_active = TRUE
            "#,
        )
        .bind(short_code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn find_id_by_code(&self, short_code: &str) -> Result<Option<i64>, AppError> {
        let id = sqlx::query_scalar::<_, i64>("SELECT id FROM urls WHERE short_code = $1")
            .bind(short_code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(id)
    }

    async fn list_by_owner(&self, owner_id: i64, limit: i64) -> Result<Vec<ShortLink>, AppError> {
        let rows = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, short_code, long_url, user_id, title, created_at, is_active
            FROM urls
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(owner_id)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_title(&self, id: i64, title: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE urls SET title = $1 WHERE id = $2")
            .bind(title)
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn deactivate(&self, short_code: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE urls SET is_active = FALSE WHERE short_code = $1 AND is_active = TRUE",
        )
        .bind(short_code)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
