use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::Snippet;
use crate::error::StoreError;

/// How many snippets the home page lists.
pub const LATEST_LIMIT: usize = 10;

#[async_trait]
pub trait SnippetRepo: Send + Sync {
    /// Stores a snippet expiring `expires_days` from now and returns its id.
    async fn insert(&self, title: &str, content: &str, expires_days: i32) -> Result<i64, StoreError>;
    /// Fetches a snippet that has not yet expired.
    async fn get(&self, id: i64) -> Result<Snippet, StoreError>;
    /// Up to [`LATEST_LIMIT`] live snippets, newest first.
    async fn latest(&self) -> Result<Vec<Snippet>, StoreError>;
}

#[derive(Clone)]
pub struct PgSnippetRepo {
    db: PgPool,
}

impl PgSnippetRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SnippetRepo for PgSnippetRepo {
    async fn insert(&self, title: &str, content: &str, expires_days: i32) -> Result<i64, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO snippets (title, content, created, expires)
            VALUES ($1, $2, now(), now() + make_interval(days => $3))
            RETURNING id
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(expires_days)
        .fetch_one(&self.db)
        .await?;
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Snippet, StoreError> {
        sqlx::query_as::<_, Snippet>(
            r#"
            SELECT id, title, content, created, expires
              FROM snippets
             WHERE expires > now() AND id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn latest(&self) -> Result<Vec<Snippet>, StoreError> {
        let rows = sqlx::query_as::<_, Snippet>(
            r#"
            SELECT id, title, content, created, expires
              FROM snippets
             WHERE expires > now()
             ORDER BY created DESC
             LIMIT $1
            "#,
        )
        .bind(LATEST_LIMIT as i64)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
