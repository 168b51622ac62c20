use async_trait::async_trait;
use sqlx::PgPool;

use super::password::{hash_password_blocking, verify_candidate_blocking};
use super::repo_types::User;
use crate::error::StoreError;

/// Name of the unique constraint guarding `users.email`.
pub const EMAIL_CONSTRAINT: &str = "users_uc_email";

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Hashes `password` and stores a new active user.
    async fn insert(&self, name: &str, email: &str, password: &str) -> Result<(), StoreError>;
    /// Returns the id of the active user owning `email` when `password` matches.
    async fn authenticate(&self, email: &str, password: &str) -> Result<i64, StoreError>;
    async fn get(&self, id: i64) -> Result<User, StoreError>;
}

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn map_insert_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() && db_err.constraint() == Some(EMAIL_CONSTRAINT) {
            return StoreError::DuplicateEmail;
        }
    }
    e.into()
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn insert(&self, name: &str, email: &str, password: &str) -> Result<(), StoreError> {
        let hashed = hash_password_blocking(password.to_string()).await?;
        sqlx::query(
            r#"
            INSERT INTO users (name, email, hashed_password, created)
            VALUES ($1, $2, $3, now())
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(hashed)
        .execute(&self.db)
        .await
        .map_err(map_insert_error)?;
        Ok(())
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<i64, StoreError> {
        let row = sqlx::query_as::<_, (i64, String)>(
            r#"
            SELECT id, hashed_password
              FROM users
             WHERE email = $1 AND active = TRUE
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        let (id, stored) = match row {
            Some((id, hash)) => (Some(id), Some(hash)),
            None => (None, None),
        };
        let ok = verify_candidate_blocking(password.to_string(), stored).await?;
        match id {
            Some(id) if ok => Ok(id),
            _ => Err(StoreError::InvalidCredentials),
        }
    }

    async fn get(&self, id: i64) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, hashed_password, created, active
              FROM users
             WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)
    }
}
