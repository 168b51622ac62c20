use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// Snippet row; visible only while `expires` is in the future.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Snippet {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created: OffsetDateTime,
    pub expires: OffsetDateTime,
}
