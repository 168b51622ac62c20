use std::sync::Mutex;

use async_trait::async_trait;
use time::Duration;

use super::repo::{SnippetRepo, LATEST_LIMIT};
use super::repo_types::Snippet;
use crate::{error::StoreError, testing::Clock};

/// Vec-backed store that applies the same expiry filter as the SQL queries.
pub struct MemorySnippetRepo {
    rows: Mutex<Vec<Snippet>>,
    clock: Clock,
}

impl MemorySnippetRepo {
    pub fn new(clock: Clock) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            clock,
        }
    }
}

#[async_trait]
impl SnippetRepo for MemorySnippetRepo {
    async fn insert(&self, title: &str, content: &str, expires_days: i32) -> Result<i64, StoreError> {
        let now = self.clock.now();
        let mut rows = self.rows.lock().unwrap();
        let id = rows.len() as i64 + 1;
        rows.push(Snippet {
            id,
            title: title.to_string(),
            content: content.to_string(),
            created: now,
            expires: now + Duration::days(expires_days.into()),
        });
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Snippet, StoreError> {
        let now = self.clock.now();
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id && s.expires > now)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn latest(&self) -> Result<Vec<Snippet>, StoreError> {
        let now = self.clock.now();
        let mut live: Vec<Snippet> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.expires > now)
            .cloned()
            .collect();
        live.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
        live.truncate(LATEST_LIMIT);
        Ok(live)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn snippet_is_visible_until_it_expires() {
        let clock = Clock::new();
        let repo = MemorySnippetRepo::new(clock.clone());

        let id = repo.insert("title", "body", 7).await.unwrap();
        let s = repo.get(id).await.unwrap();
        assert_eq!(s.title, "title");
        assert!(s.expires > clock.now());
        assert_eq!(s.expires - s.created, Duration::days(7));

        clock.advance(Duration::days(6));
        assert!(repo.get(id).await.is_ok());
        assert_eq!(repo.latest().await.unwrap().len(), 1);

        clock.advance(Duration::days(1));
        assert!(matches!(repo.get(id).await, Err(StoreError::NotFound)));
        assert!(repo.latest().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_unknown_id_is_not_found() {
        let repo = MemorySnippetRepo::new(Clock::new());
        assert!(matches!(repo.get(42).await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn latest_is_capped_and_newest_first() {
        let clock = Clock::new();
        let repo = MemorySnippetRepo::new(clock.clone());
        for i in 0..13 {
            repo.insert(&format!("s{i}"), "x", 365).await.unwrap();
            clock.advance(Duration::minutes(1));
        }

        let latest = repo.latest().await.unwrap();
        assert_eq!(latest.len(), LATEST_LIMIT);
        assert_eq!(latest[0].title, "s12");
        assert!(latest.windows(2).all(|w| w[0].created >= w[1].created));
    }

    #[tokio::test]
    async fn latest_on_empty_store_is_empty_not_error() {
        let repo = MemorySnippetRepo::new(Clock::new());
        assert!(repo.latest().await.unwrap().is_empty());
    }
}
