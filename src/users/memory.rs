use std::sync::Mutex;

use async_trait::async_trait;

use super::password::{hash_password_blocking, verify_candidate_blocking};
use super::repo::UserRepo;
use super::repo_types::User;
use crate::{error::StoreError, testing::Clock};

/// Vec-backed store enforcing the same email uniqueness as the schema.
pub struct MemoryUserRepo {
    rows: Mutex<Vec<User>>,
    clock: Clock,
}

impl MemoryUserRepo {
    pub fn new(clock: Clock) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            clock,
        }
    }

    pub fn set_active(&self, id: i64, active: bool) {
        if let Some(u) = self.rows.lock().unwrap().iter_mut().find(|u| u.id == id) {
            u.active = active;
        }
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn insert(&self, name: &str, email: &str, password: &str) -> Result<(), StoreError> {
        let hashed = hash_password_blocking(password.to_string()).await?;
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|u| u.email == email) {
            return Err(StoreError::DuplicateEmail);
        }
        let id = rows.len() as i64 + 1;
        rows.push(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            hashed_password: hashed,
            created: self.clock.now(),
            active: true,
        });
        Ok(())
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<i64, StoreError> {
        let found = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email && u.active)
            .map(|u| (u.id, u.hashed_password.clone()));

        let (id, stored) = match found {
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
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_then_get_stores_hash_not_plaintext() {
        let repo = MemoryUserRepo::new(Clock::new());
        repo.insert("Alice", "alice@example.com", "pa55word-secret")
            .await
            .unwrap();

        let user = repo.get(1).await.unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert!(user.active);
        assert!(!user.hashed_password.is_empty());
        assert_ne!(user.hashed_password, "pa55word-secret");
    }

    #[tokio::test]
    async fn duplicate_email_is_distinguished() {
        let repo = MemoryUserRepo::new(Clock::new());
        repo.insert("Alice", "alice@example.com", "pa55word-secret")
            .await
            .unwrap();
        let err = repo
            .insert("Other", "alice@example.com", "another-password")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));

        repo.insert("Bob", "bob@example.com", "pa55word-secret")
            .await
            .unwrap();
        assert_eq!(repo.get(2).await.unwrap().name, "Bob");
    }

    #[tokio::test]
    async fn authenticate_outcomes() {
        let repo = MemoryUserRepo::new(Clock::new());
        repo.insert("Alice", "alice@example.com", "pa55word-secret")
            .await
            .unwrap();

        assert_eq!(
            repo.authenticate("alice@example.com", "pa55word-secret").await.unwrap(),
            1
        );

        let wrong = repo.authenticate("alice@example.com", "nope").await.unwrap_err();
        let unknown = repo.authenticate("bob@example.com", "pa55word-secret").await.unwrap_err();
        assert!(matches!(wrong, StoreError::InvalidCredentials));
        assert!(matches!(unknown, StoreError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn inactive_user_cannot_authenticate() {
        let repo = MemoryUserRepo::new(Clock::new());
        repo.insert("Alice", "alice@example.com", "pa55word-secret")
            .await
            .unwrap();
        repo.set_active(1, false);
        assert!(matches!(
            repo.authenticate("alice@example.com", "pa55word-secret").await,
            Err(StoreError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn get_missing_user_is_not_found() {
        let repo = MemoryUserRepo::new(Clock::new());
        assert!(matches!(repo.get(7).await, Err(StoreError::NotFound)));
    }
}
