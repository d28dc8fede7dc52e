//! In-process user store.
//!
//! Holds accounts in insertion order behind a `tokio` lock. Backs the test
//! suite and applies the same email uniqueness rule as the `PostgreSQL`
//! schema.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use proshop_core::{Email, UserId};

use super::{RepositoryError, UserStore};
use crate::models::{NewUser, User, UserChanges, UserRecord};

/// User store kept in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    records: RwLock<Vec<UserRecord>>,
}

impl MemoryUserStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_conflict() -> RepositoryError {
    RepositoryError::Conflict("email already exists".to_owned())
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<UserRecord>, RepositoryError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| &r.user.email == email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| r.user.id == id)
            .map(|r| r.user.clone()))
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let records = self.records.read().await;
        Ok(records.iter().map(|r| r.user.clone()).collect())
    }

    async fn insert(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.user.email == user.email) {
            return Err(email_conflict());
        }

        let now = Utc::now();
        let record = UserRecord {
            user: User {
                id: UserId::generate(),
                name: user.name,
                email: user.email,
                is_admin: user.is_admin,
                created_at: now,
                updated_at: now,
            },
            password_hash: user.password_hash,
        };
        let created = record.user.clone();
        records.push(record);

        Ok(created)
    }

    async fn update(
        &self,
        id: UserId,
        changes: UserChanges,
    ) -> Result<Option<User>, RepositoryError> {
        let mut records = self.records.write().await;

        if let Some(email) = &changes.email
            && records
                .iter()
                .any(|r| r.user.id != id && &r.user.email == email)
        {
            return Err(email_conflict());
        }

        let Some(record) = records.iter_mut().find(|r| r.user.id == id) else {
            return Ok(None);
        };

        changes.apply_to(record);
        record.user.updated_at = Utc::now();

        Ok(Some(record.user.clone()))
    }

    async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.user.id != id);
        Ok(records.len() < before)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
