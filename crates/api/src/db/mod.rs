//! Persistence for user accounts.
//!
//! # Database: `proshop`
//!
//! ## Tables
//!
//! - `proshop.users` - Accounts with argon2 password hashes and the admin flag
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p proshop-cli -- migrate
//! ```
//!
//! # Stores
//!
//! Handlers and services talk to a [`UserStore`] trait object. Production uses
//! [`PgUserStore`]; [`MemoryUserStore`] backs the test suite and keeps the same
//! uniqueness rules.

pub mod memory;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use proshop_core::{Email, UserId};

use crate::models::{NewUser, User, UserChanges, UserRecord};

pub use memory::MemoryUserStore;
pub use users::PgUserStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Storage operations the account service needs.
///
/// Each call is a single statement against the store; there is no
/// cross-call transaction. Email uniqueness is enforced by the store itself
/// and reported as [`RepositoryError::Conflict`].
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up an account by email, including its password hash.
    async fn find_by_email(&self, email: &Email) -> Result<Option<UserRecord>, RepositoryError>;

    /// Look up an account by ID.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// All accounts, oldest first.
    async fn list(&self) -> Result<Vec<User>, RepositoryError>;

    /// Insert a new account. The store assigns the ID and timestamps.
    async fn insert(&self, user: NewUser) -> Result<User, RepositoryError>;

    /// Apply a partial update. Returns `None` if no account has that ID.
    async fn update(
        &self,
        id: UserId,
        changes: UserChanges,
    ) -> Result<Option<User>, RepositoryError>;

    /// Remove an account. Returns `false` if no account has that ID.
    async fn delete(&self, id: UserId) -> Result<bool, RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a unique-violation into [`RepositoryError::Conflict`].
pub(crate) fn map_unique_violation(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict("email already exists".to_owned());
    }
    RepositoryError::Database(err)
}
