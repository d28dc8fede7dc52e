//! Account service error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::credentials::CredentialError;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Invalid credentials (wrong password, unknown or malformed email).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Email already registered to another account.
    #[error("user already exists")]
    UserAlreadyExists,

    /// A submitted field failed validation.
    #[error("invalid user data: {0}")]
    InvalidUserData(String),

    /// The authenticated caller's account no longer exists.
    #[error("caller not found")]
    CallerNotFound,

    /// The caller of an admin operation no longer exists.
    #[error("admin caller not found")]
    AdminCallerNotFound,

    /// The caller is not an administrator.
    #[error("caller is not an admin")]
    NotAdmin,

    /// Target account not found.
    #[error("user not found")]
    UserNotFound,

    /// Hashing or token signing failed.
    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl AccountError {
    /// Map a store error, treating a unique violation as a taken email.
    pub(crate) fn from_write(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(_) => Self::UserAlreadyExists,
            other => Self::Repository(other),
        }
    }
}
