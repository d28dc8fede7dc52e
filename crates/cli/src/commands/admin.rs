//! Admin account bootstrap commands.
//!
//! Public registration never grants the admin flag, so the first admin is
//! created here.
//!
//! # Usage
//!
//! ```bash
//! # Create a new admin account
//! proshop-cli admin create -e admin@example.com -n "Admin Name" -p 'correct horse'
//!
//! # Grant the admin flag to an existing account
//! proshop-cli admin promote -e jane@example.com
//! ```
//!
//! # Environment Variables
//!
//! Same as the API binary: `API_DATABASE_URL`, `JWT_SECRET` and the optional
//! `ARGON2_*` cost settings.

use std::sync::Arc;

use thiserror::Error;

use proshop_api::AppState;
use proshop_api::config::{ApiConfig, ConfigError};
use proshop_api::db::{PgUserStore, create_pool};
use proshop_api::services::{AccountError, CredentialError};
use proshop_api::services::accounts::Registration;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing setup failed: {0}")]
    Credential(#[from] CredentialError),

    #[error("Account error: {0}")]
    Account(#[from] AccountError),
}

async fn connect() -> Result<AppState, AdminError> {
    let config = ApiConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = create_pool(&config.database_url).await?;

    Ok(AppState::from_config(
        &config,
        Arc::new(PgUserStore::new(pool)),
    )?)
}

/// Create a new account with the admin flag set.
///
/// # Errors
///
/// Returns `AdminError::Account` if the input is invalid or the email is taken.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<(), AdminError> {
    let state = connect().await?;

    let user = state
        .accounts()
        .create_admin(Registration {
            name: name.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
        })
        .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(())
}

/// Set the admin flag on the account with this email.
///
/// # Errors
///
/// Returns `AdminError::Account` if no account has that email.
pub async fn promote(email: &str) -> Result<(), AdminError> {
    let state = connect().await?;

    let user = state.accounts().promote(email).await?;

    tracing::info!("Promoted {} ({}) to admin", user.email, user.id);
    Ok(())
}
