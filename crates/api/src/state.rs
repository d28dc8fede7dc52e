//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::db::UserStore;
use crate::services::accounts::AccountService;
use crate::services::credentials::{CredentialError, PasswordHashing, TokenIssuer};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and holds no mutable fields.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    users: Arc<dyn UserStore>,
    passwords: PasswordHashing,
    tokens: TokenIssuer,
}

impl AppState {
    /// Create application state from already-built parts.
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>, passwords: PasswordHashing, tokens: TokenIssuer) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                users,
                passwords,
                tokens,
            }),
        }
    }

    /// Create application state from configuration and a store.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::InvalidParams` if the Argon2 parameters are rejected.
    pub fn from_config(config: &ApiConfig, users: Arc<dyn UserStore>) -> Result<Self, CredentialError> {
        let passwords = PasswordHashing::new(config.password_hashing)?;
        let tokens = TokenIssuer::from_config(&config.jwt);
        Ok(Self::new(users, passwords, tokens))
    }

    /// Get the user store.
    #[must_use]
    pub fn users(&self) -> &dyn UserStore {
        self.inner.users.as_ref()
    }

    /// Get the access token issuer.
    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.inner.tokens
    }

    /// Build an account service over this state.
    #[must_use]
    pub fn accounts(&self) -> AccountService<'_> {
        AccountService::new(
            self.inner.users.as_ref(),
            &self.inner.passwords,
            &self.inner.tokens,
        )
    }
}
