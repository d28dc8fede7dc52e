//! Bearer token extractors.
//!
//! [`RequireUser`] resolves a [`Caller`] from `Authorization: Bearer <token>`;
//! [`RequireAdmin`] additionally checks the admin flag through the account
//! service. Both reject with the API's JSON error body.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn profile(State(state): State<AppState>, RequireUser(caller): RequireUser) -> Result<Json<..>> {
//!     let user = state.accounts().get_own_profile(&caller).await?;
//!     ...
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::{AppError, set_sentry_user};
use crate::services::accounts::{AdminCaller, Caller};
use crate::state::AppState;

const NO_TOKEN: &str = "Not authorized, no token";
const TOKEN_FAILED: &str = "Not authorized, token failed";

/// Extractor that requires a valid access token.
#[derive(Debug, Clone, Copy)]
pub struct RequireUser(pub Caller);

/// Extractor that requires a valid access token held by an administrator.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AdminCaller);

/// Pull the token out of a `Bearer` authorization header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized(NO_TOKEN))?;

        let claims = state.tokens().verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Access token rejected");
            AppError::Unauthorized(TOKEN_FAILED)
        })?;

        set_sentry_user(&claims.sub);
        Ok(Self(Caller::new(claims.sub)))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireUser(caller) = RequireUser::from_request_parts(parts, state).await?;
        let admin = state.accounts().authorize_admin(&caller).await?;
        Ok(Self(admin))
    }
}
