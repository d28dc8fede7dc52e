//! User account route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use proshop_core::{Email, UserId};

use super::{ApiJson, ApiJsonOrEmpty};
use crate::error::{Result, add_breadcrumb};
use crate::middleware::{RequireAdmin, RequireUser};
use crate::models::User;
use crate::services::accounts::{AdminUserUpdate, AuthenticatedUser, ProfileUpdate, Registration};
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Login form.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Registration form. `isAdmin` is accepted but ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub is_admin: Option<serde_json::Value>,
}

/// Self-service profile update; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Admin update of another account.
///
/// `isAdmin` is always written; omitting it or sending `null` clears the flag.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub is_admin: Option<bool>,
}

// =============================================================================
// Response Types
// =============================================================================

/// Account plus a freshly issued token (login, register, profile update).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub is_admin: bool,
    pub token: String,
}

impl From<AuthenticatedUser> for AuthResponse {
    fn from(auth: AuthenticatedUser) -> Self {
        Self {
            id: auth.user.id,
            name: auth.user.name,
            email: auth.user.email,
            is_admin: auth.user.is_admin,
            token: auth.token,
        }
    }
}

/// The caller's own profile.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub is_admin: bool,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            is_admin: user.is_admin,
        }
    }
}

/// An account as seen by an admin.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            is_admin: user.is_admin,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// An account after an admin update.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedUserResponse {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub is_admin: bool,
}

impl From<User> for UpdatedUserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            is_admin: user.is_admin,
        }
    }
}

/// Plain acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

// =============================================================================
// Public
// =============================================================================

/// `POST /api/users/login`
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let auth = state
        .accounts()
        .authenticate(&body.email, &body.password)
        .await?;

    add_breadcrumb("auth", "User logged in", None);
    Ok(Json(auth.into()))
}

/// `POST /api/users`
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    if body.is_admin.as_ref().is_some_and(|v| v != &serde_json::Value::Bool(false)) {
        tracing::warn!("Ignoring isAdmin on public registration");
    }

    let auth = state
        .accounts()
        .register(Registration {
            name: body.name,
            email: body.email,
            password: body.password,
        })
        .await?;

    add_breadcrumb("auth", "User registered", None);
    Ok((StatusCode::CREATED, Json(auth.into())))
}

// =============================================================================
// Private
// =============================================================================

/// `GET /api/users/profile`
#[instrument(skip_all)]
pub async fn profile(
    State(state): State<AppState>,
    RequireUser(caller): RequireUser,
) -> Result<Json<ProfileResponse>> {
    let user = state.accounts().get_own_profile(&caller).await?;
    Ok(Json(user.into()))
}

/// `PUT /api/users/profile`
#[instrument(skip_all)]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireUser(caller): RequireUser,
    ApiJsonOrEmpty(body): ApiJsonOrEmpty<UpdateProfileRequest>,
) -> Result<Json<AuthResponse>> {
    let auth = state
        .accounts()
        .update_own_profile(
            &caller,
            ProfileUpdate {
                name: body.name,
                email: body.email,
                password: body.password,
            },
        )
        .await?;

    Ok(Json(auth.into()))
}

// =============================================================================
// Admin
// =============================================================================

/// `GET /api/users`
#[instrument(skip_all)]
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<Vec<UserResponse>>> {
    let users = state.accounts().list_users(&admin).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// `GET /api/users/{id}`
#[instrument(skip(state, admin))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>> {
    let user = state.accounts().get_user(&admin, &id).await?;
    Ok(Json(user.into()))
}

/// `PUT /api/users/{id}`
#[instrument(skip(state, admin, body))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateUserRequest>,
) -> Result<Json<UpdatedUserResponse>> {
    let user = state
        .accounts()
        .update_user(
            &admin,
            &id,
            AdminUserUpdate {
                name: body.name,
                email: body.email,
                is_admin: body.is_admin.unwrap_or(false),
            },
        )
        .await?;

    add_breadcrumb("admin", "User updated", Some(&[("user_id", id.as_str())]));
    Ok(Json(user.into()))
}

/// `DELETE /api/users/{id}`
#[instrument(skip(state, admin))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    state.accounts().delete_user(&admin, &id).await?;

    add_breadcrumb("admin", "User removed", Some(&[("user_id", id.as_str())]));
    Ok(Json(MessageResponse {
        message: "User removed",
    }))
}
