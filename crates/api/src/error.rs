//! Unified error handling with Sentry integration.
//!
//! Handlers return `Result<T, AppError>`. Every error leaves the service as a
//! status code and a JSON body of the form `{"message": "..."}`; server errors
//! are captured to Sentry first and never expose their details.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::accounts::AccountError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Account operation failed.
    #[error("Account error: {0}")]
    Account(#[from] AccountError),

    /// Database operation failed outside an account operation.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Missing or invalid bearer token.
    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    /// No route matched.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Account(err) => match err {
                AccountError::InvalidCredentials
                | AccountError::CallerNotFound
                | AccountError::AdminCallerNotFound => StatusCode::UNAUTHORIZED,
                AccountError::NotAdmin => StatusCode::FORBIDDEN,
                AccountError::UserAlreadyExists | AccountError::InvalidUserData(_) => {
                    StatusCode::BAD_REQUEST
                }
                AccountError::UserNotFound => StatusCode::NOT_FOUND,
                AccountError::Credential(_) | AccountError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Unauthorized(msg) => (*msg).to_string(),
            Self::BadRequest(msg) => msg.clone(),
            Self::NotFound(path) => format!("Not Found - {path}"),
            Self::Account(err) => match err {
                AccountError::InvalidCredentials => "Invalid email or password".to_string(),
                AccountError::CallerNotFound | AccountError::UserNotFound => {
                    "User not found".to_string()
                }
                AccountError::AdminCallerNotFound => "Not authorized, user not found".to_string(),
                AccountError::NotAdmin => "Not authorized as an admin".to_string(),
                AccountError::UserAlreadyExists => "User already exists".to_string(),
                AccountError::InvalidUserData(msg) => msg.clone(),
                AccountError::Credential(_) | AccountError::Repository(_) => {
                    "Internal server error".to_string()
                }
            },
            Self::Database(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(json!({ "message": self.message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after a token is verified to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

/// Add a breadcrumb for account actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn render(err: AppError) -> (StatusCode, String) {
        let response = err.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        (status, json["message"].as_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_account_errors_map_to_status_and_message() {
        let cases = [
            (
                AccountError::InvalidCredentials,
                StatusCode::UNAUTHORIZED,
                "Invalid email or password",
            ),
            (
                AccountError::CallerNotFound,
                StatusCode::UNAUTHORIZED,
                "User not found",
            ),
            (
                AccountError::AdminCallerNotFound,
                StatusCode::UNAUTHORIZED,
                "Not authorized, user not found",
            ),
            (
                AccountError::NotAdmin,
                StatusCode::FORBIDDEN,
                "Not authorized as an admin",
            ),
            (
                AccountError::UserAlreadyExists,
                StatusCode::BAD_REQUEST,
                "User already exists",
            ),
            (
                AccountError::InvalidUserData("Name is required".to_string()),
                StatusCode::BAD_REQUEST,
                "Name is required",
            ),
            (
                AccountError::UserNotFound,
                StatusCode::NOT_FOUND,
                "User not found",
            ),
        ];

        for (err, status, message) in cases {
            assert_eq!(render(err.into()).await, (status, message.to_string()));
        }
    }

    #[tokio::test]
    async fn test_server_errors_hide_details() {
        let err = AppError::Database(RepositoryError::DataCorruption(
            "bad row 42".to_string(),
        ));
        let (status, message) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Internal server error");
    }

    #[tokio::test]
    async fn test_unauthorized_message_passthrough() {
        let (status, message) = render(AppError::Unauthorized("Not authorized, no token")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(message, "Not authorized, no token");
    }
}
