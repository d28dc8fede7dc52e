//! HTTP route handlers for the account API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health              - Liveness check
//! GET    /health/ready        - Readiness check (store reachable)
//!
//! # Public
//! POST   /api/users/login     - Authenticate, returns a token
//! POST   /api/users           - Register, returns a token
//!
//! # Private (Bearer token)
//! GET    /api/users/profile   - Own profile
//! PUT    /api/users/profile   - Update own profile, returns a new token
//!
//! # Admin (Bearer token, admin flag)
//! GET    /api/users           - List accounts
//! GET    /api/users/{id}      - Get account
//! PUT    /api/users/{id}      - Update account
//! DELETE /api/users/{id}      - Delete account
//! ```

pub mod health;
pub mod users;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{FromRequest, Request as ExtractRequest},
    http::{Request, Uri, header},
    middleware,
    routing::{get, post},
};
use serde::de::DeserializeOwned;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// JSON body extractor whose rejections use the API's error body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Like [`ApiJson`], but a missing or blank body yields `T::default()`.
#[derive(Debug)]
pub struct ApiJsonOrEmpty<T>(pub T);

impl<T, S> FromRequest<S> for ApiJsonOrEmpty<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: ExtractRequest, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(is_json_content_type);

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }
        if !is_json {
            return Err(AppError::BadRequest(
                "Expected request with `Content-Type: application/json`".to_string(),
            ));
        }

        let Json(value) = Json::<T>::from_bytes(&bytes)?;
        Ok(Self(value))
    }
}

fn is_json_content_type(value: &str) -> bool {
    let mime = value.split(';').next().unwrap_or_default().trim();
    mime.eq_ignore_ascii_case("application/json")
        || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// Create the user account routes.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(users::list).post(users::register))
        .route("/api/users/login", post(users::login))
        .route(
            "/api/users/profile",
            get(users::profile).put(users::update_profile),
        )
        .route(
            "/api/users/{id}",
            get(users::show).put(users::update).delete(users::remove),
        )
}

/// Build the complete application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(user_routes())
        .fallback(not_found)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
