//! HTTP middleware and extractors.
//!
//! - `auth` - Bearer token extractors for private and admin routes
//! - `request_id` - Request ID propagation for tracing and Sentry

pub mod auth;
pub mod request_id;

pub use auth::{RequireAdmin, RequireUser};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
