//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                    - Latest products, page 1
//! GET  /page/{page_number}                  - Latest products, given page
//! GET  /search/{keyword}                    - Search results, page 1
//! GET  /search/{keyword}/page/{page_number} - Search results, given page
//! GET  /health                              - Health check
//! ```

pub mod home;

use axum::{Router, http::Request, routing::get};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .route("/page/{page_number}", get(home::page))
        .route("/search/{keyword}", get(home::search))
        .route("/search/{keyword}/page/{page_number}", get(home::search_page))
        .route("/health", get(health))
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    routes()
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
