//! ProShop account service library.
//!
//! Exposes the router, account service and stores so the binary, the CLI and
//! the test suite share one implementation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::router;
pub use state::AppState;
