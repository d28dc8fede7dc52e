//! ProShop storefront library.
//!
//! Server-rendered catalog browsing. Product data comes from the catalog
//! service; this crate only holds the listing state and renders it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod home;
pub mod product_list;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
