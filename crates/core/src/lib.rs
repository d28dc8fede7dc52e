//! ProShop Core - Shared types library.
//!
//! This crate provides common types used across all ProShop components:
//! - `api` - Account service (authentication, profiles, user administration)
//! - `storefront` - Catalog browsing view
//! - `cli` - Command-line tools for migrations and admin bootstrap
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for user IDs, emails, prices, and catalog pages

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
