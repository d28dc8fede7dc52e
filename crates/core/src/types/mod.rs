//! Core types for ProShop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod email;
pub mod id;
pub mod price;

pub use catalog::{Product, ProductPage};
pub use email::{Email, EmailError};
pub use id::{UserId, UserIdError};
pub use price::Price;
