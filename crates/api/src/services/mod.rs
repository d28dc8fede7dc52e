//! Business logic services.
//!
//! # Services
//!
//! - `accounts` - Registration, login, profiles and admin account management
//! - `credentials` - Argon2 password hashing and JWT access tokens

pub mod accounts;
pub mod credentials;

pub use accounts::{AccountError, AccountService, AdminCaller, Caller};
pub use credentials::{Claims, CredentialError, PasswordHashing, TokenIssuer};
