//! Domain models for the account service.

pub mod user;

pub use user::{NewUser, User, UserChanges, UserRecord};
