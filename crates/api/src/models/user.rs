//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.
//! Only [`UserRecord`] carries the password hash, and it never leaves the
//! account service; every outbound shape is built from [`User`].

use chrono::{DateTime, Utc};

use proshop_core::{Email, UserId};

/// A user account (domain type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID, assigned by the store.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login email, unique across accounts.
    pub email: Email,
    /// Whether the user may administer other accounts.
    pub is_admin: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A user together with its stored password hash.
///
/// Implements `Debug` manually so the hash never reaches logs.
#[derive(Clone)]
pub struct UserRecord {
    pub user: User,
    /// Argon2 PHC string.
    pub password_hash: String,
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("user", &self.user)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

/// Values for a user about to be inserted.
#[derive(Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub password_hash: String,
    pub is_admin: bool,
}

/// A partial update. `None` leaves the stored value untouched.
#[derive(Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<Email>,
    pub password_hash: Option<String>,
    pub is_admin: Option<bool>,
}

impl UserChanges {
    /// Whether applying these changes would leave the row as it is.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.is_admin.is_none()
    }

    /// Apply the present fields to `record` in place.
    pub fn apply_to(&self, record: &mut UserRecord) {
        if let Some(name) = &self.name {
            record.user.name.clone_from(name);
        }
        if let Some(email) = &self.email {
            record.user.email = email.clone();
        }
        if let Some(hash) = &self.password_hash {
            record.password_hash.clone_from(hash);
        }
        if let Some(is_admin) = self.is_admin {
            record.user.is_admin = is_admin;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn record() -> UserRecord {
        let now = Utc::now();
        UserRecord {
            user: User {
                id: UserId::generate(),
                name: "A".to_string(),
                email: Email::parse("a@x.com").unwrap(),
                is_admin: false,
                created_at: now,
                updated_at: now,
            },
            password_hash: "$argon2id$stub".to_string(),
        }
    }

    #[test]
    fn test_debug_redacts_hash() {
        let output = format!("{:?}", record());
        assert!(output.contains("[REDACTED]"));
        assert!(!output.contains("$argon2id$stub"));
    }

    #[test]
    fn test_empty_changes_leave_record_unchanged() {
        let mut target = record();
        let before = target.clone();
        let changes = UserChanges::default();
        assert!(changes.is_empty());
        changes.apply_to(&mut target);
        assert_eq!(target.user, before.user);
        assert_eq!(target.password_hash, before.password_hash);
    }

    #[test]
    fn test_apply_only_present_fields() {
        let mut target = record();
        UserChanges {
            name: Some("B".to_string()),
            is_admin: Some(true),
            ..UserChanges::default()
        }
        .apply_to(&mut target);

        assert_eq!(target.user.name, "B");
        assert!(target.user.is_admin);
        assert_eq!(target.user.email.as_str(), "a@x.com");
        assert_eq!(target.password_hash, "$argon2id$stub");
    }
}
