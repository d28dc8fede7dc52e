//! Account service.
//!
//! Registration, login, self-service profile management and the admin
//! operations over other accounts. Every operation takes its caller context
//! explicitly: [`Caller`] for a verified token holder, [`AdminCaller`] for a
//! caller that [`AccountService::authorize_admin`] has checked.

mod error;

pub use error::AccountError;

use proshop_core::{Email, UserId};

use crate::db::UserStore;
use crate::models::{NewUser, User, UserChanges};
use crate::services::credentials::{PasswordHashing, TokenIssuer};

/// The holder of a verified access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    user_id: UserId,
}

impl Caller {
    /// Wrap the subject of a verified token.
    #[must_use]
    pub const fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }
}

/// A caller proven to hold the admin flag.
///
/// Only [`AccountService::authorize_admin`] constructs this.
#[derive(Debug, Clone)]
pub struct AdminCaller {
    user: User,
}

impl AdminCaller {
    /// The admin's own account.
    #[must_use]
    pub const fn user(&self) -> &User {
        &self.user
    }
}

/// A user together with a freshly issued access token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    pub token: String,
}

/// Input for public registration.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Input for updating one's own profile. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Input for an admin update of another account.
///
/// `is_admin` is always written.
#[derive(Debug, Clone, Default)]
pub struct AdminUserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub is_admin: bool,
}

/// Account service.
pub struct AccountService<'a> {
    users: &'a dyn UserStore,
    passwords: &'a PasswordHashing,
    tokens: &'a TokenIssuer,
}

impl<'a> AccountService<'a> {
    /// Create a new account service.
    #[must_use]
    pub const fn new(
        users: &'a dyn UserStore,
        passwords: &'a PasswordHashing,
        tokens: &'a TokenIssuer,
    ) -> Self {
        Self {
            users,
            passwords,
            tokens,
        }
    }

    // =========================================================================
    // Public
    // =========================================================================

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidCredentials` if the email is malformed or
    /// unknown, or the password does not match.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, AccountError> {
        let record = match Email::parse(email) {
            Ok(email) => self.users.find_by_email(&email).await?,
            Err(_) => None,
        };
        let Some(record) = record else {
            self.passwords.verify_missing(password).await?;
            return Err(AccountError::InvalidCredentials);
        };

        if !self
            .passwords
            .verify(password, &record.password_hash)
            .await?
        {
            return Err(AccountError::InvalidCredentials);
        }

        self.with_token(record.user)
    }

    /// Register a new, non-admin account.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidUserData` if a field fails validation.
    /// Returns `AccountError::UserAlreadyExists` if the email is taken.
    pub async fn register(
        &self,
        registration: Registration,
    ) -> Result<AuthenticatedUser, AccountError> {
        let user = self.create(registration, false).await?;
        tracing::info!(user_id = %user.id, "User registered");
        self.with_token(user)
    }

    // =========================================================================
    // Self-service
    // =========================================================================

    /// Fetch the caller's own account.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::CallerNotFound` if the account no longer exists.
    pub async fn get_own_profile(&self, caller: &Caller) -> Result<User, AccountError> {
        self.users
            .find_by_id(caller.user_id)
            .await?
            .ok_or(AccountError::CallerNotFound)
    }

    /// Update the caller's own name, email or password and issue a new token.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidUserData` if a present field fails validation.
    /// Returns `AccountError::UserAlreadyExists` if the new email belongs to another account.
    /// Returns `AccountError::CallerNotFound` if the account no longer exists.
    pub async fn update_own_profile(
        &self,
        caller: &Caller,
        update: ProfileUpdate,
    ) -> Result<AuthenticatedUser, AccountError> {
        let mut changes = UserChanges {
            name: update.name.as_deref().map(validate_name).transpose()?,
            email: update.email.as_deref().map(validate_email).transpose()?,
            ..UserChanges::default()
        };
        if let Some(password) = update.password.as_deref() {
            validate_password(password)?;
            changes.password_hash = Some(self.passwords.hash(password).await?);
        }

        let user = self
            .apply(caller.user_id, changes)
            .await?
            .ok_or(AccountError::CallerNotFound)?;

        self.with_token(user)
    }

    // =========================================================================
    // Admin
    // =========================================================================

    /// Check that the caller exists and holds the admin flag.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::AdminCallerNotFound` if the account no longer exists.
    /// Returns `AccountError::NotAdmin` if it is not an administrator.
    pub async fn authorize_admin(&self, caller: &Caller) -> Result<AdminCaller, AccountError> {
        let user = self
            .users
            .find_by_id(caller.user_id)
            .await?
            .ok_or(AccountError::AdminCallerNotFound)?;

        if !user.is_admin {
            tracing::warn!(user_id = %user.id, "Admin operation refused");
            return Err(AccountError::NotAdmin);
        }

        Ok(AdminCaller { user })
    }

    /// Every account, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Repository` if the store fails.
    pub async fn list_users(&self, _admin: &AdminCaller) -> Result<Vec<User>, AccountError> {
        Ok(self.users.list().await?)
    }

    /// Fetch any account by ID.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::UserNotFound` if the ID is malformed or unknown.
    pub async fn get_user(&self, _admin: &AdminCaller, id: &str) -> Result<User, AccountError> {
        let id = parse_target(id)?;
        self.users
            .find_by_id(id)
            .await?
            .ok_or(AccountError::UserNotFound)
    }

    /// Update another account's name, email and admin flag.
    ///
    /// The password is never touched.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::UserNotFound` if the ID is malformed or unknown.
    /// Returns `AccountError::InvalidUserData` if a present field fails validation.
    /// Returns `AccountError::UserAlreadyExists` if the new email belongs to another account.
    pub async fn update_user(
        &self,
        admin: &AdminCaller,
        id: &str,
        update: AdminUserUpdate,
    ) -> Result<User, AccountError> {
        let id = parse_target(id)?;
        let changes = UserChanges {
            name: update.name.as_deref().map(validate_name).transpose()?,
            email: update.email.as_deref().map(validate_email).transpose()?,
            password_hash: None,
            is_admin: Some(update.is_admin),
        };

        let user = self
            .apply(id, changes)
            .await?
            .ok_or(AccountError::UserNotFound)?;

        tracing::info!(
            admin_id = %admin.user.id,
            user_id = %user.id,
            is_admin = user.is_admin,
            "User updated by admin"
        );
        Ok(user)
    }

    /// Permanently remove an account.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::UserNotFound` if the ID is malformed or unknown.
    pub async fn delete_user(&self, admin: &AdminCaller, id: &str) -> Result<(), AccountError> {
        let id = parse_target(id)?;
        if !self.users.delete(id).await? {
            return Err(AccountError::UserNotFound);
        }

        tracing::info!(admin_id = %admin.user.id, user_id = %id, "User removed");
        Ok(())
    }

    // =========================================================================
    // Bootstrap
    // =========================================================================

    /// Create an account with the admin flag set.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidUserData` if a field fails validation.
    /// Returns `AccountError::UserAlreadyExists` if the email is taken.
    pub async fn create_admin(&self, registration: Registration) -> Result<User, AccountError> {
        let user = self.create(registration, true).await?;
        tracing::info!(user_id = %user.id, "Admin account created");
        Ok(user)
    }

    /// Set the admin flag on an existing account.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidUserData` if the email is malformed.
    /// Returns `AccountError::UserNotFound` if no account has that email.
    pub async fn promote(&self, email: &str) -> Result<User, AccountError> {
        let email = validate_email(email)?;
        let record = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AccountError::UserNotFound)?;

        let changes = UserChanges {
            is_admin: Some(true),
            ..UserChanges::default()
        };
        let user = self
            .apply(record.user.id, changes)
            .await?
            .ok_or(AccountError::UserNotFound)?;

        tracing::info!(user_id = %user.id, "User promoted to admin");
        Ok(user)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn create(&self, registration: Registration, is_admin: bool) -> Result<User, AccountError> {
        let name = validate_name(&registration.name)?;
        let email = validate_email(&registration.email)?;
        validate_password(&registration.password)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AccountError::UserAlreadyExists);
        }

        let password_hash = self.passwords.hash(&registration.password).await?;

        self.users
            .insert(NewUser {
                name,
                email,
                password_hash,
                is_admin,
            })
            .await
            .map_err(AccountError::from_write)
    }

    /// Apply changes, or just re-read the account when there are none.
    async fn apply(&self, id: UserId, changes: UserChanges) -> Result<Option<User>, AccountError> {
        if changes.is_empty() {
            return Ok(self.users.find_by_id(id).await?);
        }

        self.users
            .update(id, changes)
            .await
            .map_err(AccountError::from_write)
    }

    fn with_token(&self, user: User) -> Result<AuthenticatedUser, AccountError> {
        let token = self.tokens.issue(user.id)?;
        Ok(AuthenticatedUser { user, token })
    }
}

// =============================================================================
// Validation
// =============================================================================

fn validate_name(name: &str) -> Result<String, AccountError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AccountError::InvalidUserData("Name is required".to_string()));
    }
    Ok(name.to_string())
}

fn validate_email(email: &str) -> Result<Email, AccountError> {
    Email::parse(email).map_err(|e| AccountError::InvalidUserData(format!("Invalid email: {e}")))
}

fn validate_password(password: &str) -> Result<(), AccountError> {
    if password.is_empty() {
        return Err(AccountError::InvalidUserData(
            "Password is required".to_string(),
        ));
    }
    Ok(())
}

fn parse_target(id: &str) -> Result<UserId, AccountError> {
    id.parse().map_err(|_| AccountError::UserNotFound)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use secrecy::SecretString;

    use super::*;
    use crate::config::PasswordHashingConfig;
    use crate::db::MemoryUserStore;

    struct Fixture {
        store: MemoryUserStore,
        passwords: PasswordHashing,
        tokens: TokenIssuer,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                store: MemoryUserStore::new(),
                passwords: PasswordHashing::new(PasswordHashingConfig {
                    memory_kib: 8,
                    iterations: 1,
                    parallelism: 1,
                })
                .unwrap(),
                tokens: TokenIssuer::new(
                    &SecretString::from("q8Vn2LrT7xKp4WzJ9mYc3HbF6sGd1AeU"),
                    Duration::days(30),
                ),
            }
        }

        fn service(&self) -> AccountService<'_> {
            AccountService::new(&self.store, &self.passwords, &self.tokens)
        }
    }

    fn registration(name: &str, email: &str, password: &str) -> Registration {
        Registration {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    async fn admin(fixture: &Fixture) -> AdminCaller {
        let service = fixture.service();
        let user = service
            .create_admin(registration("Admin", "admin@x.com", "adminpass"))
            .await
            .unwrap();
        service.authorize_admin(&Caller::new(user.id)).await.unwrap()
    }

    #[tokio::test]
    async fn test_register_then_login_issues_distinct_tokens() {
        let fixture = Fixture::new();
        let service = fixture.service();

        let registered = service
            .register(registration("A", "a@x.com", "p1"))
            .await
            .unwrap();
        assert!(!registered.user.is_admin);

        let logged_in = service.authenticate("a@x.com", "p1").await.unwrap();
        assert_eq!(logged_in.user.id, registered.user.id);
        assert_ne!(logged_in.token, registered.token);

        let sub1 = fixture.tokens.verify(&registered.token).unwrap().sub;
        let sub2 = fixture.tokens.verify(&logged_in.token).unwrap().sub;
        assert_eq!(sub1, sub2);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_are_indistinguishable() {
        let fixture = Fixture::new();
        let service = fixture.service();
        service
            .register(registration("A", "a@x.com", "p1"))
            .await
            .unwrap();

        let wrong = service.authenticate("a@x.com", "nope").await.unwrap_err();
        let unknown = service.authenticate("b@x.com", "p1").await.unwrap_err();
        let malformed = service.authenticate("not-an-email", "p1").await.unwrap_err();
        assert!(matches!(wrong, AccountError::InvalidCredentials));
        assert!(matches!(unknown, AccountError::InvalidCredentials));
        assert!(matches!(malformed, AccountError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_unknown_email_costs_a_password_check() {
        let fixture = Fixture {
            passwords: PasswordHashing::new(PasswordHashingConfig {
                memory_kib: 4096,
                iterations: 2,
                parallelism: 1,
            })
            .unwrap(),
            ..Fixture::new()
        };
        let service = fixture.service();
        service
            .register(registration("A", "a@x.com", "p1"))
            .await
            .unwrap();

        let mut wrong = std::time::Duration::ZERO;
        let mut unknown = std::time::Duration::ZERO;
        for _ in 0..3 {
            let started = std::time::Instant::now();
            service.authenticate("a@x.com", "nope").await.unwrap_err();
            wrong += started.elapsed();

            let started = std::time::Instant::now();
            service.authenticate("b@x.com", "nope").await.unwrap_err();
            unknown += started.elapsed();
        }

        assert!(
            unknown * 4 >= wrong,
            "unknown email took {unknown:?}, wrong password took {wrong:?}"
        );
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let fixture = Fixture::new();
        let service = fixture.service();
        service
            .register(registration("A", "a@x.com", "p1"))
            .await
            .unwrap();
        let err = service
            .register(registration("B", "a@x.com", "p2"))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::UserAlreadyExists));
    }

    #[tokio::test]
    async fn test_register_validates_fields() {
        let fixture = Fixture::new();
        let service = fixture.service();

        for (name, email, password) in [("", "a@x.com", "p1"), ("A", "nope", "p1"), ("A", "a@x.com", "")] {
            let err = service
                .register(registration(name, email, password))
                .await
                .unwrap_err();
            assert!(matches!(err, AccountError::InvalidUserData(_)));
        }
        assert!(fixture.store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_profile_update_changes_nothing() {
        let fixture = Fixture::new();
        let service = fixture.service();
        let registered = service
            .register(registration("A", "a@x.com", "p1"))
            .await
            .unwrap();
        let caller = Caller::new(registered.user.id);

        let updated = service
            .update_own_profile(&caller, ProfileUpdate::default())
            .await
            .unwrap();

        assert_eq!(updated.user, registered.user);
        assert_ne!(updated.token, registered.token);
        assert!(service.authenticate("a@x.com", "p1").await.is_ok());
    }

    #[tokio::test]
    async fn test_profile_update_rehashes_password() {
        let fixture = Fixture::new();
        let service = fixture.service();
        let registered = service
            .register(registration("A", "a@x.com", "p1"))
            .await
            .unwrap();
        let caller = Caller::new(registered.user.id);

        let updated = service
            .update_own_profile(
                &caller,
                ProfileUpdate {
                    name: Some("Renamed".to_string()),
                    password: Some("p2".to_string()),
                    ..ProfileUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.user.name, "Renamed");
        assert_eq!(updated.user.email.as_str(), "a@x.com");
        assert!(service.authenticate("a@x.com", "p1").await.is_err());
        assert!(service.authenticate("a@x.com", "p2").await.is_ok());
    }

    #[tokio::test]
    async fn test_profile_update_to_taken_email() {
        let fixture = Fixture::new();
        let service = fixture.service();
        service
            .register(registration("A", "a@x.com", "p1"))
            .await
            .unwrap();
        let b = service
            .register(registration("B", "b@x.com", "p1"))
            .await
            .unwrap();

        let err = service
            .update_own_profile(
                &Caller::new(b.user.id),
                ProfileUpdate {
                    email: Some("a@x.com".to_string()),
                    ..ProfileUpdate::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::UserAlreadyExists));
    }

    #[tokio::test]
    async fn test_vanished_caller() {
        let fixture = Fixture::new();
        let service = fixture.service();
        let caller = Caller::new(UserId::generate());

        assert!(matches!(
            service.get_own_profile(&caller).await.unwrap_err(),
            AccountError::CallerNotFound
        ));
        assert!(matches!(
            service
                .update_own_profile(&caller, ProfileUpdate::default())
                .await
                .unwrap_err(),
            AccountError::CallerNotFound
        ));
        assert!(matches!(
            service.authorize_admin(&caller).await.unwrap_err(),
            AccountError::AdminCallerNotFound
        ));
    }

    #[tokio::test]
    async fn test_non_admin_refused() {
        let fixture = Fixture::new();
        let service = fixture.service();
        let registered = service
            .register(registration("A", "a@x.com", "p1"))
            .await
            .unwrap();

        let err = service
            .authorize_admin(&Caller::new(registered.user.id))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::NotAdmin));
    }

    #[tokio::test]
    async fn test_admin_update_writes_flag_and_keeps_password() {
        let fixture = Fixture::new();
        let admin = admin(&fixture).await;
        let service = fixture.service();
        let target = service
            .register(registration("A", "a@x.com", "p1"))
            .await
            .unwrap()
            .user;
        let id = target.id.to_string();

        let promoted = service
            .update_user(
                &admin,
                &id,
                AdminUserUpdate {
                    is_admin: true,
                    ..AdminUserUpdate::default()
                },
            )
            .await
            .unwrap();
        assert!(promoted.is_admin);
        assert_eq!(promoted.name, "A");
        assert!(service.authorize_admin(&Caller::new(target.id)).await.is_ok());

        let demoted = service
            .update_user(&admin, &id, AdminUserUpdate::default())
            .await
            .unwrap();
        assert!(!demoted.is_admin);
        assert!(service.authenticate("a@x.com", "p1").await.is_ok());
    }

    #[tokio::test]
    async fn test_admin_get_list_delete() {
        let fixture = Fixture::new();
        let admin = admin(&fixture).await;
        let service = fixture.service();
        let target = service
            .register(registration("A", "a@x.com", "p1"))
            .await
            .unwrap()
            .user;
        let id = target.id.to_string();

        assert_eq!(service.list_users(&admin).await.unwrap().len(), 2);
        assert_eq!(service.get_user(&admin, &id).await.unwrap(), target);

        service.delete_user(&admin, &id).await.unwrap();
        assert!(matches!(
            service.get_user(&admin, &id).await.unwrap_err(),
            AccountError::UserNotFound
        ));
        assert!(matches!(
            service.delete_user(&admin, &id).await.unwrap_err(),
            AccountError::UserNotFound
        ));
        assert_eq!(service.list_users(&admin).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_target_id_is_not_found() {
        let fixture = Fixture::new();
        let admin = admin(&fixture).await;
        let err = fixture
            .service()
            .get_user(&admin, "not-a-uuid")
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::UserNotFound));
    }

    #[tokio::test]
    async fn test_promote_by_email() {
        let fixture = Fixture::new();
        let service = fixture.service();
        service
            .register(registration("A", "a@x.com", "p1"))
            .await
            .unwrap();

        let promoted = service.promote("a@x.com").await.unwrap();
        assert!(promoted.is_admin);
        assert!(matches!(
            service.promote("missing@x.com").await.unwrap_err(),
            AccountError::UserNotFound
        ));
    }
}
