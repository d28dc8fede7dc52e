//! Password hashing and access token issuance.
//!
//! Both primitives are delegated: Argon2id via `argon2`, HS256 JWTs via
//! `jsonwebtoken`. Hashing runs on the blocking pool.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use proshop_core::UserId;

use crate::config::{JwtConfig, PasswordHashingConfig};

/// Errors raised by the credential primitives.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Argon2 rejected the configured cost parameters.
    #[error("invalid password hashing parameters: {0}")]
    InvalidParams(String),

    /// Hashing failed or the blocking task was lost.
    #[error("password hashing error")]
    Hashing,

    /// Token could not be signed, or failed verification.
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

// =============================================================================
// Password Hashing
// =============================================================================

/// Argon2id password hasher with configured cost parameters.
#[derive(Debug, Clone)]
pub struct PasswordHashing {
    params: Params,
    /// Hash of a throwaway password under `params`, verified against when an
    /// account is missing so that lookup misses cost the same as mismatches.
    dummy_hash: String,
}

impl PasswordHashing {
    /// Build a hasher from cost parameters.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::InvalidParams` if argon2 rejects the parameters.
    pub fn new(config: PasswordHashingConfig) -> Result<Self, CredentialError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| CredentialError::InvalidParams(e.to_string()))?;

        let salt = SaltString::generate(&mut OsRng);
        let dummy_hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone())
            .hash_password(Uuid::new_v4().as_bytes(), &salt)
            .map_err(|_| CredentialError::Hashing)?
            .to_string();

        Ok(Self { params, dummy_hash })
    }

    /// Hash a password into a PHC string with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::Hashing` if argon2 fails.
    pub async fn hash(&self, password: &str) -> Result<String, CredentialError> {
        let params = self.params.clone();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|_| CredentialError::Hashing)
        })
        .await
        .map_err(|_| CredentialError::Hashing)?
    }

    /// Check a password against a stored PHC string.
    ///
    /// Verification uses the parameters embedded in the stored hash. A
    /// malformed stored hash counts as a mismatch.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::Hashing` if the blocking task is lost.
    pub async fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, CredentialError> {
        let password = password.to_owned();
        let stored_hash = stored_hash.to_owned();

        tokio::task::spawn_blocking(move || {
            let Ok(parsed) = PasswordHash::new(&stored_hash) else {
                tracing::warn!("stored password hash is not a valid PHC string");
                return false;
            };
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .await
        .map_err(|_| CredentialError::Hashing)
    }

    /// Run a full verification that always fails.
    ///
    /// Used when there is no stored hash to check, so the caller spends the
    /// same time as a real mismatch.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::Hashing` if the blocking task is lost.
    pub async fn verify_missing(&self, password: &str) -> Result<(), CredentialError> {
        self.verify(password, &self.dummy_hash).await.map(|_| ())
    }
}

// =============================================================================
// Access Tokens
// =============================================================================

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The user the token was issued to.
    pub sub: UserId,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiry (seconds since epoch).
    pub exp: i64,
    /// Unique token ID, so two tokens for one user never collide.
    pub jti: String,
}

/// Signs and verifies HS256 access tokens.
///
/// Implements `Debug` manually so key material never reaches logs.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("keys", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Create an issuer from a shared secret and token lifetime.
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::default(),
            ttl,
        }
    }

    /// Create an issuer from configuration.
    #[must_use]
    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(&config.secret, Duration::days(i64::from(config.expires_in_days)))
    }

    /// Issue a new signed token for a user.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::Token` if signing fails.
    pub fn issue(&self, user_id: UserId) -> Result<String, CredentialError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Verify a token's signature and expiry and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::Token` if the token is malformed, tampered
    /// with, signed with another key, or expired.
    pub fn verify(&self, token: &str) -> Result<Claims, CredentialError> {
        Ok(decode::<Claims>(token, &self.decoding, &self.validation)?.claims)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cheap_hashing() -> PasswordHashing {
        PasswordHashing::new(PasswordHashingConfig {
            memory_kib: Params::MIN_M_COST,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    fn issuer(ttl: Duration) -> TokenIssuer {
        TokenIssuer::new(&SecretString::from("q8Vn2LrT7xKp4WzJ9mYc3HbF6sGd1AeU"), ttl)
    }

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hashing = cheap_hashing();
        let hash = hashing.hash("p1").await.unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hashing.verify("p1", &hash).await.unwrap());
        assert!(!hashing.verify("wrong", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_same_password_hashes_differently() {
        let hashing = cheap_hashing();
        let first = hashing.hash("p1").await.unwrap();
        let second = hashing.hash("p1").await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_malformed_stored_hash_is_mismatch() {
        let hashing = cheap_hashing();
        assert!(!hashing.verify("p1", "not-a-phc-string").await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_account_still_runs_argon2() {
        let hashing = cheap_hashing();
        assert!(hashing.dummy_hash.starts_with("$argon2id$"));
        assert!(PasswordHash::new(&hashing.dummy_hash).is_ok());
        assert!(!hashing.verify("p1", &hashing.dummy_hash).await.unwrap());
        hashing.verify_missing("p1").await.unwrap();
    }

    #[test]
    fn test_invalid_params_rejected() {
        let result = PasswordHashing::new(PasswordHashingConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        });
        assert!(matches!(result, Err(CredentialError::InvalidParams(_))));
    }

    #[test]
    fn test_tokens_for_same_user_differ_but_share_subject() {
        let issuer = issuer(Duration::days(30));
        let user_id = UserId::generate();
        let t1 = issuer.issue(user_id).unwrap();
        let t2 = issuer.issue(user_id).unwrap();
        assert_ne!(t1, t2);
        assert_eq!(issuer.verify(&t1).unwrap().sub, user_id);
        assert_eq!(issuer.verify(&t2).unwrap().sub, user_id);
    }

    #[test]
    fn test_expiry_follows_ttl() {
        let issuer = issuer(Duration::days(30));
        let claims = issuer.verify(&issuer.issue(UserId::generate()).unwrap()).unwrap();
        assert_eq!(claims.exp - claims.iat, 30 * 24 * 60 * 60);
    }

    #[test]
    fn test_tampered_token_rejected() {
        let issuer = issuer(Duration::days(1));
        let token = issuer.issue(UserId::generate()).unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(issuer.verify(&tampered).is_err());
    }

    #[test]
    fn test_foreign_key_rejected() {
        let token = issuer(Duration::days(1)).issue(UserId::generate()).unwrap();
        let other = TokenIssuer::new(
            &SecretString::from("Zr4Tq9Lm2Wx7Pk5Hn8Jc3Vb6Ys1Fd0Ge"),
            Duration::days(1),
        );
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = issuer(Duration::hours(-2));
        let token = issuer.issue(UserId::generate()).unwrap();
        assert!(issuer.verify(&token).is_err());
    }
}
