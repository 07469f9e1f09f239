//! Authentication service.
//!
//! Password hashing via argon2; stateless HS256 bearer tokens via
//! `jsonwebtoken`. A token carries the user ID and role, but the user row
//! is re-read on every authenticated request so the authorization context
//! is always current.

mod error;

pub use error::AuthError;

use std::time::{SystemTime, UNIX_EPOCH};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use farmlink_core::{Email, Role, UserId};

use crate::db::{RepositoryError, UserRepository, users::NewUser};
use crate::models::{Address, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// JWT claims carried by a bearer token.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User ID.
    pub sub: String,
    /// Role at issue time (informational; the gate re-reads the user).
    pub role: Role,
    /// Expiry, seconds since the Unix epoch.
    pub exp: u64,
}

/// Input to [`AuthService::register`].
pub struct Registration<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub role: Role,
    pub phone: Option<&'a str>,
    pub address: Option<&'a Address>,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    jwt_secret: &'a SecretString,
    token_ttl_secs: u64,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, jwt_secret: &'a SecretString, token_ttl_secs: u64) -> Self {
        Self {
            users: UserRepository::new(pool),
            jwt_secret,
            token_ttl_secs,
        }
    }

    /// Register a new user and issue a token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid,
    /// `AuthError::WeakPassword` if the password doesn't meet requirements,
    /// and `AuthError::UserAlreadyExists` if the email is taken.
    pub async fn register(&self, input: Registration<'_>) -> Result<(User, String), AuthError> {
        let email = Email::parse(input.email)?;
        validate_password(input.password)?;
        let password_hash = hash_password(input.password)?;

        let user = self
            .users
            .create(NewUser {
                name: input.name,
                email: &email,
                password_hash: &password_hash,
                role: input.role,
                phone: input.phone,
                address: input.address,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    /// Login with email and password, issuing a fresh token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        let email = Email::parse(email)?;

        let (user, password_hash) = self
            .users
            .get_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    /// Verify a bearer token and load the user it names.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken`/`TokenExpired` on verification
    /// failure, or `AuthError::UserNotFound` if the user row is gone.
    pub async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        let claims = verify_token(token, self.jwt_secret)?;

        let user_id = claims
            .sub
            .parse::<UserId>()
            .map_err(|_| AuthError::InvalidToken)?;

        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Sign a token for a user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenSigning` if encoding fails.
    pub fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        issue_token(user.id, user.role, self.jwt_secret, self.token_ttl_secs)
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Sign an HS256 token for the given user.
///
/// # Errors
///
/// Returns `AuthError::TokenSigning` if encoding fails.
pub fn issue_token(
    user_id: UserId,
    role: Role,
    secret: &SecretString,
    ttl_secs: u64,
) -> Result<String, AuthError> {
    let claims = TokenClaims {
        sub: user_id.to_string(),
        role,
        exp: now_secs() + ttl_secs,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .map_err(|_| AuthError::TokenSigning)
}

/// Verify a token's signature and expiry, returning its claims.
///
/// # Errors
///
/// Returns `AuthError::TokenExpired` for expired tokens and
/// `AuthError::InvalidToken` for everything else.
pub fn verify_token(token: &str, secret: &SecretString) -> Result<TokenClaims, AuthError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(data.claims)
}

/// Hash a password with argon2 and a fresh random salt.
///
/// Every path that stores a password goes through this function,
/// including the CLI seeder's bulk loads.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored argon2 hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` on mismatch.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| AuthError::PasswordHash)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Validate password strength.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is too short.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn secret() -> SecretString {
        SecretString::from("kJ8#mN2$pQ5&rT7*uW9^xZ3@aC6!eF1%")
    }

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same password").unwrap();
        let b = hash_password("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_validate_password_length() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_token_roundtrip() {
        let user_id = UserId::generate();
        let token = issue_token(user_id, Role::Seller, &secret(), 3600).unwrap();

        let claims = verify_token(&token, &secret()).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.role, Role::Seller);
    }

    #[test]
    fn test_token_rejects_wrong_secret() {
        let token = issue_token(UserId::generate(), Role::Customer, &secret(), 3600).unwrap();
        let other = SecretString::from("qW3$eR5&tY7*uI9^oP1@aS4!dF6%gH8#");
        assert!(matches!(
            verify_token(&token, &other),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_token_rejects_expired() {
        let user_id = UserId::generate();
        // ttl 0: exp is now, already in the past after leeway? jsonwebtoken
        // applies 60s leeway by default, so sign well in the past instead.
        let claims = TokenClaims {
            sub: user_id.to_string(),
            role: Role::Customer,
            exp: now_secs().saturating_sub(3600),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret().expose_secret().as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            verify_token(&token, &secret()),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_token_rejects_garbage() {
        assert!(matches!(
            verify_token("not-a-token", &secret()),
            Err(AuthError::InvalidToken)
        ));
    }
}
