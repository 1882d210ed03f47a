//! Authentication: Argon2id password hashing and HS256 bearer tokens.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use hearthside_core::{Email, UserId};

use crate::db::{RepositoryError, UserRepository};
use crate::error::AppError;
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Bearer token claims.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i32,
    pub email: String,
    pub is_admin: bool,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch. Checked by `jsonwebtoken` on decode.
    pub exp: i64,
}

impl Claims {
    /// The user id this token was minted for.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        UserId::new(self.sub)
    }
}

/// A successful login or registration: the user plus a fresh token.
#[derive(Debug)]
pub struct Authenticated {
    pub user: User,
    pub token: String,
}

/// Authentication service.
///
/// Handles registration, login, and bearer token minting/verification.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    jwt_secret: &'a SecretString,
    token_ttl_days: i64,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, jwt_secret: &'a SecretString, token_ttl_days: i64) -> Self {
        Self {
            users: UserRepository::new(pool),
            jwt_secret,
            token_ttl_days,
        }
    }

    /// Register a new user and mint their first token.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a malformed email or weak
    /// password, and `AppError::Conflict` if the email is taken.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
        phone: Option<&str>,
    ) -> Result<Authenticated, AppError> {
        let email = Email::parse(email).map_err(|e| AppError::Validation(e.to_string()))?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&email, &password_hash, first_name, last_name, phone)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(msg) => AppError::Conflict(msg),
                other => AppError::Database(other),
            })?;

        let token = self.mint_token(&user)?;
        Ok(Authenticated { user, token })
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` if the email is unknown or the
    /// password does not match; the two cases are indistinguishable to the
    /// client.
    pub async fn login(&self, email: &str, password: &str) -> Result<Authenticated, AppError> {
        let email = Email::parse(email).map_err(|_| AppError::Unauthorized)?;

        let (user, password_hash) = self
            .users
            .get_auth_by_email(&email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        verify_password(password, &password_hash)?;

        let token = self.mint_token(&user)?;
        Ok(Authenticated { user, token })
    }

    /// Sign a bearer token for the user.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Internal` if signing fails.
    pub fn mint_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.as_i32(),
            email: user.email.as_str().to_owned(),
            is_admin: user.is_admin,
            iat: now.timestamp(),
            exp: (now + chrono::Duration::days(self.token_ttl_days)).timestamp(),
        };

        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.expose_secret().as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
    }
}

/// Decode and verify a bearer token against the signing secret.
///
/// Free function so the auth extractor can verify without constructing a
/// service.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` for a bad signature, expired token, or
/// malformed claims.
pub fn verify_token(token: &str, jwt_secret: &SecretString) -> Result<Claims, AppError> {
    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.expose_secret().as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized)
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

/// Verify a password against a stored PHC hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AppError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AppError::Unauthorized)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn secret() -> SecretString {
        SecretString::from("test-signing-secret-with-enough-length")
    }

    fn test_user() -> User {
        User {
            id: UserId::new(7),
            email: Email::parse("maya@example.com").unwrap(),
            first_name: "Maya".to_string(),
            last_name: "Okafor".to_string(),
            phone: None,
            is_admin: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_short_password_rejected() {
        assert!(matches!(
            validate_password("seven77"),
            Err(AppError::Validation(_))
        ));
        assert!(validate_password("eight888").is_ok());
    }

    #[test]
    fn test_token_roundtrip() {
        let pool_secret = secret();
        let user = test_user();

        let now = Utc::now();
        let claims = Claims {
            sub: user.id.as_i32(),
            email: user.email.as_str().to_owned(),
            is_admin: true,
            iat: now.timestamp(),
            exp: (now + chrono::Duration::days(1)).timestamp(),
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(pool_secret.expose_secret().as_bytes()),
        )
        .unwrap();

        let decoded = verify_token(&token, &pool_secret).unwrap();
        assert_eq!(decoded.sub, 7);
        assert_eq!(decoded.email, "maya@example.com");
        assert!(decoded.is_admin);
        assert_eq!(decoded.user_id(), UserId::new(7));
    }

    #[test]
    fn test_expired_token_rejected() {
        let pool_secret = secret();
        let now = Utc::now();
        let claims = Claims {
            sub: 7,
            email: "maya@example.com".to_string(),
            is_admin: false,
            iat: (now - chrono::Duration::days(2)).timestamp(),
            exp: (now - chrono::Duration::days(1)).timestamp(),
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(pool_secret.expose_secret().as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            verify_token(&token, &pool_secret),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let now = Utc::now();
        let claims = Claims {
            sub: 7,
            email: "maya@example.com".to_string(),
            is_admin: false,
            iat: now.timestamp(),
            exp: (now + chrono::Duration::days(1)).timestamp(),
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"one-perfectly-reasonable-signing-key"),
        )
        .unwrap();

        assert!(matches!(
            verify_token(&token, &SecretString::from("a-different-signing-key-entirely!")),
            Err(AppError::Unauthorized)
        ));
    }
}
