//! Authentication service - credential checks and session tokens.
//!
//! Signing in with an unknown email creates the account on the spot; a known
//! email must match its stored argon2 hash. Sessions are HS256 JWTs carried
//! in a cookie by the API layer.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::Config;
use crate::domain::{Password, SessionUser, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

impl From<Claims> for SessionUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            name: claims.name,
            email: claims.email,
        }
    }
}

/// Successful sign-in
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub user: SessionUser,
    /// Signed session token
    pub token: String,
    /// The account was created by this sign-in
    pub created: bool,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Check credentials, registering unknown emails, and issue a session.
    ///
    /// # Errors
    /// `InvalidCredentials` when the email exists and the password does not
    /// match. Nothing is written in that case.
    async fn authenticate(&self, email: &str, password: &str) -> AppResult<SignedIn>;

    /// Verify a session token and extract its claims
    fn verify_session(&self, token: &str) -> AppResult<Claims>;
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }

    fn issue_session(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.config.session_expiration_hours);

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.auth_secret_bytes()),
        )?)
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn authenticate(&self, email: &str, password: &str) -> AppResult<SignedIn> {
        let (user, created) = match self.uow.users().find_by_email(email).await? {
            Some(user) => {
                let stored = Password::from_hash(user.password_hash.clone());
                if !stored.verify(password)? {
                    tracing::warn!(email, "Rejected sign-in");
                    return Err(AppError::InvalidCredentials);
                }
                (user, false)
            }
            None => {
                let password_hash = Password::new(password)?.into_string();
                let user = self
                    .uow
                    .users()
                    .create(User::default_name(email), email.to_string(), password_hash)
                    .await?;
                tracing::info!(user_id = %user.id, email, "Registered account on first sign-in");
                (user, true)
            }
        };

        let token = self.issue_session(&user)?;
        Ok(SignedIn {
            user: user.into(),
            token,
            created,
        })
    }

    fn verify_session(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.auth_secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::repositories::MockUserRepository;
    use crate::infra::TestUnitOfWork;

    const SECRET: &str = "test-secret-that-is-long-enough-for-hs256";

    fn config() -> Config {
        Config::new("postgres://localhost/test", "redis://localhost", SECRET).unwrap()
    }

    fn authenticator(users: MockUserRepository) -> Authenticator<TestUnitOfWork> {
        let mut uow = TestUnitOfWork::empty();
        uow.users = Arc::new(users);
        Authenticator::new(Arc::new(uow), config())
    }

    fn existing_user(password: &str) -> User {
        User::new(
            Uuid::new_v4(),
            "User".to_string(),
            "user@nextmail.com".to_string(),
            Password::new(password).unwrap().into_string(),
        )
    }

    #[tokio::test]
    async fn test_unknown_email_registers_once() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().times(1).returning(|_| Ok(None));
        users
            .expect_create()
            .withf(|name, email, hash| {
                name == "new.person" && email == "new.person@example.com" && hash.starts_with("$argon2")
            })
            .times(1)
            .returning(|name, email, hash| Ok(User::new(Uuid::new_v4(), name, email, hash)));

        let signed_in = authenticator(users)
            .authenticate("new.person@example.com", "hunter22")
            .await
            .unwrap();

        assert!(signed_in.created);
        assert_eq!(signed_in.user.name, "new.person");
        assert!(!signed_in.token.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_password_writes_nothing() {
        let user = existing_user("123456");
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        users.expect_create().never();

        let result = authenticator(users)
            .authenticate("user@nextmail.com", "654321")
            .await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_known_user_signs_in() {
        let user = existing_user("123456");
        let user_id = user.id;
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = authenticator(users);
        let signed_in = service.authenticate("user@nextmail.com", "123456").await.unwrap();
        assert!(!signed_in.created);

        let claims = service.verify_session(&signed_in.token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "user@nextmail.com");
        assert_eq!(claims.name, "User");
    }

    #[tokio::test]
    async fn test_any_password_registers_unknown_email() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().times(1).returning(|_| Ok(None));
        users
            .expect_create()
            .withf(|name, email, _| name == "admin" && email == "admin")
            .times(1)
            .returning(|name, email, hash| Ok(User::new(Uuid::new_v4(), name, email, hash)));

        let signed_in = authenticator(users).authenticate("admin", "123").await.unwrap();
        assert!(signed_in.created);
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = authenticator(MockUserRepository::new());
        let user = existing_user("123456");
        let token = service.issue_session(&user).unwrap();

        let mut tampered = token.clone();
        tampered.push('x');
        assert!(matches!(
            service.verify_session(&tampered),
            Err(AppError::Session(_))
        ));
    }
}
