//! Account service.
//!
//! Registration, password login and account maintenance. Passwords are
//! hashed with Argon2id; successful logins are exchanged for a JWT issued by
//! [`TokenIssuer`].

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use serde::Serialize;

use favorites_core::{Email, UserId};

use crate::db::RepositoryError;
use crate::models::user::{User, UserChanges};
use crate::services::token::TokenIssuer;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum name length (matches the column).
const MAX_NAME_LENGTH: usize = 255;

/// Persistence for accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. A taken email is [`RepositoryError::Conflict`].
    async fn create(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError>;

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Look up a user together with their password hash.
    async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError>;

    async fn list(&self) -> Result<Vec<User>, RepositoryError>;

    /// Apply `changes`. Returns `None` if the user does not exist.
    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, RepositoryError>;

    /// Delete a user (cascading to their favorites). Returns the deleted row.
    async fn delete(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Delete every user, returning how many were removed.
    async fn delete_all(&self) -> Result<u64, RepositoryError>;
}

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub access_token: String,
    pub user: User,
}

/// Requested profile changes, still unvalidated.
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Account service.
pub struct AccountService<S> {
    users: S,
}

impl<S: UserStore> AccountService<S> {
    #[must_use]
    pub const fn new(users: S) -> Self {
        Self { users }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidName`, `AuthError::InvalidEmail` or
    /// `AuthError::WeakPassword` on bad input, and
    /// `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let name = validate_name(name)?;
        let email = Email::parse(email)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&name, &email, &password_hash)
            .await
            .map_err(conflict_as_taken)?;

        tracing::info!(user_id = %user.id, "Registered user");
        Ok(user)
    }

    /// Check credentials and issue an access token.
    ///
    /// Unknown email, malformed email and wrong password all fail the same
    /// way.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
        tokens: &TokenIssuer,
    ) -> Result<Session, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_credentials(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let access_token = tokens.issue(user.id)?;
        Ok(Session { access_token, user })
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get(&self, id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// List all users.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the database operation fails.
    pub async fn list(&self) -> Result<Vec<User>, AuthError> {
        Ok(self.users.list().await?)
    }

    /// Update a user's profile. Passwords are re-hashed.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist,
    /// `AuthError::UserAlreadyExists` if the new email is taken, or a
    /// validation error for bad input.
    pub async fn update(&self, id: UserId, update: AccountUpdate) -> Result<User, AuthError> {
        let changes = UserChanges {
            name: update.name.as_deref().map(validate_name).transpose()?,
            email: update.email.as_deref().map(Email::parse).transpose()?,
            password_hash: match update.password.as_deref() {
                Some(password) => {
                    validate_password(password)?;
                    Some(hash_password(password)?)
                }
                None => None,
            },
        };

        if changes.is_empty() {
            return self.get(id).await;
        }

        self.users
            .update(id, &changes)
            .await
            .map_err(conflict_as_taken)?
            .ok_or(AuthError::UserNotFound)
    }

    /// Delete a user and everything they own.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn delete(&self, id: UserId) -> Result<User, AuthError> {
        let user = self
            .users
            .delete(id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        tracing::info!(user_id = %user.id, "Deleted user");
        Ok(user)
    }

    /// Delete every user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the database operation fails.
    pub async fn delete_all(&self) -> Result<u64, AuthError> {
        let count = self.users.delete_all().await?;
        tracing::warn!(count, "Deleted all users");
        Ok(count)
    }
}

fn conflict_as_taken(err: RepositoryError) -> AuthError {
    match err {
        RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
        other => AuthError::Repository(other),
    }
}

fn validate_name(name: &str) -> Result<String, AuthError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AuthError::InvalidName("name cannot be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(AuthError::InvalidName(format!(
            "name cannot be longer than {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(name.to_string())
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
pub(crate) fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHash)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
