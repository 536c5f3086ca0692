//! User registration for filehost.

use thiserror::Error;
use tracing::info;

use crate::auth::validation::{validate_registration, ValidationError};
use crate::auth::{hash_password, PasswordError};
use crate::db::{AccessLevel, NewUser, User, UserRepository};

/// Registration-specific errors.
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// Validation failed.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Username already exists.
    #[error("username already exists")]
    UsernameExists,

    /// Email address already registered.
    #[error("email already registered")]
    EmailExists,

    /// Password hashing failed.
    #[error("password error: {0}")]
    Password(#[from] PasswordError),

    /// Database error.
    #[error("database error: {0}")]
    Database(String),
}

/// Registration request data.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    /// Email address.
    pub email: String,
    /// Desired username (3-32 alphanumeric + underscore).
    pub username: String,
    /// Password (8-128 characters).
    pub password: String,
}

impl RegistrationRequest {
    /// Create a new registration request.
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Register a new user at the default access level.
///
/// Validates the input, rejects a taken username or email, hashes the
/// password and stores the user.
///
/// # Examples
///
/// ```ignore
/// use filehost::auth::{register, RegistrationRequest};
/// use filehost::db::{Database, UserRepository};
///
/// let db = Database::open_in_memory().await?;
/// let repo = UserRepository::new(db.pool());
///
/// let request = RegistrationRequest::new("jane@example.com", "jane", "password123");
/// let user = register(&repo, request).await?;
/// ```
pub async fn register(
    repo: &UserRepository<'_>,
    request: RegistrationRequest,
) -> std::result::Result<User, RegistrationError> {
    register_with_access_level(repo, request, AccessLevel::Default).await
}

/// Register a new user with a specific access level.
///
/// Used to seed the first administrator.
pub async fn register_with_access_level(
    repo: &UserRepository<'_>,
    request: RegistrationRequest,
    access_level: AccessLevel,
) -> std::result::Result<User, RegistrationError> {
    validate_registration(&request.username, &request.password, &request.email)?;

    if repo
        .username_exists(&request.username)
        .await
        .map_err(|e| RegistrationError::Database(e.to_string()))?
    {
        return Err(RegistrationError::UsernameExists);
    }
    if repo
        .email_exists(&request.email)
        .await
        .map_err(|e| RegistrationError::Database(e.to_string()))?
    {
        return Err(RegistrationError::EmailExists);
    }

    let password_hash = hash_password(&request.password)?;

    let new_user = NewUser::new(&request.email, &request.username, password_hash)
        .with_access_level(access_level);

    let user = repo
        .create(&new_user)
        .await
        .map_err(|e| RegistrationError::Database(e.to_string()))?;

    info!(
        username = %user.username,
        user_id = user.id,
        access_level = %access_level,
        "New user registered"
    );

    Ok(user)
}
