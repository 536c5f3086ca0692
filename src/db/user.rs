//! User model for filehost.
//!
//! This module defines the User struct and the AccessLevel tiers.

use std::fmt;

/// User access tier, stored as an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum AccessLevel {
    /// Banned user; may still read public files.
    Banned = -1,
    /// Regular user.
    #[default]
    Default = 0,
    /// Moderator; may remove any comment.
    Moderator = 1,
    /// Administrator; may remove any file or user.
    Admin = 2,
}

impl AccessLevel {
    /// Integer stored in the `access_level` column.
    pub fn as_i64(&self) -> i64 {
        *self as i64
    }

    /// Map a stored integer to a tier. Unknown values fall back to `Default`.
    pub fn from_i64(value: i64) -> Self {
        match value {
            -1 => AccessLevel::Banned,
            1 => AccessLevel::Moderator,
            2 => AccessLevel::Admin,
            _ => AccessLevel::Default,
        }
    }

    /// Name used in API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Banned => "banned",
            AccessLevel::Default => "default",
            AccessLevel::Moderator => "moderator",
            AccessLevel::Admin => "admin",
        }
    }

    /// Check if this tier is at least the required one.
    ///
    /// # Examples
    ///
    /// ```
    /// use filehost::db::AccessLevel;
    ///
    /// assert!(AccessLevel::Admin.at_least(AccessLevel::Moderator));
    /// assert!(!AccessLevel::Banned.at_least(AccessLevel::Default));
    /// ```
    pub fn at_least(&self, required: AccessLevel) -> bool {
        *self >= required
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User entity representing a registered user.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Email address (unique).
    pub email: String,
    /// Login username (unique, case-insensitive).
    pub username: String,
    /// Password hash (Argon2).
    pub password: String,
    /// Access tier.
    pub access_level: AccessLevel,
    /// OTP secret, if second factor is enrolled.
    pub otp: Option<String>,
    /// Last accepted OTP code.
    pub last_otp: Option<i64>,
    /// Year the account was created.
    pub year_joined: i64,
    /// Account creation timestamp.
    pub created_at: String,
}

impl User {
    /// Check if this user is banned.
    pub fn is_banned(&self) -> bool {
        self.access_level == AccessLevel::Banned
    }

    /// Check if this user is a moderator or higher.
    pub fn is_moderator(&self) -> bool {
        self.access_level >= AccessLevel::Moderator
    }

    /// Check if this user is an administrator.
    pub fn is_admin(&self) -> bool {
        self.access_level == AccessLevel::Admin
    }
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Email address.
    pub email: String,
    /// Login username.
    pub username: String,
    /// Password hash (should be pre-hashed with Argon2).
    pub password: String,
    /// Access tier (defaults to `Default`).
    pub access_level: AccessLevel,
    /// OTP secret.
    pub otp: Option<String>,
}

impl NewUser {
    /// Create a new user with the required fields.
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
            password: password.into(),
            access_level: AccessLevel::Default,
            otp: None,
        }
    }

    /// Set the access tier.
    pub fn with_access_level(mut self, access_level: AccessLevel) -> Self {
        self.access_level = access_level;
        self
    }

    /// Set the OTP secret.
    pub fn with_otp(mut self, secret: impl Into<String>) -> Self {
        self.otp = Some(secret.into());
        self
    }
}

/// Data for updating an existing user.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    /// New password hash.
    pub password: Option<String>,
    /// New email address.
    pub email: Option<String>,
    /// New access tier.
    pub access_level: Option<AccessLevel>,
    /// New OTP secret (`Some(None)` removes it).
    pub otp: Option<Option<String>>,
}

impl UserUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the password hash.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the email address.
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the access tier.
    pub fn access_level(mut self, access_level: AccessLevel) -> Self {
        self.access_level = Some(access_level);
        self
    }

    /// Set or clear the OTP secret.
    pub fn otp(mut self, otp: Option<String>) -> Self {
        self.otp = Some(otp);
        self
    }

    /// Check if no fields are set.
    pub fn is_empty(&self) -> bool {
        self.password.is_none()
            && self.email.is_none()
            && self.access_level.is_none()
            && self.otp.is_none()
    }
}
