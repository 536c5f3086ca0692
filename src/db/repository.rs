//! User repository for filehost.
//!
//! This module provides CRUD operations for users in the database.

use sqlx::QueryBuilder;

use super::user::{AccessLevel, NewUser, User, UserUpdate};
use super::DbPool;
use crate::{FilehostError, Result};

const USER_COLUMNS: &str =
    "id, email, username, password, access_level, otp, last_otp, year_joined, created_at";

/// Repository for user CRUD operations.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new user in the database.
    ///
    /// Returns the created user with the assigned ID.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let result = sqlx::query(
            "INSERT INTO users (email, username, password, access_level, otp)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&new_user.email)
        .bind(&new_user.username)
        .bind(&new_user.password)
        .bind(new_user.access_level.as_i64())
        .bind(&new_user.otp)
        .execute(self.pool)
        .await
        .map_err(|e| FilehostError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| FilehostError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| FilehostError::Database(e.to_string()))?;

        Ok(row.map(UserRow::into_user))
    }

    /// Get a user by username (case-insensitive).
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ? COLLATE NOCASE");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(username)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| FilehostError::Database(e.to_string()))?;

        Ok(row.map(UserRow::into_user))
    }

    /// Get a user by email address (case-insensitive).
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ? COLLATE NOCASE");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(email)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| FilehostError::Database(e.to_string()))?;

        Ok(row.map(UserRow::into_user))
    }

    /// Update a user by ID.
    ///
    /// Only fields that are set in the update will be modified.
    /// Returns the updated user, or None if not found.
    pub async fn update(&self, id: i64, update: &UserUpdate) -> Result<Option<User>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE users SET ");
        let mut separated = query.separated(", ");

        if let Some(ref password) = update.password {
            separated.push("password = ");
            separated.push_bind_unseparated(password);
        }
        if let Some(ref email) = update.email {
            separated.push("email = ");
            separated.push_bind_unseparated(email);
        }
        if let Some(access_level) = update.access_level {
            separated.push("access_level = ");
            separated.push_bind_unseparated(access_level.as_i64());
        }
        if let Some(ref otp) = update.otp {
            separated.push("otp = ");
            separated.push_bind_unseparated(otp.clone());
            // A new secret starts a new code sequence.
            separated.push("last_otp = NULL");
        }

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| FilehostError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Record an accepted OTP code as the user's `last_otp`.
    ///
    /// The update only happens when the code differs from the stored one, so
    /// of two concurrent submissions of the same code at most one returns
    /// `true`.
    pub async fn record_otp(&self, id: i64, code: i64) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET last_otp = ?
             WHERE id = ? AND (last_otp IS NULL OR last_otp <> ?)",
        )
        .bind(code)
        .bind(id)
        .bind(code)
        .execute(self.pool)
        .await
        .map_err(|e| FilehostError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a user by ID.
    ///
    /// Files, comments and access grants of the user go with it.
    /// Returns true if a user was deleted, false if not found.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| FilehostError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    /// List all users.
    pub async fn list_all(&self) -> Result<Vec<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY username");
        let rows = sqlx::query_as::<_, UserRow>(&query)
            .fetch_all(self.pool)
            .await
            .map_err(|e| FilehostError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(UserRow::into_user).collect())
    }

    /// Count all users.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await
            .map_err(|e| FilehostError::Database(e.to_string()))?;
        Ok(count.0)
    }

    /// Check if a user with the given ID exists.
    pub async fn exists(&self, id: i64) -> Result<bool> {
        let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
            .bind(id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| FilehostError::Database(e.to_string()))?;
        Ok(exists.0)
    }

    /// Check if a username is already taken (case-insensitive).
    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE username = ? COLLATE NOCASE)")
                .bind(username)
                .fetch_one(self.pool)
                .await
                .map_err(|e| FilehostError::Database(e.to_string()))?;
        Ok(exists.0)
    }

    /// Check if an email address is already registered (case-insensitive).
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = ? COLLATE NOCASE)")
                .bind(email)
                .fetch_one(self.pool)
                .await
                .map_err(|e| FilehostError::Database(e.to_string()))?;
        Ok(exists.0)
    }
}

/// Internal struct for mapping database rows to User.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    username: String,
    password: String,
    access_level: i64,
    otp: Option<String>,
    last_otp: Option<i64>,
    year_joined: i64,
    created_at: String,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            email: self.email,
            username: self.username,
            password: self.password,
            access_level: AccessLevel::from_i64(self.access_level),
            otp: self.otp,
            last_otp: self.last_otp,
            year_joined: self.year_joined,
            created_at: self.created_at,
        }
    }
}
