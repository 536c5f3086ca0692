//! One-time-password replay guard.
//!
//! Code generation and verification happen outside this crate. Here we only
//! make sure an accepted code is never accepted twice in a row for the same
//! user, including under concurrent submissions.

use thiserror::Error;
use tracing::{debug, warn};

use crate::db::{DbPool, UserRepository};

/// OTP acceptance errors.
#[derive(Error, Debug)]
pub enum OtpError {
    /// The user has no OTP secret enrolled.
    #[error("no one-time password enrolled")]
    NotEnrolled,

    /// The code equals the last accepted code.
    #[error("one-time password already used")]
    Replayed,

    /// User does not exist.
    #[error("user not found")]
    UnknownUser,

    /// Database error.
    #[error("database error: {0}")]
    Database(String),
}

/// Check a code against the last accepted one.
pub fn check_replay(last_otp: Option<i64>, code: i64) -> Result<(), OtpError> {
    match last_otp {
        Some(last) if last == code => Err(OtpError::Replayed),
        _ => Ok(()),
    }
}

/// Accept an already-verified OTP code for a user.
///
/// The code becomes the user's `last_otp`. A second call with the same code
/// fails with [`OtpError::Replayed`].
pub async fn accept_otp(pool: &DbPool, user_id: i64, code: i64) -> Result<(), OtpError> {
    let repo = UserRepository::new(pool);

    let user = repo
        .get_by_id(user_id)
        .await
        .map_err(|e| OtpError::Database(e.to_string()))?
        .ok_or(OtpError::UnknownUser)?;

    if user.otp.is_none() {
        return Err(OtpError::NotEnrolled);
    }
    check_replay(user.last_otp, code)?;

    // The conditional update settles races between the read above and now.
    let recorded = repo
        .record_otp(user_id, code)
        .await
        .map_err(|e| OtpError::Database(e.to_string()))?;

    if !recorded {
        warn!(user_id, "Rejected replayed one-time password");
        return Err(OtpError::Replayed);
    }

    debug!(user_id, "Accepted one-time password");
    Ok(())
}
