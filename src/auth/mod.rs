//! Authentication module for filehost.
//!
//! This module provides password hashing, user registration and the
//! one-time-password replay guard.

mod otp;
mod password;
mod registration;
pub mod validation;

pub use otp::{accept_otp, check_replay, OtpError};
pub use password::{hash_password, validate_password, verify_password, PasswordError};
pub use registration::{
    register, register_with_access_level, RegistrationError, RegistrationRequest,
};
pub use validation::ValidationError;
