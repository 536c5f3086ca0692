//! filehost - a small file-hosting web application.
//!
//! Users own uploaded files, share them publicly or with chosen users, and
//! comment on them. File pages are rendered on the server with Open Graph
//! metadata that follows the file's kind.

pub mod auth;
pub mod comment;
pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod render;
pub mod web;

pub use auth::{
    accept_otp, check_replay, hash_password, register, register_with_access_level,
    validate_password, verify_password, OtpError, PasswordError, RegistrationError,
    RegistrationRequest, ValidationError,
};
pub use comment::{Comment, CommentService, CommentWithAuthor, NewComment};
pub use config::Config;
pub use db::{AccessLevel, Database, NewUser, User, UserRepository, UserUpdate};
pub use error::{FilehostError, Result};
pub use file::{
    AccessRepository, FileKind, FileRecord, FileRepository, FileService, NewFile, StorageClass,
};
pub use render::PageRenderer;
