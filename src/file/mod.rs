//! File management module for filehost.
//!
//! This module provides:
//! - File metadata with blob storage split across `small_files` and `large_files`
//! - Presentation kinds (video, image, archive, other)
//! - Visibility checks and per-user access grants
//! - A service layer applying ownership rules

mod access;
mod kind;
mod metadata;
mod service;

pub use access::{check_visibility, AccessGrant, AccessRecord, AccessRepository, Visibility};
pub use kind::{guess_mime_type, FileKind, Quality, StorageClass, OCTET_STREAM};
pub use metadata::{checksum, FileRecord, FileRepository, FileUpdate, NewFile};
pub use service::FileService;

/// Maximum length for file names (in characters).
pub const MAX_FILENAME_LENGTH: usize = 255;

/// Maximum length for file descriptions (in characters).
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Default small-file limit (1 MiB).
pub const DEFAULT_SMALL_FILE_LIMIT: u64 = 1024 * 1024;
