//! Presentation kind and storage class of a hosted file.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Fallback MIME type for unrecognized content.
pub const OCTET_STREAM: &str = "application/octet-stream";

const ARCHIVE_MIME_TYPES: &[&str] = &[
    "application/zip",
    "application/gzip",
    "application/x-gzip",
    "application/x-tar",
    "application/x-gtar",
    "application/x-bzip2",
    "application/x-xz",
    "application/x-7z-compressed",
    "application/x-rar-compressed",
    "application/vnd.rar",
    "application/zstd",
];

/// How a file is presented on its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Video,
    Image,
    Archive,
    Other,
}

impl FileKind {
    /// Classify a file from its MIME type.
    ///
    /// A missing or generic MIME type is replaced by a guess from the file
    /// name's extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use filehost::file::FileKind;
    ///
    /// assert_eq!(FileKind::detect("video/mp4", "clip.mp4"), FileKind::Video);
    /// assert_eq!(FileKind::detect("", "photo.png"), FileKind::Image);
    /// assert_eq!(FileKind::detect("application/octet-stream", "src.zip"), FileKind::Archive);
    /// ```
    pub fn detect(mime_type: &str, name: &str) -> Self {
        let mime_type = mime_type.trim();
        if mime_type.is_empty() || mime_type.eq_ignore_ascii_case(OCTET_STREAM) {
            return Self::from_mime(&guess_mime_type(name));
        }
        Self::from_mime(mime_type)
    }

    /// Classify a MIME type alone.
    pub fn from_mime(mime_type: &str) -> Self {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if essence.starts_with("video/") {
            FileKind::Video
        } else if essence.starts_with("image/") {
            FileKind::Image
        } else if ARCHIVE_MIME_TYPES.contains(&essence.as_str()) {
            FileKind::Archive
        } else {
            FileKind::Other
        }
    }

    /// Lowercase name used in templates and API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Video => "video",
            FileKind::Image => "image",
            FileKind::Archive => "archive",
            FileKind::Other => "other",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guess a MIME type from a file name, or `application/octet-stream`.
pub fn guess_mime_type(name: &str) -> String {
    mime_guess::from_path(Path::new(name))
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Which blob table holds a file's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageClass {
    Small = 0,
    Large = 1,
}

impl StorageClass {
    /// Pick the table for a file of `size` bytes.
    ///
    /// Files at or below `small_file_limit` bytes go to `small_files`.
    pub fn for_size(size: u64, small_file_limit: u64) -> Self {
        if size <= small_file_limit {
            StorageClass::Small
        } else {
            StorageClass::Large
        }
    }

    /// Value stored in `files.file_type`.
    pub fn as_i64(&self) -> i64 {
        *self as i64
    }

    /// Map a stored `file_type`.
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(StorageClass::Small),
            1 => Some(StorageClass::Large),
            _ => None,
        }
    }

    /// Table holding blobs of this class.
    pub fn table(&self) -> &'static str {
        match self {
            StorageClass::Small => "small_files",
            StorageClass::Large => "large_files",
        }
    }
}

/// One playback source of a video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quality {
    /// Label shown in the quality selector, e.g. `720p`.
    pub label: String,
    /// URL of the rendition.
    pub src: String,
}

impl Quality {
    pub fn new(label: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            src: src.into(),
        }
    }
}
