//! Response DTOs for the web API.

use serde::Serialize;
use utoipa::ToSchema;

use crate::comment::{Comment, CommentWithAuthor};
use crate::datetime::to_rfc3339;
use crate::db::User;
use crate::file::{AccessGrant, AccessRecord, FileRecord};

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Paginated response wrapper.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T: Serialize> {
    /// Response data.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub meta: PaginationMeta,
}

impl<T: Serialize> PaginatedResponse<T> {
    /// Create a new paginated response.
    pub fn new(data: Vec<T>, page: u32, per_page: u32, total: u64) -> Self {
        Self {
            data,
            meta: PaginationMeta {
                page,
                per_page,
                total,
            },
        }
    }
}

/// Pagination metadata.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u64,
}

/// A video rendition.
#[derive(Debug, Serialize, ToSchema)]
pub struct QualityResponse {
    pub label: String,
    pub src: String,
}

/// File metadata.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub author_id: i64,
    pub public: bool,
    /// `video`, `image`, `archive` or `other`.
    pub kind: String,
    pub mime_type: String,
    /// Size in bytes.
    pub size: i64,
    /// SHA-256 of the content, also served as the raw URL's ETag.
    pub checksum: String,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub thumbnail: Option<String>,
    pub qualities: Vec<QualityResponse>,
    /// HTML page of the file.
    pub page_url: String,
    /// Raw bytes of the file.
    pub raw_url: String,
    pub created_at: String,
}

impl From<FileRecord> for FileResponse {
    fn from(file: FileRecord) -> Self {
        let kind = file.kind().as_str().to_string();
        Self {
            page_url: format!("/files/{}", file.id),
            raw_url: format!("/files/{}/raw", file.id),
            id: file.id,
            name: file.name,
            description: file.description,
            author_id: file.author_id,
            public: file.public,
            kind,
            mime_type: file.mime_type,
            size: file.size,
            checksum: file.checksum,
            width: file.width,
            height: file.height,
            thumbnail: file.thumbnail,
            qualities: file
                .qualities
                .into_iter()
                .map(|q| QualityResponse {
                    label: q.label,
                    src: q.src,
                })
                .collect(),
            created_at: to_rfc3339(&file.created_at),
        }
    }
}

/// A comment.
#[derive(Debug, Serialize, ToSchema)]
pub struct CommentResponse {
    pub id: i64,
    pub file_id: i64,
    pub author_id: i64,
    /// Absent right after posting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_username: Option<String>,
    pub body: String,
    pub created_at: String,
}

impl From<CommentWithAuthor> for CommentResponse {
    fn from(c: CommentWithAuthor) -> Self {
        Self {
            id: c.id,
            file_id: c.file_id,
            author_id: c.author_id,
            author_username: Some(c.author_username),
            body: c.body,
            created_at: to_rfc3339(&c.created_at),
        }
    }
}

impl From<Comment> for CommentResponse {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            file_id: c.file_id,
            author_id: c.author_id,
            author_username: None,
            body: c.body,
            created_at: to_rfc3339(&c.created_at),
        }
    }
}

/// A user holding access to a file.
#[derive(Debug, Serialize, ToSchema)]
pub struct AccessGrantResponse {
    pub user_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub created_at: String,
}

impl From<AccessGrant> for AccessGrantResponse {
    fn from(g: AccessGrant) -> Self {
        Self {
            user_id: g.user_id,
            username: Some(g.username),
            created_at: to_rfc3339(&g.created_at),
        }
    }
}

impl From<AccessRecord> for AccessGrantResponse {
    fn from(r: AccessRecord) -> Self {
        Self {
            user_id: r.user_id,
            username: None,
            created_at: to_rfc3339(&r.created_at),
        }
    }
}

/// The current user.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// `banned`, `default`, `moderator` or `admin`.
    pub access_level: String,
    /// Whether a one-time password secret is enrolled.
    pub otp_enabled: bool,
    pub year_joined: i64,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            access_level: user.access_level.as_str().to_string(),
            otp_enabled: user.otp.is_some(),
            username: user.username,
            email: user.email,
            year_joined: user.year_joined,
            created_at: to_rfc3339(&user.created_at),
        }
    }
}
