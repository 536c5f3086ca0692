//! Template contexts built from database records.

use serde::Serialize;

use crate::comment::CommentWithAuthor;
use crate::config::Config;
use crate::datetime::format_page_date;
use crate::file::{FileKind, FileRecord, Quality};

/// Site-wide values every page needs.
#[derive(Debug, Clone, Serialize)]
pub struct SiteContext {
    pub name: String,
    pub description: String,
    /// Public base URL without a trailing slash.
    pub base_url: String,
    pub timezone: String,
}

impl SiteContext {
    pub fn from_config(config: &Config) -> Self {
        Self {
            name: config.site.name.clone(),
            description: config.site.description.clone(),
            base_url: config.server.base_url().to_string(),
            timezone: config.site.timezone.clone(),
        }
    }
}

/// A file as shown on pages.
#[derive(Debug, Clone, Serialize)]
pub struct FileView {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub kind: FileKind,
    pub mime_type: String,
    pub size: String,
    pub public: bool,
    pub created_at: String,
    pub author: Option<String>,
    pub page_url: String,
    pub raw_url: String,
    pub thumbnail: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    /// Video sources; the raw file is the only one when none are recorded.
    pub qualities: Vec<Quality>,
}

impl FileView {
    pub fn new(file: &FileRecord, author: Option<&str>, site: &SiteContext) -> Self {
        let page_url = format!("/files/{}", file.id);
        let raw_url = format!("/files/{}/raw", file.id);
        let kind = file.kind();

        let qualities = if kind == FileKind::Video && file.qualities.is_empty() {
            vec![Quality::new("Original", raw_url.clone())]
        } else {
            file.qualities.clone()
        };

        Self {
            id: file.id,
            name: file.name.clone(),
            description: file.description.clone(),
            kind,
            mime_type: file.mime_type.clone(),
            size: format_size(file.size),
            public: file.public,
            created_at: format_page_date(&file.created_at, &site.timezone),
            author: author.map(str::to_string),
            page_url,
            raw_url,
            thumbnail: file.thumbnail.clone(),
            width: file.width,
            height: file.height,
            qualities,
        }
    }

    /// Put the viewer's access token on the raw URLs of a private file.
    ///
    /// Media elements and download links cannot send an `Authorization`
    /// header. Recorded renditions live elsewhere and are left alone.
    pub fn with_raw_token(mut self, token: Option<&str>) -> Self {
        let Some(token) = token.filter(|_| !self.public) else {
            return self;
        };

        let raw_url = format!("{}?token={}", self.raw_url, urlencoding::encode(token));
        for quality in &mut self.qualities {
            if quality.src == self.raw_url {
                quality.src = raw_url.clone();
            }
        }
        self.raw_url = raw_url;
        self
    }
}

/// A comment as shown on pages.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: i64,
    pub author: String,
    pub body: String,
    pub created_at: String,
}

impl CommentView {
    pub fn new(comment: &CommentWithAuthor, site: &SiteContext) -> Self {
        Self {
            id: comment.id,
            author: comment.author_username.clone(),
            body: comment.body.clone(),
            created_at: format_page_date(&comment.created_at, &site.timezone),
        }
    }
}

/// Human-readable byte size.
pub fn format_size(size: i64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

    if size < 1024 {
        return format!("{size} B");
    }
    let mut value = size as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

/// Resolve a possibly relative URL against the site base URL.
pub fn absolute_url(base_url: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else if url.starts_with('/') {
        format!("{base_url}{url}")
    } else {
        format!("{base_url}/{url}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::StorageClass;

    fn site() -> SiteContext {
        SiteContext {
            name: "filehost".to_string(),
            description: String::new(),
            base_url: "http://localhost:8080".to_string(),
            timezone: "UTC".to_string(),
        }
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KiB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MiB");
    }

    #[test]
    fn test_absolute_url() {
        let base = "https://example.com";
        assert_eq!(absolute_url(base, "/a.png"), "https://example.com/a.png");
        assert_eq!(absolute_url(base, "a.png"), "https://example.com/a.png");
        assert_eq!(
            absolute_url(base, "https://cdn.example.com/a.png"),
            "https://cdn.example.com/a.png"
        );
    }

    #[test]
    fn test_video_view_falls_back_to_original_source() {
        let file = FileRecord {
            id: 3,
            name: "clip.mp4".to_string(),
            description: None,
            author_id: 1,
            public: true,
            storage: StorageClass::Large,
            blob_id: 1,
            mime_type: "video/mp4".to_string(),
            size: 10,
            checksum: String::new(),
            width: None,
            height: None,
            thumbnail: None,
            qualities: Vec::new(),
            created_at: "2024-01-01 12:00:00".to_string(),
        };

        let view = FileView::new(&file, Some("alice"), &site());

        assert_eq!(view.kind, FileKind::Video);
        assert_eq!(view.qualities, vec![Quality::new("Original", "/files/3/raw")]);
        assert_eq!(view.created_at, "Jan 1, 2024 12:00");
        assert_eq!(view.author.as_deref(), Some("alice"));

        let view = view.with_raw_token(Some("abc.def"));
        assert_eq!(view.raw_url, "/files/3/raw");
    }

    #[test]
    fn test_private_view_carries_token() {
        let file = FileRecord {
            id: 4,
            name: "clip.mp4".to_string(),
            description: None,
            author_id: 1,
            public: false,
            storage: StorageClass::Large,
            blob_id: 1,
            mime_type: "video/mp4".to_string(),
            size: 10,
            checksum: String::new(),
            width: None,
            height: None,
            thumbnail: None,
            qualities: Vec::new(),
            created_at: "2024-01-01 12:00:00".to_string(),
        };

        let view = FileView::new(&file, None, &site()).with_raw_token(None);
        assert_eq!(view.raw_url, "/files/4/raw");

        let view = FileView::new(&file, None, &site()).with_raw_token(Some("a b"));
        assert_eq!(view.raw_url, "/files/4/raw?token=a%20b");
        assert_eq!(view.qualities[0].src, "/files/4/raw?token=a%20b");

        let mut file = file;
        file.qualities = vec![Quality::new("720p", "https://cdn.example.com/4-720.mp4")];
        let view = FileView::new(&file, None, &site()).with_raw_token(Some("t"));
        assert_eq!(view.qualities[0].src, "https://cdn.example.com/4-720.mp4");
        assert_eq!(view.raw_url, "/files/4/raw?token=t");
    }
}
