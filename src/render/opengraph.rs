//! Open Graph metadata for file pages.
//!
//! The tags follow the same kind dispatch as the page body: videos get an
//! `og:video` block, images an `og:image` with their dimensions, and
//! everything else the placeholder icon.

use serde::Serialize;

use crate::file::{FileKind, FileRecord};

use super::view::{absolute_url, format_size, SiteContext};

/// Player size used when a video's dimensions are unknown.
pub const DEFAULT_VIDEO_WIDTH: i64 = 1280;
pub const DEFAULT_VIDEO_HEIGHT: i64 = 720;

/// Path of the placeholder icon for archives and other files.
pub const PLACEHOLDER_ICON_PATH: &str = "/static/img/file.svg";

/// Placeholder icon size.
pub const PLACEHOLDER_ICON_SIZE: i64 = 256;

/// One `<meta property=... content=...>` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OgTag {
    pub property: &'static str,
    pub content: String,
}

/// Video block of the preview.
#[derive(Debug, Clone, Serialize)]
pub struct OgVideo {
    pub url: String,
    pub mime_type: String,
    pub width: i64,
    pub height: i64,
}

/// Image block of the preview.
#[derive(Debug, Clone, Serialize)]
pub struct OgImage {
    pub url: String,
    pub width: Option<i64>,
    pub height: Option<i64>,
}

/// Social preview of a file page.
#[derive(Debug, Clone, Serialize)]
pub struct OpenGraph {
    pub og_type: &'static str,
    pub title: String,
    pub description: String,
    pub url: String,
    pub site_name: String,
    pub image: Option<OgImage>,
    pub video: Option<OgVideo>,
}

impl OpenGraph {
    /// Build the preview of a file page.
    pub fn for_file(file: &FileRecord, site: &SiteContext) -> Self {
        let base = site.base_url.as_str();
        let raw_url = format!("{base}/files/{}/raw", file.id);
        let description = file
            .description
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| format!("{} file, {}", file.kind(), format_size(file.size)));

        let thumbnail = file.thumbnail.as_deref().map(|t| absolute_url(base, t));

        let (og_type, image, video) = match file.kind() {
            FileKind::Video => {
                let video = OgVideo {
                    url: raw_url,
                    mime_type: file.mime_type.clone(),
                    width: file.width.unwrap_or(DEFAULT_VIDEO_WIDTH),
                    height: file.height.unwrap_or(DEFAULT_VIDEO_HEIGHT),
                };
                let image = thumbnail.map(|url| OgImage {
                    url,
                    width: Some(video.width),
                    height: Some(video.height),
                });
                ("video.other", image, Some(video))
            }
            FileKind::Image => {
                let image = OgImage {
                    url: thumbnail.unwrap_or(raw_url),
                    width: file.width,
                    height: file.height,
                };
                ("website", Some(image), None)
            }
            FileKind::Archive | FileKind::Other => {
                let image = OgImage {
                    url: format!("{base}{PLACEHOLDER_ICON_PATH}"),
                    width: Some(PLACEHOLDER_ICON_SIZE),
                    height: Some(PLACEHOLDER_ICON_SIZE),
                };
                ("website", Some(image), None)
            }
        };

        Self {
            og_type,
            title: file.name.clone(),
            description,
            url: format!("{base}/files/{}", file.id),
            site_name: site.name.clone(),
            image,
            video,
        }
    }

    /// Preview of a page that is not about a single file.
    pub fn for_site(site: &SiteContext) -> Self {
        Self {
            og_type: "website",
            title: site.name.clone(),
            description: site.description.clone(),
            url: format!("{}/", site.base_url),
            site_name: site.name.clone(),
            image: None,
            video: None,
        }
    }

    /// Flatten into meta tags in document order.
    pub fn tags(&self) -> Vec<OgTag> {
        let mut tags = vec![
            tag("og:type", self.og_type),
            tag("og:title", &self.title),
            tag("og:description", &self.description),
            tag("og:url", &self.url),
            tag("og:site_name", &self.site_name),
        ];

        if let Some(ref image) = self.image {
            tags.push(tag("og:image", &image.url));
            if let Some(width) = image.width {
                tags.push(tag("og:image:width", width.to_string()));
            }
            if let Some(height) = image.height {
                tags.push(tag("og:image:height", height.to_string()));
            }
        }

        if let Some(ref video) = self.video {
            tags.push(tag("og:video", &video.url));
            tags.push(tag("og:video:type", &video.mime_type));
            tags.push(tag("og:video:width", video.width.to_string()));
            tags.push(tag("og:video:height", video.height.to_string()));
        }

        tags
    }
}

fn tag(property: &'static str, content: impl Into<String>) -> OgTag {
    OgTag {
        property,
        content: content.into(),
    }
}
