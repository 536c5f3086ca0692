//! HTML page and raw file handlers.
//!
//! Errors on these routes render `error.html` instead of JSON.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;

use crate::db::UserRepository;
use crate::file::FileRepository;
use crate::web::dto::{PaginationQuery, TokenQuery};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::OptionalAuthUser;

/// Generate a safe Content-Disposition header value.
///
/// Control characters are dropped, quotes and backslashes are replaced in the
/// plain `filename`, and non-ASCII names also get an RFC 5987 `filename*`.
fn content_disposition_header(disposition: &str, filename: &str) -> String {
    let needs_encoding =
        !filename.is_ascii() || filename.chars().any(|c| c.is_control() || c == '"' || c == '\\');
    if !needs_encoding {
        return format!("{}; filename=\"{}\"", disposition, filename);
    }

    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            _ => c,
        })
        .collect();
    let encoded = urlencoding::encode(filename);

    format!(
        "{}; filename=\"{}\"; filename*=UTF-8''{}",
        disposition, sanitized, encoded
    )
}

/// Quoted entity tag for a checksum.
fn etag(checksum: &str) -> String {
    format!("\"{}\"", checksum)
}

/// Whether an `If-None-Match` header matches the entity tag.
fn matches_etag(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .any(|tag| tag == "*" || tag == etag || tag.strip_prefix("W/") == Some(etag))
        })
        .unwrap_or(false)
}

/// Render an error page for an API error.
pub(crate) fn error_page(state: &AppState, err: ApiError) -> Response {
    let status = err.status();
    match state.renderer.render_error(status.as_u16(), err.message()) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render error page: {}", e);
            (status, err.message().to_string()).into_response()
        }
    }
}

/// Fallback for unknown routes.
pub async fn not_found_page(State(state): State<Arc<AppState>>) -> Response {
    error_page(&state, ApiError::not_found("Page not found"))
}

/// GET / - Index page listing visible files.
pub async fn index_page(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(claims): OptionalAuthUser,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Html<String>, Response> {
    let fail = |e: ApiError| error_page(&state, e);

    let viewer = state.viewer(claims.as_ref()).await.map_err(fail)?;
    let (offset, limit) = pagination.offset_limit();
    let (files, total) = state
        .files()
        .list_visible(viewer.as_ref(), offset, limit)
        .await
        .map_err(|e| fail(e.into()))?;

    let per_page = i64::from(pagination.per_page());
    let total_pages = ((total + per_page - 1) / per_page).max(1) as u32;

    state
        .renderer
        .render_index(&files, viewer.as_ref(), pagination.page(), total_pages)
        .map(Html)
        .map_err(|e| fail(e.into()))
}

/// GET /files/:id - File page with Open Graph tags and comments.
///
/// A page opened with a valid `?token=` hands the same token to its private
/// media links.
pub async fn file_page(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(claims): OptionalAuthUser,
    Path(file_id): Path<i64>,
    Query(query): Query<TokenQuery>,
) -> Result<Html<String>, Response> {
    let fail = |e: ApiError| error_page(&state, e);

    let viewer = state.viewer(claims.as_ref()).await.map_err(fail)?;
    let file = state
        .files()
        .get_visible(file_id, viewer.as_ref())
        .await
        .map_err(|e| fail(e.into()))?;

    let author = UserRepository::new(state.db.pool())
        .get_by_id(file.author_id)
        .await
        .map_err(|e| fail(e.into()))?
        .map(|u| u.username);

    let comments = state
        .comments()
        .list(file_id, viewer.as_ref())
        .await
        .map_err(|e| fail(e.into()))?;

    let raw_token = query.token.as_deref().filter(|_| viewer.is_some());

    state
        .renderer
        .render_file_page(
            &file,
            author.as_deref(),
            &comments,
            viewer.as_ref(),
            raw_token,
        )
        .map(Html)
        .map_err(|e| fail(e.into()))
}

/// GET /files/:id/raw - Raw file bytes.
///
/// `ETag` is the content checksum; a matching `If-None-Match` answers 304.
pub async fn raw_file(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(claims): OptionalAuthUser,
    Path(file_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Response, Response> {
    let fail = |e: ApiError| error_page(&state, e);

    let viewer = state.viewer(claims.as_ref()).await.map_err(fail)?;
    let file = state
        .files()
        .get_visible(file_id, viewer.as_ref())
        .await
        .map_err(|e| fail(e.into()))?;

    let tag = etag(&file.checksum);
    let cache_control = if file.public {
        "public, max-age=3600"
    } else {
        "private, no-cache"
    };

    if matches_etag(&headers, &tag) {
        return Response::builder()
            .status(StatusCode::NOT_MODIFIED)
            .header(header::ETAG, &tag)
            .header(header::CACHE_CONTROL, cache_control)
            .body(Body::empty())
            .map_err(|e| {
                tracing::error!("Failed to build response: {}", e);
                fail(ApiError::internal("Failed to build response"))
            });
    }

    let content = FileRepository::new(state.db.pool())
        .load_data(&file)
        .await
        .map_err(|e| fail(e.into()))?;

    let content_type = HeaderValue::from_str(&file.mime_type)
        .unwrap_or_else(|_| HeaderValue::from_static(crate::file::OCTET_STREAM));

    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header("inline", &file.name),
        )
        .header(header::CONTENT_LENGTH, content.len())
        .header(header::ETAG, &tag)
        .header(header::CACHE_CONTROL, cache_control)
        .body(Body::from(content))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            fail(ApiError::internal("Failed to build response"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_header_simple_ascii() {
        let result = content_disposition_header("inline", "clip.mp4");
        assert_eq!(result, "inline; filename=\"clip.mp4\"");
    }

    #[test]
    fn test_content_disposition_header_non_ascii() {
        let result = content_disposition_header("inline", "日本語.txt");
        assert!(result.starts_with("inline; filename=\""));
        assert!(result.contains("filename*=UTF-8''%E6%97%A5%E6%9C%AC%E8%AA%9E"));
    }

    #[test]
    fn test_content_disposition_header_quotes_and_backslash() {
        let result = content_disposition_header("attachment", "a\"b\\c.txt");
        assert!(result.contains("filename=\"a_b_c.txt\""));
        assert!(result.contains("%22"));
    }

    #[test]
    fn test_content_disposition_header_strips_control_characters() {
        let result = content_disposition_header("inline", "x\r\nSet-Cookie: a=b.txt");
        assert!(!result.contains('\r'));
        assert!(!result.contains('\n'));
        assert!(result.starts_with("inline; filename="));
    }

    #[test]
    fn test_matches_etag() {
        let tag = etag("abc");
        let mut headers = HeaderMap::new();
        assert!(!matches_etag(&headers, &tag));

        headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("\"zzz\", \"abc\""));
        assert!(matches_etag(&headers, &tag));

        headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("W/\"abc\""));
        assert!(matches_etag(&headers, &tag));

        headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("\"other\""));
        assert!(!matches_etag(&headers, &tag));
    }
}
