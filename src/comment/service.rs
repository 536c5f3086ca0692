//! Comment service: posting, listing and removal with permission checks.

use tracing::info;

use super::repository::CommentRepository;
use super::types::{Comment, CommentWithAuthor, NewComment};
use super::MAX_COMMENT_LENGTH;
use crate::db::{DbPool, User};
use crate::file::FileService;
use crate::{FilehostError, Result};

/// Trim a comment body and check its length.
///
/// # Examples
///
/// ```
/// use filehost::comment::validate_body;
///
/// assert_eq!(validate_body("  hello  ", 2000).unwrap(), "hello");
/// assert!(validate_body("   ", 2000).is_err());
/// ```
pub fn validate_body(body: &str, max_length: usize) -> Result<String> {
    let body = body.trim();
    if body.is_empty() {
        return Err(FilehostError::Validation(
            "comment cannot be empty".to_string(),
        ));
    }
    if body.chars().count() > max_length {
        return Err(FilehostError::Validation(format!(
            "comment must be at most {max_length} characters"
        )));
    }
    Ok(body.to_string())
}

/// Comment service.
pub struct CommentService<'a> {
    pool: &'a DbPool,
    max_length: usize,
}

impl<'a> CommentService<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self {
            pool,
            max_length: MAX_COMMENT_LENGTH,
        }
    }

    /// Override the maximum body length.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Post a comment on a file the user can see.
    pub async fn post(&self, file_id: i64, user: &User, body: &str) -> Result<Comment> {
        FileService::new(self.pool)
            .get_visible(file_id, Some(user))
            .await?;

        if user.is_banned() {
            return Err(FilehostError::Permission(
                "banned users cannot comment".to_string(),
            ));
        }

        let body = validate_body(body, self.max_length)?;
        let comment = CommentRepository::new(self.pool)
            .create(&NewComment::new(user.id, file_id, body))
            .await?;

        info!(
            comment_id = comment.id,
            file_id,
            user_id = user.id,
            "Comment posted"
        );
        Ok(comment)
    }

    /// List comments of a file the viewer can see.
    pub async fn list(&self, file_id: i64, viewer: Option<&User>) -> Result<Vec<CommentWithAuthor>> {
        FileService::new(self.pool)
            .get_visible(file_id, viewer)
            .await?;
        CommentRepository::new(self.pool).list_by_file(file_id).await
    }

    /// Delete a comment.
    ///
    /// # Permission Check
    /// - The comment's author
    /// - The author of the commented file
    /// - Moderators and admins
    pub async fn delete(&self, comment_id: i64, user: &User) -> Result<()> {
        let repo = CommentRepository::new(self.pool);
        let comment = repo
            .get_by_id(comment_id)
            .await?
            .ok_or_else(|| FilehostError::NotFound("comment".to_string()))?;

        let allowed = if comment.author_id == user.id || user.is_moderator() {
            true
        } else {
            // Hidden files read as missing comments.
            let file = FileService::new(self.pool)
                .get_visible(comment.file_id, Some(user))
                .await
                .map_err(|e| match e {
                    FilehostError::NotFound(_) => FilehostError::NotFound("comment".to_string()),
                    other => other,
                })?;
            file.is_author(user.id)
        };

        if !allowed {
            return Err(FilehostError::Permission(
                "cannot delete this comment".to_string(),
            ));
        }

        repo.delete(comment_id).await?;
        info!(comment_id, user_id = user.id, "Comment deleted");
        Ok(())
    }
}
