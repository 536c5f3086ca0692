//! Comment types.

/// A comment on a file.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
    /// Unique comment ID.
    pub id: i64,
    /// Author user ID.
    pub author_id: i64,
    /// File the comment belongs to.
    pub file_id: i64,
    /// Comment text.
    pub body: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// A comment joined with its author's username, for listings.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentWithAuthor {
    pub id: i64,
    pub author_id: i64,
    pub author_username: String,
    pub file_id: i64,
    pub body: String,
    pub created_at: String,
}

/// Data for creating a new comment.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub author_id: i64,
    pub file_id: i64,
    pub body: String,
}

impl NewComment {
    /// Create a new comment.
    pub fn new(author_id: i64, file_id: i64, body: impl Into<String>) -> Self {
        Self {
            author_id,
            file_id,
            body: body.into(),
        }
    }
}
