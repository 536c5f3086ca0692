//! Comment repository for filehost.

use super::types::{Comment, CommentWithAuthor, NewComment};
use crate::db::DbPool;
use crate::{FilehostError, Result};

/// Repository for comment CRUD operations.
pub struct CommentRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> CommentRepository<'a> {
    /// Create a new CommentRepository.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new comment.
    pub async fn create(&self, new_comment: &NewComment) -> Result<Comment> {
        let result =
            sqlx::query("INSERT INTO comments (author_id, file_id, body) VALUES (?, ?, ?)")
                .bind(new_comment.author_id)
                .bind(new_comment.file_id)
                .bind(&new_comment.body)
                .execute(self.pool)
                .await
                .map_err(|e| FilehostError::Database(e.to_string()))?;

        self.get_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| FilehostError::NotFound("comment".to_string()))
    }

    /// Get a comment by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        sqlx::query_as::<_, Comment>(
            "SELECT id, author_id, file_id, body, created_at FROM comments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| FilehostError::Database(e.to_string()))
    }

    /// List comments on a file, oldest first, with author usernames.
    pub async fn list_by_file(&self, file_id: i64) -> Result<Vec<CommentWithAuthor>> {
        sqlx::query_as::<_, CommentWithAuthor>(
            "SELECT c.id, c.author_id, u.username AS author_username, c.file_id, c.body,
                    c.created_at
             FROM comments c
             JOIN users u ON u.id = c.author_id
             WHERE c.file_id = ?
             ORDER BY c.id ASC",
        )
        .bind(file_id)
        .fetch_all(self.pool)
        .await
        .map_err(|e| FilehostError::Database(e.to_string()))
    }

    /// Delete a comment by ID.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| FilehostError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    /// Count comments on a file.
    pub async fn count_by_file(&self, file_id: i64) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments WHERE file_id = ?")
            .bind(file_id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| FilehostError::Database(e.to_string()))?;
        Ok(count.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, NewUser, UserRepository};
    use crate::file::{FileRepository, NewFile};

    async fn setup() -> (Database, i64, i64) {
        let db = Database::open_in_memory().await.unwrap();
        let user = UserRepository::new(db.pool())
            .create(&NewUser::new("alice@example.com", "alice", "pw"))
            .await
            .unwrap();
        let file = FileRepository::new(db.pool())
            .create(&NewFile::new(user.id, "a.txt", b"a".to_vec()))
            .await
            .unwrap();
        (db, user.id, file.id)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (db, user_id, file_id) = setup().await;
        let repo = CommentRepository::new(db.pool());

        let comment = repo
            .create(&NewComment::new(user_id, file_id, "Nice file"))
            .await
            .unwrap();

        assert_eq!(comment.body, "Nice file");
        assert_eq!(comment.file_id, file_id);
        assert!(repo.get_by_id(comment.id).await.unwrap().is_some());
        assert!(repo.get_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_by_file_oldest_first() {
        let (db, user_id, file_id) = setup().await;
        let repo = CommentRepository::new(db.pool());

        for body in ["first", "second", "third"] {
            repo.create(&NewComment::new(user_id, file_id, body))
                .await
                .unwrap();
        }

        let comments = repo.list_by_file(file_id).await.unwrap();
        let bodies: Vec<_> = comments.iter().map(|c| c.body.as_str()).collect();
        assert_eq!(bodies, vec!["first", "second", "third"]);
        assert_eq!(comments[0].author_username, "alice");
        assert_eq!(repo.count_by_file(file_id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_comment_on_missing_file_fails() {
        let (db, user_id, _) = setup().await;
        let repo = CommentRepository::new(db.pool());

        assert!(repo
            .create(&NewComment::new(user_id, 999, "lost"))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_delete() {
        let (db, user_id, file_id) = setup().await;
        let repo = CommentRepository::new(db.pool());
        let comment = repo
            .create(&NewComment::new(user_id, file_id, "bye"))
            .await
            .unwrap();

        assert!(repo.delete(comment.id).await.unwrap());
        assert!(!repo.delete(comment.id).await.unwrap());
    }
}
