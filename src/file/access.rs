//! Per-user access grants and the visibility rule for files.

use super::metadata::FileRecord;
use crate::db::DbPool;
use crate::{FilehostError, Result};

/// Outcome of a visibility check, with the reason access was allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// The file is public.
    Public,
    /// The viewer is the author.
    Author,
    /// The viewer holds an access record.
    Granted,
    /// The viewer may not see the file.
    Denied,
}

impl Visibility {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Visibility::Denied)
    }
}

/// Decide whether `viewer` may see `file`.
///
/// `has_record` tells whether an access record exists for the pair; it is
/// ignored for anonymous viewers. Access level plays no part.
///
/// # Examples
///
/// ```ignore
/// let vis = check_visibility(&private_file, Some(stranger_id), false);
/// assert_eq!(vis, Visibility::Denied);
/// ```
pub fn check_visibility(file: &FileRecord, viewer: Option<i64>, has_record: bool) -> Visibility {
    if file.public {
        return Visibility::Public;
    }
    match viewer {
        Some(id) if file.is_author(id) => Visibility::Author,
        Some(_) if has_record => Visibility::Granted,
        _ => Visibility::Denied,
    }
}

/// An access grant row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccessRecord {
    pub id: i64,
    pub user_id: i64,
    pub file_id: i64,
    pub created_at: String,
}

/// An access grant joined with the grantee's username.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccessGrant {
    pub user_id: i64,
    pub username: String,
    pub created_at: String,
}

/// Repository for access grants.
pub struct AccessRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> AccessRepository<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Grant `user_id` access to `file_id`. Granting twice keeps the first row.
    pub async fn grant(&self, file_id: i64, user_id: i64) -> Result<AccessRecord> {
        sqlx::query("INSERT OR IGNORE INTO access_records (user_id, file_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(file_id)
            .execute(self.pool)
            .await
            .map_err(|e| FilehostError::Database(e.to_string()))?;

        self.get(file_id, user_id)
            .await?
            .ok_or_else(|| FilehostError::NotFound("access record".to_string()))
    }

    /// Get the grant for a user and file.
    pub async fn get(&self, file_id: i64, user_id: i64) -> Result<Option<AccessRecord>> {
        sqlx::query_as::<_, AccessRecord>(
            "SELECT id, user_id, file_id, created_at FROM access_records
             WHERE file_id = ? AND user_id = ?",
        )
        .bind(file_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| FilehostError::Database(e.to_string()))
    }

    /// Remove a grant. Returns false if there was none.
    pub async fn revoke(&self, file_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM access_records WHERE file_id = ? AND user_id = ?")
            .bind(file_id)
            .bind(user_id)
            .execute(self.pool)
            .await
            .map_err(|e| FilehostError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    /// Check if a grant exists.
    pub async fn has_access(&self, file_id: i64, user_id: i64) -> Result<bool> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM access_records WHERE file_id = ? AND user_id = ?)",
        )
        .bind(file_id)
        .bind(user_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| FilehostError::Database(e.to_string()))?;
        Ok(exists.0)
    }

    /// List grants of a file with grantee usernames, oldest first.
    pub async fn list_for_file(&self, file_id: i64) -> Result<Vec<AccessGrant>> {
        sqlx::query_as::<_, AccessGrant>(
            "SELECT a.user_id, u.username, a.created_at
             FROM access_records a
             JOIN users u ON u.id = a.user_id
             WHERE a.file_id = ?
             ORDER BY a.id",
        )
        .bind(file_id)
        .fetch_all(self.pool)
        .await
        .map_err(|e| FilehostError::Database(e.to_string()))
    }

    /// Count grants across all files.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM access_records")
            .fetch_one(self.pool)
            .await
            .map_err(|e| FilehostError::Database(e.to_string()))?;
        Ok(count.0)
    }

    /// Decide visibility, reading `access_records` only for private files
    /// viewed by a signed-in non-author.
    pub async fn visibility(&self, file: &FileRecord, viewer: Option<i64>) -> Result<Visibility> {
        let has_record = match viewer {
            Some(id) if !file.public && !file.is_author(id) => {
                self.has_access(file.id, id).await?
            }
            _ => false,
        };
        Ok(check_visibility(file, viewer, has_record))
    }

    /// Check if `viewer` may see `file`.
    pub async fn can_view(&self, file: &FileRecord, viewer: Option<i64>) -> Result<bool> {
        Ok(self.visibility(file, viewer).await?.is_allowed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, NewUser, UserRepository};
    use crate::file::{FileRepository, NewFile};

    struct Fixture {
        db: Database,
        author: i64,
        granted: i64,
        stranger: i64,
    }

    async fn setup() -> Fixture {
        let db = Database::open_in_memory().await.unwrap();
        let users = UserRepository::new(db.pool());
        let mut ids = Vec::new();
        for name in ["author", "granted", "stranger"] {
            let user = users
                .create(&NewUser::new(format!("{name}@example.com"), name, "pw"))
                .await
                .unwrap();
            ids.push(user.id);
        }
        Fixture {
            db,
            author: ids[0],
            granted: ids[1],
            stranger: ids[2],
        }
    }

    async fn create_file(fx: &Fixture, public: bool) -> FileRecord {
        FileRepository::new(fx.db.pool())
            .create(&NewFile::new(fx.author, "f.txt", b"data".to_vec()).with_public(public))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_check_visibility_rules() {
        let fx = setup().await;
        let private = create_file(&fx, false).await;
        let public = create_file(&fx, true).await;

        assert_eq!(check_visibility(&public, None, false), Visibility::Public);
        assert_eq!(
            check_visibility(&public, Some(fx.stranger), false),
            Visibility::Public
        );
        assert_eq!(check_visibility(&private, None, false), Visibility::Denied);
        assert_eq!(check_visibility(&private, None, true), Visibility::Denied);
        assert_eq!(
            check_visibility(&private, Some(fx.author), false),
            Visibility::Author
        );
        assert_eq!(
            check_visibility(&private, Some(fx.granted), true),
            Visibility::Granted
        );
        assert_eq!(
            check_visibility(&private, Some(fx.stranger), false),
            Visibility::Denied
        );
    }

    #[tokio::test]
    async fn test_can_view_private_file() {
        let fx = setup().await;
        let file = create_file(&fx, false).await;
        let repo = AccessRepository::new(fx.db.pool());

        repo.grant(file.id, fx.granted).await.unwrap();

        assert!(repo.can_view(&file, Some(fx.author)).await.unwrap());
        assert!(repo.can_view(&file, Some(fx.granted)).await.unwrap());
        assert!(!repo.can_view(&file, Some(fx.stranger)).await.unwrap());
        assert!(!repo.can_view(&file, None).await.unwrap());
    }

    #[tokio::test]
    async fn test_grant_is_idempotent() {
        let fx = setup().await;
        let file = create_file(&fx, false).await;
        let repo = AccessRepository::new(fx.db.pool());

        let first = repo.grant(file.id, fx.granted).await.unwrap();
        let second = repo.grant(file.id, fx.granted).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_revoke() {
        let fx = setup().await;
        let file = create_file(&fx, false).await;
        let repo = AccessRepository::new(fx.db.pool());

        repo.grant(file.id, fx.granted).await.unwrap();
        assert!(repo.revoke(file.id, fx.granted).await.unwrap());
        assert!(!repo.revoke(file.id, fx.granted).await.unwrap());
        assert!(!repo.has_access(file.id, fx.granted).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_for_file() {
        let fx = setup().await;
        let file = create_file(&fx, false).await;
        let repo = AccessRepository::new(fx.db.pool());

        repo.grant(file.id, fx.stranger).await.unwrap();
        repo.grant(file.id, fx.granted).await.unwrap();

        let grants = repo.list_for_file(file.id).await.unwrap();
        let names: Vec<_> = grants.iter().map(|g| g.username.as_str()).collect();
        assert_eq!(names, vec!["stranger", "granted"]);
    }

    #[tokio::test]
    async fn test_list_visible_to_matches_rule() {
        let fx = setup().await;
        let files = FileRepository::new(fx.db.pool());
        let repo = AccessRepository::new(fx.db.pool());

        let public = create_file(&fx, true).await;
        let private = create_file(&fx, false).await;
        let shared = create_file(&fx, false).await;
        repo.grant(shared.id, fx.granted).await.unwrap();

        let ids = |list: Vec<FileRecord>| list.into_iter().map(|f| f.id).collect::<Vec<_>>();

        assert_eq!(
            ids(files.list_visible_to(None, 0, 50).await.unwrap()),
            vec![public.id]
        );
        assert_eq!(
            ids(files.list_visible_to(Some(fx.stranger), 0, 50).await.unwrap()),
            vec![public.id]
        );
        assert_eq!(
            ids(files.list_visible_to(Some(fx.granted), 0, 50).await.unwrap()),
            vec![shared.id, public.id]
        );
        assert_eq!(
            ids(files.list_visible_to(Some(fx.author), 0, 50).await.unwrap()),
            vec![shared.id, private.id, public.id]
        );
        assert_eq!(files.count_visible_to(Some(fx.granted)).await.unwrap(), 2);
        assert_eq!(files.count_visible_to(None).await.unwrap(), 1);
    }
}
