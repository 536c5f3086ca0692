//! File metadata types and repository for filehost.
//!
//! File bytes live in `small_files` or `large_files`; the `files` row points
//! at the blob through `file_type` and `file_id`.

use sha2::{Digest, Sha256};
use sqlx::QueryBuilder;
use tracing::{debug, warn};

use super::kind::{guess_mime_type, FileKind, Quality, StorageClass};
use super::DEFAULT_SMALL_FILE_LIMIT;
use crate::db::DbPool;
use crate::{FilehostError, Result};

const FILE_COLUMNS: &str = "f.id, f.name, f.description, f.author_id, f.public, f.file_type, \
     f.file_id, f.mime_type, f.size, f.checksum, f.width, f.height, f.thumbnail, f.qualities, \
     f.created_at";

/// Metadata of a hosted file.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Unique file ID.
    pub id: i64,
    /// Display name, usually the original file name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Owning user.
    pub author_id: i64,
    /// Visible to everyone when set.
    pub public: bool,
    /// Which blob table holds the bytes.
    pub storage: StorageClass,
    /// Row ID in the blob table.
    pub blob_id: i64,
    /// MIME type of the bytes.
    pub mime_type: String,
    /// Size in bytes.
    pub size: i64,
    /// SHA-256 of the bytes, lowercase hex.
    pub checksum: String,
    /// Media width in pixels.
    pub width: Option<i64>,
    /// Media height in pixels.
    pub height: Option<i64>,
    /// Thumbnail URL.
    pub thumbnail: Option<String>,
    /// Alternative video renditions.
    pub qualities: Vec<Quality>,
    /// Upload timestamp.
    pub created_at: String,
}

impl FileRecord {
    /// Presentation kind derived from the MIME type and name.
    pub fn kind(&self) -> FileKind {
        FileKind::detect(&self.mime_type, &self.name)
    }

    /// Check if the given user authored this file.
    pub fn is_author(&self, user_id: i64) -> bool {
        self.author_id == user_id
    }
}

/// Data for creating a new file.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub name: String,
    pub description: Option<String>,
    pub author_id: i64,
    pub public: bool,
    /// Guessed from `name` when not set.
    pub mime_type: Option<String>,
    pub data: Vec<u8>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub thumbnail: Option<String>,
    pub qualities: Vec<Quality>,
}

impl NewFile {
    /// Create a new private file.
    pub fn new(author_id: i64, name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            description: None,
            author_id,
            public: false,
            mime_type: None,
            data,
            width: None,
            height: None,
            thumbnail: None,
            qualities: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_dimensions(mut self, width: i64, height: i64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.qualities.push(quality);
        self
    }

    fn resolved_mime_type(&self) -> String {
        match self.mime_type.as_deref().map(str::trim) {
            Some(mime) if !mime.is_empty() => mime.to_string(),
            _ => guess_mime_type(&self.name),
        }
    }
}

/// Builder for updating file metadata.
#[derive(Debug, Clone, Default)]
pub struct FileUpdate {
    /// New name.
    pub name: Option<String>,
    /// New description (`Some(None)` clears it).
    pub description: Option<Option<String>>,
    /// New visibility.
    pub public: Option<bool>,
}

impl FileUpdate {
    /// Create a new FileUpdate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set or clear the description.
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// Set the public flag.
    pub fn public(mut self, public: bool) -> Self {
        self.public = Some(public);
        self
    }

    /// Check if no fields are set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.public.is_none()
    }
}

/// SHA-256 of `data` as lowercase hex.
pub fn checksum(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Repository for file metadata and blob operations.
pub struct FileRepository<'a> {
    pool: &'a DbPool,
    small_file_limit: u64,
}

impl<'a> FileRepository<'a> {
    /// Create a new FileRepository with the default small-file limit.
    pub fn new(pool: &'a DbPool) -> Self {
        Self {
            pool,
            small_file_limit: DEFAULT_SMALL_FILE_LIMIT,
        }
    }

    /// Set the size in bytes up to which blobs go to `small_files`.
    pub fn with_small_file_limit(mut self, small_file_limit: u64) -> Self {
        self.small_file_limit = small_file_limit;
        self
    }

    /// Store a new file.
    ///
    /// The blob row and the metadata row are written in one transaction.
    pub async fn create(&self, new_file: &NewFile) -> Result<FileRecord> {
        let storage = StorageClass::for_size(new_file.data.len() as u64, self.small_file_limit);
        let mime_type = new_file.resolved_mime_type();
        let checksum = checksum(&new_file.data);
        let qualities = if new_file.qualities.is_empty() {
            None
        } else {
            Some(
                serde_json::to_string(&new_file.qualities)
                    .map_err(|e| FilehostError::Validation(e.to_string()))?,
            )
        };

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| FilehostError::Database(e.to_string()))?;

        let blob_sql = format!("INSERT INTO {} (data) VALUES (?)", storage.table());
        let blob_id = sqlx::query(&blob_sql)
            .bind(new_file.data.as_slice())
            .execute(&mut *tx)
            .await
            .map_err(|e| FilehostError::Database(e.to_string()))?
            .last_insert_rowid();

        let id = sqlx::query(
            "INSERT INTO files (name, description, author_id, public, file_type, file_id,
                                mime_type, size, checksum, width, height, thumbnail, qualities)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new_file.name)
        .bind(&new_file.description)
        .bind(new_file.author_id)
        .bind(new_file.public)
        .bind(storage.as_i64())
        .bind(blob_id)
        .bind(&mime_type)
        .bind(new_file.data.len() as i64)
        .bind(&checksum)
        .bind(new_file.width)
        .bind(new_file.height)
        .bind(&new_file.thumbnail)
        .bind(qualities)
        .execute(&mut *tx)
        .await
        .map_err(|e| FilehostError::Database(e.to_string()))?
        .last_insert_rowid();

        tx.commit()
            .await
            .map_err(|e| FilehostError::Database(e.to_string()))?;

        debug!(
            file_id = id,
            table = storage.table(),
            size = new_file.data.len(),
            "Stored file"
        );

        self.get_by_id(id)
            .await?
            .ok_or_else(|| FilehostError::NotFound("file".to_string()))
    }

    /// Get a file by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<FileRecord>> {
        let query = format!("SELECT {FILE_COLUMNS} FROM files f WHERE f.id = ?");
        let row = sqlx::query_as::<_, FileRow>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| FilehostError::Database(e.to_string()))?;

        row.map(FileRow::into_record).transpose()
    }

    /// Load a file's bytes from its blob table.
    pub async fn load_data(&self, file: &FileRecord) -> Result<Vec<u8>> {
        let query = format!("SELECT data FROM {} WHERE id = ?", file.storage.table());
        let data: Option<Vec<u8>> = sqlx::query_scalar(&query)
            .bind(file.blob_id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| FilehostError::Database(e.to_string()))?;

        data.ok_or_else(|| FilehostError::NotFound("file data".to_string()))
    }

    /// List files by author, newest first.
    pub async fn list_by_author(&self, author_id: i64) -> Result<Vec<FileRecord>> {
        let query =
            format!("SELECT {FILE_COLUMNS} FROM files f WHERE f.author_id = ? ORDER BY f.id DESC");
        let rows = sqlx::query_as::<_, FileRow>(&query)
            .bind(author_id)
            .fetch_all(self.pool)
            .await
            .map_err(|e| FilehostError::Database(e.to_string()))?;

        rows.into_iter().map(FileRow::into_record).collect()
    }

    /// List files the viewer may see, newest first.
    ///
    /// A file is visible when it is public, authored by the viewer, or
    /// granted to the viewer through `access_records`. Anonymous viewers
    /// (`None`) see public files only.
    pub async fn list_visible_to(
        &self,
        viewer: Option<i64>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<FileRecord>> {
        let query = format!(
            "SELECT {FILE_COLUMNS} FROM files f
             LEFT JOIN access_records a ON a.file_id = f.id AND a.user_id = ?
             WHERE f.public = 1 OR f.author_id = ? OR a.id IS NOT NULL
             ORDER BY f.id DESC
             LIMIT ? OFFSET ?"
        );
        let rows = sqlx::query_as::<_, FileRow>(&query)
            .bind(viewer)
            .bind(viewer)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await
            .map_err(|e| FilehostError::Database(e.to_string()))?;

        rows.into_iter().map(FileRow::into_record).collect()
    }

    /// Count files the viewer may see.
    pub async fn count_visible_to(&self, viewer: Option<i64>) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM files f
             LEFT JOIN access_records a ON a.file_id = f.id AND a.user_id = ?
             WHERE f.public = 1 OR f.author_id = ? OR a.id IS NOT NULL",
        )
        .bind(viewer)
        .bind(viewer)
        .fetch_one(self.pool)
        .await
        .map_err(|e| FilehostError::Database(e.to_string()))?;
        Ok(count.0)
    }

    /// Update file metadata.
    ///
    /// Returns the updated file, or None if not found.
    pub async fn update(&self, id: i64, update: &FileUpdate) -> Result<Option<FileRecord>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE files SET ");
        let mut separated = query.separated(", ");

        if let Some(ref name) = update.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name);
        }
        if let Some(ref description) = update.description {
            separated.push("description = ");
            separated.push_bind_unseparated(description.clone());
        }
        if let Some(public) = update.public {
            separated.push("public = ");
            separated.push_bind_unseparated(public);
        }

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| FilehostError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Delete a file by ID.
    ///
    /// Comments, grants and the blob row go with it.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| FilehostError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    /// Count all files.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM files")
            .fetch_one(self.pool)
            .await
            .map_err(|e| FilehostError::Database(e.to_string()))?;
        Ok(count.0)
    }
}

#[derive(sqlx::FromRow)]
struct FileRow {
    id: i64,
    name: String,
    description: Option<String>,
    author_id: i64,
    public: bool,
    file_type: i64,
    file_id: i64,
    mime_type: String,
    size: i64,
    checksum: String,
    width: Option<i64>,
    height: Option<i64>,
    thumbnail: Option<String>,
    qualities: Option<String>,
    created_at: String,
}

impl FileRow {
    fn into_record(self) -> Result<FileRecord> {
        let storage = StorageClass::from_i64(self.file_type).ok_or_else(|| {
            FilehostError::Database(format!(
                "file {} has unknown file_type {}",
                self.id, self.file_type
            ))
        })?;

        let qualities = match self.qualities.as_deref() {
            Some(json) => serde_json::from_str(json).unwrap_or_else(|e| {
                warn!(file_id = self.id, error = %e, "Ignoring malformed qualities");
                Vec::new()
            }),
            None => Vec::new(),
        };

        Ok(FileRecord {
            id: self.id,
            name: self.name,
            description: self.description,
            author_id: self.author_id,
            public: self.public,
            storage,
            blob_id: self.file_id,
            mime_type: self.mime_type,
            size: self.size,
            checksum: self.checksum,
            width: self.width,
            height: self.height,
            thumbnail: self.thumbnail,
            qualities,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, NewUser, UserRepository};

    async fn setup() -> (Database, i64) {
        let db = Database::open_in_memory().await.unwrap();
        let user = UserRepository::new(db.pool())
            .create(&NewUser::new("alice@example.com", "alice", "pw"))
            .await
            .unwrap();
        (db, user.id)
    }

    async fn blob_count(db: &Database, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_small_file() {
        let (db, author) = setup().await;
        let repo = FileRepository::new(db.pool()).with_small_file_limit(16);

        let file = repo
            .create(&NewFile::new(author, "hello.txt", b"hello".to_vec()).with_description("hi"))
            .await
            .unwrap();

        assert_eq!(file.name, "hello.txt");
        assert_eq!(file.description.as_deref(), Some("hi"));
        assert_eq!(file.storage, StorageClass::Small);
        assert_eq!(file.size, 5);
        assert_eq!(file.mime_type, "text/plain");
        assert!(!file.public);
        assert_eq!(
            file.checksum,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_eq!(repo.load_data(&file).await.unwrap(), b"hello");
        assert_eq!(blob_count(&db, "small_files").await, 1);
        assert_eq!(blob_count(&db, "large_files").await, 0);
    }

    #[tokio::test]
    async fn test_storage_class_boundary() {
        let (db, author) = setup().await;
        let repo = FileRepository::new(db.pool()).with_small_file_limit(4);

        let at_limit = repo
            .create(&NewFile::new(author, "a.bin", vec![1u8; 4]))
            .await
            .unwrap();
        let over_limit = repo
            .create(&NewFile::new(author, "b.bin", vec![2u8; 5]))
            .await
            .unwrap();

        assert_eq!(at_limit.storage, StorageClass::Small);
        assert_eq!(over_limit.storage, StorageClass::Large);
        assert_eq!(repo.load_data(&over_limit).await.unwrap(), vec![2u8; 5]);
    }

    #[tokio::test]
    async fn test_create_with_media_metadata() {
        let (db, author) = setup().await;
        let repo = FileRepository::new(db.pool());

        let file = repo
            .create(
                &NewFile::new(author, "clip.mp4", vec![0u8; 32])
                    .with_public(true)
                    .with_dimensions(1920, 1080)
                    .with_thumbnail("https://cdn.example.com/clip.jpg")
                    .with_quality(Quality::new("1080p", "/files/1/raw"))
                    .with_quality(Quality::new("480p", "https://cdn.example.com/480.mp4")),
            )
            .await
            .unwrap();

        assert_eq!(file.kind(), FileKind::Video);
        assert_eq!(file.mime_type, "video/mp4");
        assert_eq!(file.width, Some(1920));
        assert_eq!(file.height, Some(1080));
        assert_eq!(file.qualities.len(), 2);
        assert_eq!(file.qualities[1].label, "480p");
    }

    #[tokio::test]
    async fn test_create_requires_author() {
        let (db, _) = setup().await;
        let repo = FileRepository::new(db.pool());

        let result = repo.create(&NewFile::new(999, "x.txt", b"x".to_vec())).await;
        assert!(result.is_err());
        // The blob insert is rolled back with the failed metadata insert.
        assert_eq!(blob_count(&db, "small_files").await, 0);
    }

    #[tokio::test]
    async fn test_update_file() {
        let (db, author) = setup().await;
        let repo = FileRepository::new(db.pool());
        let file = repo
            .create(&NewFile::new(author, "a.txt", b"a".to_vec()).with_description("old"))
            .await
            .unwrap();

        let updated = repo
            .update(
                file.id,
                &FileUpdate::new().name("b.txt").description(None).public(true),
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "b.txt");
        assert!(updated.description.is_none());
        assert!(updated.public);
        assert!(repo
            .update(999, &FileUpdate::new().public(false))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_removes_blob() {
        let (db, author) = setup().await;
        let repo = FileRepository::new(db.pool()).with_small_file_limit(1);
        let small = repo
            .create(&NewFile::new(author, "s.bin", vec![0u8; 1]))
            .await
            .unwrap();
        let large = repo
            .create(&NewFile::new(author, "l.bin", vec![0u8; 2]))
            .await
            .unwrap();

        assert!(repo.delete(small.id).await.unwrap());
        assert!(repo.delete(large.id).await.unwrap());
        assert!(!repo.delete(large.id).await.unwrap());

        assert_eq!(blob_count(&db, "small_files").await, 0);
        assert_eq!(blob_count(&db, "large_files").await, 0);
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_by_author() {
        let (db, author) = setup().await;
        let other = UserRepository::new(db.pool())
            .create(&NewUser::new("bob@example.com", "bob", "pw"))
            .await
            .unwrap();
        let repo = FileRepository::new(db.pool());

        repo.create(&NewFile::new(author, "1.txt", b"1".to_vec()))
            .await
            .unwrap();
        repo.create(&NewFile::new(author, "2.txt", b"2".to_vec()))
            .await
            .unwrap();
        repo.create(&NewFile::new(other.id, "3.txt", b"3".to_vec()))
            .await
            .unwrap();

        let files = repo.list_by_author(author).await.unwrap();
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["2.txt", "1.txt"]);
    }

    #[tokio::test]
    async fn test_malformed_qualities_are_ignored() {
        let (db, author) = setup().await;
        let repo = FileRepository::new(db.pool());
        let file = repo
            .create(&NewFile::new(author, "v.mp4", b"v".to_vec()))
            .await
            .unwrap();

        sqlx::query("UPDATE files SET qualities = 'not json' WHERE id = ?")
            .bind(file.id)
            .execute(db.pool())
            .await
            .unwrap();

        let file = repo.get_by_id(file.id).await.unwrap().unwrap();
        assert!(file.qualities.is_empty());
    }
}
