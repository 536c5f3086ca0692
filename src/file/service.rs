//! File service for filehost.
//!
//! This module applies the access rules on top of the repositories:
//! - Visibility checks (hidden files read as not found)
//! - Author-only metadata edits and grant management
//! - Deletion by the author or an administrator

use tracing::info;

use crate::db::{DbPool, User, UserRepository};
use crate::{FilehostError, Result};

use super::access::{AccessGrant, AccessRecord, AccessRepository};
use super::metadata::{FileRecord, FileRepository, FileUpdate, NewFile};
use super::{DEFAULT_SMALL_FILE_LIMIT, MAX_DESCRIPTION_LENGTH, MAX_FILENAME_LENGTH};

/// File service enforcing visibility and ownership.
pub struct FileService<'a> {
    pool: &'a DbPool,
    small_file_limit: u64,
}

impl<'a> FileService<'a> {
    /// Create a new FileService.
    pub fn new(pool: &'a DbPool) -> Self {
        Self {
            pool,
            small_file_limit: DEFAULT_SMALL_FILE_LIMIT,
        }
    }

    /// Set the small-file limit in bytes.
    pub fn with_small_file_limit(mut self, small_file_limit: u64) -> Self {
        self.small_file_limit = small_file_limit;
        self
    }

    fn files(&self) -> FileRepository<'a> {
        FileRepository::new(self.pool).with_small_file_limit(self.small_file_limit)
    }

    fn access(&self) -> AccessRepository<'a> {
        AccessRepository::new(self.pool)
    }

    /// Store a new file after validating its name and description.
    pub async fn create(&self, new_file: &NewFile) -> Result<FileRecord> {
        validate_name(&new_file.name)?;
        validate_description(new_file.description.as_deref())?;

        let file = self.files().create(new_file).await?;
        info!(
            file_id = file.id,
            author_id = file.author_id,
            size = file.size,
            "File created"
        );
        Ok(file)
    }

    /// Get a file the viewer may see.
    ///
    /// Files that are missing and files the viewer may not see both return
    /// `NotFound`.
    pub async fn get_visible(&self, file_id: i64, viewer: Option<&User>) -> Result<FileRecord> {
        let file = self
            .files()
            .get_by_id(file_id)
            .await?
            .ok_or_else(|| FilehostError::NotFound("file".to_string()))?;

        if !self.access().can_view(&file, viewer.map(|u| u.id)).await? {
            return Err(FilehostError::NotFound("file".to_string()));
        }

        Ok(file)
    }

    /// List files visible to the viewer with the total count.
    pub async fn list_visible(
        &self,
        viewer: Option<&User>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<FileRecord>, i64)> {
        let viewer = viewer.map(|u| u.id);
        let files = self.files().list_visible_to(viewer, offset, limit).await?;
        let total = self.files().count_visible_to(viewer).await?;
        Ok((files, total))
    }

    /// Get a visible file that `user` authored.
    ///
    /// A visible file authored by someone else is a permission error.
    pub async fn require_author(&self, file_id: i64, user: &User) -> Result<FileRecord> {
        let file = self.get_visible(file_id, Some(user)).await?;
        if !file.is_author(user.id) {
            return Err(FilehostError::Permission(
                "only the author can manage this file".to_string(),
            ));
        }
        Ok(file)
    }

    /// Update name, description or visibility. Author only.
    pub async fn update(
        &self,
        file_id: i64,
        update: &FileUpdate,
        user: &User,
    ) -> Result<FileRecord> {
        self.require_author(file_id, user).await?;

        if let Some(ref name) = update.name {
            validate_name(name)?;
        }
        if let Some(ref description) = update.description {
            validate_description(description.as_deref())?;
        }

        self.files()
            .update(file_id, update)
            .await?
            .ok_or_else(|| FilehostError::NotFound("file".to_string()))
    }

    /// Delete a file.
    ///
    /// # Permission Check
    /// - The author can delete their own files
    /// - Admins can delete any file
    pub async fn delete(&self, file_id: i64, user: &User) -> Result<bool> {
        if !user.is_admin() {
            self.require_author(file_id, user).await?;
        }

        let deleted = self.files().delete(file_id).await?;
        if !deleted {
            return Err(FilehostError::NotFound("file".to_string()));
        }

        info!(file_id, user_id = user.id, "File deleted");
        Ok(deleted)
    }

    /// Grant another user access to a file. Author only.
    pub async fn grant_access(
        &self,
        file_id: i64,
        user: &User,
        target_user_id: i64,
    ) -> Result<AccessRecord> {
        let file = self.require_author(file_id, user).await?;

        if file.is_author(target_user_id) {
            return Err(FilehostError::Validation(
                "the author already has access".to_string(),
            ));
        }
        if !UserRepository::new(self.pool).exists(target_user_id).await? {
            return Err(FilehostError::NotFound("user".to_string()));
        }

        let record = self.access().grant(file_id, target_user_id).await?;
        info!(file_id, target_user_id, "Access granted");
        Ok(record)
    }

    /// Revoke a user's access to a file. Author only.
    pub async fn revoke_access(&self, file_id: i64, user: &User, target_user_id: i64) -> Result<()> {
        self.require_author(file_id, user).await?;

        if !self.access().revoke(file_id, target_user_id).await? {
            return Err(FilehostError::NotFound("access record".to_string()));
        }

        info!(file_id, target_user_id, "Access revoked");
        Ok(())
    }

    /// List grants of a file. Author only.
    pub async fn list_access(&self, file_id: i64, user: &User) -> Result<Vec<AccessGrant>> {
        self.require_author(file_id, user).await?;
        self.access().list_for_file(file_id).await
    }
}

fn validate_name(name: &str) -> Result<()> {
    let len = name.trim().chars().count();
    if len == 0 {
        return Err(FilehostError::Validation(
            "file name cannot be empty".to_string(),
        ));
    }
    if len > MAX_FILENAME_LENGTH {
        return Err(FilehostError::Validation(format!(
            "file name must be at most {MAX_FILENAME_LENGTH} characters"
        )));
    }
    Ok(())
}

fn validate_description(description: Option<&str>) -> Result<()> {
    if let Some(desc) = description {
        if desc.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(FilehostError::Validation(format!(
                "description must be at most {MAX_DESCRIPTION_LENGTH} characters"
            )));
        }
    }
    Ok(())
}
