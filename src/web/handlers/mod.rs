//! Request handlers for pages and the JSON API.

pub mod access;
pub mod comment;
pub mod file;
pub mod page;
pub mod user;

pub use access::*;
pub use comment::*;
pub use file::*;
pub use page::*;
pub use user::*;

use jsonwebtoken::{encode, EncodingKey, Header};
use std::sync::Arc;

use crate::comment::CommentService;
use crate::config::Config;
use crate::db::{User, UserRepository};
use crate::file::{FileService, DEFAULT_SMALL_FILE_LIMIT};
use crate::render::{PageRenderer, SiteContext};
use crate::web::error::ApiError;
use crate::web::middleware::JwtClaims;
use crate::Database;

/// Database handle shared by all handlers.
pub type SharedDatabase = Arc<Database>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: SharedDatabase,
    /// JWT encoding key.
    pub encoding_key: EncodingKey,
    /// Access token expiry in seconds.
    pub access_token_expiry: u64,
    /// Compiled page templates.
    pub renderer: Arc<PageRenderer>,
    /// Largest file, in bytes, stored in `small_files`.
    pub small_file_limit: u64,
    /// Longest accepted comment, in characters.
    pub max_comment_length: usize,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        db: SharedDatabase,
        jwt_secret: &str,
        access_expiry: u64,
        renderer: PageRenderer,
    ) -> Self {
        Self {
            db,
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            access_token_expiry: access_expiry,
            renderer: Arc::new(renderer),
            small_file_limit: DEFAULT_SMALL_FILE_LIMIT,
            max_comment_length: crate::comment::MAX_COMMENT_LENGTH,
        }
    }

    /// Build the state from the loaded configuration.
    pub fn from_config(db: SharedDatabase, config: &Config) -> crate::Result<Self> {
        let renderer =
            PageRenderer::new(SiteContext::from_config(config))?.with_debug(config.site.debug);
        Ok(Self::new(
            db,
            &config.server.jwt_secret,
            config.server.jwt_access_token_expiry_secs,
            renderer,
        )
        .with_small_file_limit(config.files.small_file_limit())
        .with_max_comment_length(config.files.max_comment_length))
    }

    /// Set the small-file limit.
    pub fn with_small_file_limit(mut self, limit: u64) -> Self {
        self.small_file_limit = limit;
        self
    }

    /// Set the maximum comment length.
    pub fn with_max_comment_length(mut self, max_length: usize) -> Self {
        self.max_comment_length = max_length;
        self
    }

    /// File service bound to the pool.
    pub fn files(&self) -> FileService<'_> {
        FileService::new(self.db.pool()).with_small_file_limit(self.small_file_limit)
    }

    /// Comment service bound to the pool.
    pub fn comments(&self) -> CommentService<'_> {
        CommentService::new(self.db.pool()).with_max_length(self.max_comment_length)
    }

    /// Generate an access token for a user.
    pub fn generate_access_token(&self, user: &User) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = JwtClaims {
            sub: user.id,
            username: user.username.clone(),
            access_level: user.access_level.as_i64(),
            iat: now,
            exp: now + self.access_token_expiry,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode JWT: {}", e);
            ApiError::internal("Failed to generate token")
        })
    }

    /// Load the user a token was issued to.
    ///
    /// Access level is read from the database, not the token, so demotions
    /// apply immediately. A token for a deleted user is rejected.
    pub async fn current_user(&self, claims: &JwtClaims) -> Result<User, ApiError> {
        UserRepository::new(self.db.pool())
            .get_by_id(claims.sub)
            .await?
            .ok_or_else(|| ApiError::unauthorized("User no longer exists"))
    }

    /// Like [`current_user`](Self::current_user), but anonymous when there is
    /// no token or the user is gone.
    pub async fn viewer(&self, claims: Option<&JwtClaims>) -> Result<Option<User>, ApiError> {
        match claims {
            Some(claims) => Ok(UserRepository::new(self.db.pool())
                .get_by_id(claims.sub)
                .await?),
            None => Ok(None),
        }
    }
}
