//! Configuration module for filehost.

use serde::Deserialize;
use std::path::Path;

use crate::{FilehostError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public base URL used in Open Graph tags (no trailing slash).
    #[serde(default = "default_public_url")]
    pub public_url: String,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// JWT secret key shared with the login service.
    #[serde(default)]
    pub jwt_secret: String,
    /// Access token expiry in seconds.
    #[serde(default = "default_jwt_access_expiry")]
    pub jwt_access_token_expiry_secs: u64,
    /// Whether to serve the static assets directory.
    #[serde(default = "default_serve_static")]
    pub serve_static: bool,
    /// Path to static assets directory.
    #[serde(default = "default_static_path")]
    pub static_path: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_public_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_jwt_access_expiry() -> u64 {
    900 // 15 minutes
}

fn default_serve_static() -> bool {
    true
}

fn default_static_path() -> String {
    "static".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: default_public_url(),
            cors_origins: vec![],
            jwt_secret: String::new(),
            jwt_access_token_expiry_secs: default_jwt_access_expiry(),
            serve_static: default_serve_static(),
            static_path: default_static_path(),
        }
    }
}

impl ServerConfig {
    /// Public base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.public_url.trim_end_matches('/')
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/filehost.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Files up to this size (in KiB) go to the `small_files` table.
    #[serde(default = "default_small_file_limit")]
    pub small_file_limit_kb: u64,
    /// Maximum comment length in characters.
    #[serde(default = "default_max_comment_length")]
    pub max_comment_length: usize,
}

fn default_small_file_limit() -> u64 {
    1024
}

fn default_max_comment_length() -> usize {
    crate::comment::MAX_COMMENT_LENGTH
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            small_file_limit_kb: default_small_file_limit(),
            max_comment_length: default_max_comment_length(),
        }
    }
}

impl FilesConfig {
    /// Small-file limit in bytes. Huge values saturate.
    pub fn small_file_limit(&self) -> u64 {
        self.small_file_limit_kb.saturating_mul(1024)
    }
}

/// Site information shown on pages and in Open Graph tags.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Name of the site.
    #[serde(default = "default_site_name")]
    pub name: String,
    /// Default description for pages without one.
    #[serde(default = "default_site_description")]
    pub description: String,
    /// Timezone for displaying dates (e.g., "Europe/London", "UTC").
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Debug mode (template render errors carry source context).
    #[serde(default)]
    pub debug: bool,
}

fn default_site_name() -> String {
    "filehost".to_string()
}

fn default_site_description() -> String {
    "Share files with the people you choose".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            description: default_site_description(),
            timezone: default_timezone(),
            debug: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file (empty disables file logging).
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/filehost.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// File storage configuration.
    #[serde(default)]
    pub files: FilesConfig,
    /// Site information.
    #[serde(default)]
    pub site: SiteConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(FilehostError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    ///
    /// A `.env` file in the working directory is read first if present.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        let _ = dotenvy::dotenv();
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| FilehostError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `FILEHOST_JWT_SECRET`
    /// - `FILEHOST_DATABASE_PATH`
    /// - `FILEHOST_PUBLIC_URL`
    /// - `FILEHOST_DEBUG` (`true` / `false`)
    pub fn apply_env_overrides(&mut self) {
        if let Some(secret) = non_empty_var("FILEHOST_JWT_SECRET") {
            self.server.jwt_secret = secret;
        }
        if let Some(path) = non_empty_var("FILEHOST_DATABASE_PATH") {
            self.database.path = path;
        }
        if let Some(url) = non_empty_var("FILEHOST_PUBLIC_URL") {
            self.server.public_url = url;
        }
        if let Some(debug) = non_empty_var("FILEHOST_DEBUG") {
            self.site.debug = debug.eq_ignore_ascii_case("true");
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the JWT secret is not set
    /// - the small-file limit is zero
    pub fn validate(&self) -> Result<()> {
        if self.server.jwt_secret.is_empty() {
            return Err(FilehostError::Config(
                "server.jwt_secret must be set (or FILEHOST_JWT_SECRET)".to_string(),
            ));
        }
        if self.files.small_file_limit_kb == 0 {
            return Err(FilehostError::Config(
                "files.small_file_limit_kb must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
