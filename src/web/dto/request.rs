//! Request DTOs for the web API.

use serde::{Deserialize, Deserializer};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::validation::non_blank_text;

/// Default page size for listings.
pub const DEFAULT_PER_PAGE: u32 = 20;
/// Largest accepted page size.
pub const MAX_PER_PAGE: u32 = 100;

/// Pagination query parameters.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    /// Page number, starting at 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

/// Access token passed in the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

impl PaginationQuery {
    /// Page number clamped to at least 1.
    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    /// Page size clamped to `1..=MAX_PER_PAGE`.
    pub fn per_page(&self) -> u32 {
        self.per_page.clamp(1, MAX_PER_PAGE)
    }

    /// SQL offset and limit.
    pub fn offset_limit(&self) -> (i64, i64) {
        let per_page = i64::from(self.per_page());
        ((i64::from(self.page()) - 1) * per_page, per_page)
    }
}

/// Partial update of file metadata.
///
/// An empty `description` clears it.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateFileRequest {
    /// New display name.
    #[validate(
        length(min = 1, max = 255, message = "Name must be 1-255 characters"),
        custom(function = "non_blank_text")
    )]
    pub name: Option<String>,
    /// New description.
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
    /// New visibility.
    pub public: Option<bool>,
}

impl UpdateFileRequest {
    /// Convert into the repository update.
    pub fn into_update(self) -> crate::file::FileUpdate {
        let description = self.description.map(|d| {
            let d = d.trim().to_string();
            if d.is_empty() {
                None
            } else {
                Some(d)
            }
        });
        crate::file::FileUpdate {
            name: self.name.map(|n| n.trim().to_string()),
            description,
            public: self.public,
        }
    }
}

/// New comment.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCommentRequest {
    /// Comment text.
    #[validate(custom(function = "non_blank_text"))]
    pub body: String,
}

/// Access grant for another user.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GrantAccessRequest {
    /// User receiving access.
    #[validate(range(min = 1, message = "Invalid user id"))]
    #[serde(deserialize_with = "deserialize_id")]
    pub user_id: i64,
}

/// Accept the id as a number or a numeric string; HTML forms send strings.
fn deserialize_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(i64),
        Text(String),
    }

    match Id::deserialize(deserializer)? {
        Id::Number(n) => Ok(n),
        Id::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
