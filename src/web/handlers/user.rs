//! User handlers for the web API.
//!
//! Deleting a user removes their files, comments and grants with them.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::db::UserRepository;
use crate::web::dto::{ApiResponse, UserResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// GET /api/users/me - The authenticated user.
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "users",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.current_user(&claims).await?;
    Ok(Json(ApiResponse::new(user.into())))
}

/// DELETE /api/users/me - Delete the authenticated user's account.
#[utoipa::path(
    delete,
    path = "/api/users/me",
    tag = "users",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_me(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<StatusCode, ApiError> {
    let user = state.current_user(&claims).await?;
    UserRepository::new(state.db.pool()).delete(user.id).await?;
    tracing::info!(user_id = user.id, "Account deleted by owner");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/users/:id - Remove any user. Admin only.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let admin = state.current_user(&claims).await?;
    if !admin.is_admin() {
        return Err(ApiError::forbidden("Admin access required"));
    }

    let deleted = UserRepository::new(state.db.pool()).delete(user_id).await?;
    if !deleted {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::info!(user_id, admin_id = admin.id, "User deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}
