//! Access grant handlers for the web API.
//!
//! All routes are limited to the file's author.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::web::dto::{AccessGrantResponse, ApiResponse, GrantAccessRequest, ValidatedJson};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// GET /api/files/:id/access - Users granted access to a private file.
#[utoipa::path(
    get,
    path = "/api/files/{id}/access",
    tag = "access",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "Grants", body = Vec<AccessGrantResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "File not found or not visible")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_access(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(file_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<AccessGrantResponse>>>, ApiError> {
    let user = state.current_user(&claims).await?;
    let grants = state.files().list_access(file_id, &user).await?;
    Ok(Json(ApiResponse::new(
        grants.into_iter().map(AccessGrantResponse::from).collect(),
    )))
}

/// POST /api/files/:id/access - Grant a user access. Granting twice is a no-op.
#[utoipa::path(
    post,
    path = "/api/files/{id}/access",
    tag = "access",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    request_body = GrantAccessRequest,
    responses(
        (status = 201, description = "Access granted", body = AccessGrantResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "File or user not found"),
        (status = 422, description = "Target is the author")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn grant_access(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(file_id): Path<i64>,
    ValidatedJson(req): ValidatedJson<GrantAccessRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AccessGrantResponse>>), ApiError> {
    let user = state.current_user(&claims).await?;
    let record = state
        .files()
        .grant_access(file_id, &user, req.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(record.into()))))
}

/// DELETE /api/files/:id/access/:user_id - Revoke a user's access.
#[utoipa::path(
    delete,
    path = "/api/files/{id}/access/{user_id}",
    tag = "access",
    params(
        ("id" = i64, Path, description = "File ID"),
        ("user_id" = i64, Path, description = "User losing access")
    ),
    responses(
        (status = 204, description = "Access revoked"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "File or grant not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn revoke_access(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path((file_id, user_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    let user = state.current_user(&claims).await?;
    state.files().revoke_access(file_id, &user, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
