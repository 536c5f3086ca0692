//! File metadata handlers for the web API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::web::dto::{
    ApiResponse, FileResponse, PaginatedResponse, PaginationQuery, UpdateFileRequest,
    ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::{AuthUser, OptionalAuthUser};

/// GET /api/files - List files visible to the requester, newest first.
#[utoipa::path(
    get,
    path = "/api/files",
    tag = "files",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Visible files", body = Vec<FileResponse>)
    )
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(claims): OptionalAuthUser,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<FileResponse>>, ApiError> {
    let viewer = state.viewer(claims.as_ref()).await?;
    let (offset, limit) = pagination.offset_limit();

    let (files, total) = state
        .files()
        .list_visible(viewer.as_ref(), offset, limit)
        .await?;

    let data = files.into_iter().map(FileResponse::from).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        pagination.page(),
        pagination.per_page(),
        total.max(0) as u64,
    )))
}

/// GET /api/files/:id - File metadata.
#[utoipa::path(
    get,
    path = "/api/files/{id}",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File metadata", body = FileResponse),
        (status = 404, description = "File not found or not visible")
    )
)]
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(claims): OptionalAuthUser,
    Path(file_id): Path<i64>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let viewer = state.viewer(claims.as_ref()).await?;
    let file = state.files().get_visible(file_id, viewer.as_ref()).await?;
    Ok(Json(ApiResponse::new(file.into())))
}

/// PATCH /api/files/:id - Update name, description or visibility.
#[utoipa::path(
    patch,
    path = "/api/files/{id}",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    request_body = UpdateFileRequest,
    responses(
        (status = 200, description = "Updated metadata", body = FileResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "File not found or not visible"),
        (status = 422, description = "Validation error")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_file(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(file_id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateFileRequest>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let user = state.current_user(&claims).await?;
    let file = state
        .files()
        .update(file_id, &req.into_update(), &user)
        .await?;
    Ok(Json(ApiResponse::new(file.into())))
}

/// DELETE /api/files/:id - Delete a file with its comments and grants.
#[utoipa::path(
    delete,
    path = "/api/files/{id}",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 204, description = "File deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author or an admin"),
        (status = 404, description = "File not found or not visible")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(file_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let user = state.current_user(&claims).await?;
    state.files().delete(file_id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}
