//! Comment handlers for the web API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::web::dto::{ApiResponse, CommentResponse, CreateCommentRequest, ValidatedJson};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::{AuthUser, OptionalAuthUser};

/// GET /api/files/:id/comments - Comments of a file, oldest first.
#[utoipa::path(
    get,
    path = "/api/files/{id}/comments",
    tag = "comments",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "Comments", body = Vec<CommentResponse>),
        (status = 404, description = "File not found or not visible")
    )
)]
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(claims): OptionalAuthUser,
    Path(file_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<CommentResponse>>>, ApiError> {
    let viewer = state.viewer(claims.as_ref()).await?;
    let comments = state.comments().list(file_id, viewer.as_ref()).await?;
    Ok(Json(ApiResponse::new(
        comments.into_iter().map(CommentResponse::from).collect(),
    )))
}

/// POST /api/files/:id/comments - Comment on a file.
#[utoipa::path(
    post,
    path = "/api/files/{id}/comments",
    tag = "comments",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Banned"),
        (status = 404, description = "File not found or not visible"),
        (status = 422, description = "Empty or too long")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(file_id): Path<i64>,
    ValidatedJson(req): ValidatedJson<CreateCommentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CommentResponse>>), ApiError> {
    let user = state.current_user(&claims).await?;
    let comment = state.comments().post(file_id, &user, &req.body).await?;

    let mut response = CommentResponse::from(comment);
    response.author_username = Some(user.username);
    Ok((StatusCode::CREATED, Json(ApiResponse::new(response))))
}

/// DELETE /api/comments/:id - Remove a comment.
#[utoipa::path(
    delete,
    path = "/api/comments/{id}",
    tag = "comments",
    params(
        ("id" = i64, Path, description = "Comment ID")
    ),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not allowed to remove this comment"),
        (status = 404, description = "Comment not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(comment_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let user = state.current_user(&claims).await?;
    state.comments().delete(comment_id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}
