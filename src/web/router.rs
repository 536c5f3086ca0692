//! Router configuration for pages, the JSON API and static assets.

use axum::{
    middleware,
    routing::{delete, get},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use super::dto;
use super::error::{ErrorBody, ErrorCode, ErrorDetail};
use super::handlers::{self, AppState};
use super::middleware::{create_cors_layer, jwt_auth, JwtState};

/// OpenAPI document for the JSON API.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::file::list_files,
        handlers::file::get_file,
        handlers::file::update_file,
        handlers::file::delete_file,
        handlers::comment::list_comments,
        handlers::comment::create_comment,
        handlers::comment::delete_comment,
        handlers::access::list_access,
        handlers::access::grant_access,
        handlers::access::revoke_access,
        handlers::user::me,
        handlers::user::delete_me,
        handlers::user::delete_user,
    ),
    components(schemas(
        dto::FileResponse,
        dto::QualityResponse,
        dto::CommentResponse,
        dto::AccessGrantResponse,
        dto::UserResponse,
        dto::PaginationMeta,
        dto::UpdateFileRequest,
        dto::CreateCommentRequest,
        dto::GrantAccessRequest,
        ErrorBody,
        ErrorDetail,
        ErrorCode,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "files", description = "File metadata"),
        (name = "comments", description = "Comments on files"),
        (name = "access", description = "Access grants for private files"),
        (name = "users", description = "Accounts")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the main router: HTML pages, raw files and `/api`.
pub fn create_router(
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    cors_origins: &[String],
) -> Router {
    let page_routes = Router::new()
        .route("/", get(handlers::index_page))
        .route("/files/:id", get(handlers::file_page))
        .route("/files/:id/raw", get(handlers::raw_file));

    let file_routes = Router::new()
        .route("/", get(handlers::list_files))
        .route(
            "/:id",
            get(handlers::get_file)
                .patch(handlers::update_file)
                .delete(handlers::delete_file),
        )
        .route(
            "/:id/comments",
            get(handlers::list_comments).post(handlers::create_comment),
        )
        .route(
            "/:id/access",
            get(handlers::list_access).post(handlers::grant_access),
        )
        .route("/:id/access/:user_id", delete(handlers::revoke_access));

    let api_routes = Router::new()
        .nest("/files", file_routes)
        .route("/comments/:id", delete(handlers::delete_comment))
        .route("/users/me", get(handlers::me).delete(handlers::delete_me))
        .route("/users/:id", delete(handlers::delete_user));

    let jwt_state_for_middleware = jwt_state.clone();

    Router::new()
        .merge(page_routes)
        .nest("/api", api_routes)
        .fallback(handlers::not_found_page)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let state = jwt_state_for_middleware.clone();
                    jwt_auth(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// Serve scripts, the stylesheet and icons under `/static`.
///
/// Returns `None` when the directory does not exist.
pub fn create_static_router(static_path: &str) -> Option<Router> {
    if !Path::new(static_path).is_dir() {
        tracing::warn!("Static directory not found: {}", static_path);
        return None;
    }
    Some(Router::new().nest_service("/static", ServeDir::new(static_path)))
}

/// Swagger UI at `/swagger-ui`, OpenAPI document at `/api-docs/openapi.json`.
pub fn create_swagger_router() -> Router {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_health_router() {
        let _router = create_health_router();
    }

    #[test]
    fn test_static_router_requires_directory() {
        assert!(create_static_router("does/not/exist").is_none());
        assert!(create_static_router(env!("CARGO_MANIFEST_DIR")).is_some());
    }

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/files/{id}"));
        assert!(doc.paths.paths.contains_key("/api/files/{id}/access/{user_id}"));
        assert!(doc.paths.paths.contains_key("/api/users/me"));

        let schemas = doc.components.unwrap().schemas;
        assert!(schemas.contains_key("ErrorBody"));
        assert!(schemas.contains_key("ErrorCode"));
    }
}
