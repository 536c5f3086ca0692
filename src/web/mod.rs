//! Web layer for filehost.
//!
//! Serves the server-rendered pages, raw file bytes, a JSON API for file
//! metadata, comments and access grants, and the static client assets.
//! Identity comes from a bearer JWT issued by an external login service.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use middleware::{JwtClaims, JwtState};
pub use router::{create_health_router, create_router, create_static_router, create_swagger_router};
pub use server::WebServer;
