//! HTTP server for filehost.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, Extensions, HeaderMap, StatusCode, Version};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::predicate::{DefaultPredicate, Predicate};
use tower_http::compression::CompressionLayer;

use crate::config::{Config, ServerConfig};
use crate::{Database, FilehostError, Result};

use super::handlers::{AppState, SharedDatabase};
use super::middleware::JwtState;
use super::router::{
    create_health_router, create_router, create_static_router, create_swagger_router,
};

/// Web server serving pages and the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// JWT state.
    jwt_state: Arc<JwtState>,
    /// Server configuration.
    server_config: ServerConfig,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &Config, db: SharedDatabase) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse::<SocketAddr>()
            .map_err(|e| {
                FilehostError::Config(format!(
                    "invalid server address {}:{}: {}",
                    config.server.host, config.server.port, e
                ))
            })?;

        let app_state = AppState::from_config(db, config)?;
        let jwt_state = Arc::new(JwtState::new(&config.server.jwt_secret));

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            jwt_state,
            server_config: config.server.clone(),
        })
    }

    /// Create a new web server owning a raw Database.
    pub fn from_database(config: &Config, db: Database) -> Result<Self> {
        Self::new(config, Arc::new(db))
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn build_router(self) -> Router {
        let mut router = create_router(
            self.app_state,
            self.jwt_state,
            &self.server_config.cors_origins,
        )
        .merge(create_health_router())
        .merge(create_swagger_router());

        if self.server_config.serve_static {
            if let Some(static_router) = create_static_router(&self.server_config.static_path) {
                router = router.merge(static_router);
            }
        }

        router.layer(
            CompressionLayer::new().compress_when(DefaultPredicate::new().and(without_entity_tag)),
        )
    }

    /// Run the web server until it fails.
    pub async fn run(self) -> std::result::Result<(), std::io::Error> {
        let addr = self.addr;
        let router = self.build_router();

        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Web server listening on http://{}", listener.local_addr()?);

        axum::serve(listener, router).await
    }

    /// Run the server in the background and return the bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::result::Result<SocketAddr, std::io::Error> {
        let addr = self.addr;
        let router = self.build_router();

        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

/// Responses with an `ETag` are sent as stored, so the tag always names the
/// bytes on the wire.
fn without_entity_tag(
    _status: StatusCode,
    _version: Version,
    headers: &HeaderMap,
    _extensions: &Extensions,
) -> bool {
    !headers.contains_key(header::ETAG)
}
