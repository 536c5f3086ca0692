//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;

use filehost::db::{AccessLevel, NewUser, User, UserRepository};
use filehost::file::{FileRecord, FileRepository, NewFile};
use filehost::render::{PageRenderer, SiteContext};
use filehost::web::router::{create_health_router, create_router, create_static_router};
use filehost::web::{AppState, JwtState};
use filehost::Database;

pub const JWT_SECRET: &str = "test-secret-key-for-testing-only";

/// Server plus handles to the state behind it.
pub struct TestApp {
    pub server: TestServer,
    pub db: Arc<Database>,
    pub state: Arc<AppState>,
}

impl TestApp {
    /// `Bearer` header value for a user.
    pub fn bearer(&self, user: &User) -> String {
        format!("Bearer {}", self.token(user))
    }

    /// Access token for a user.
    pub fn token(&self, user: &User) -> String {
        self.state
            .generate_access_token(user)
            .expect("Failed to generate token")
    }
}

fn test_site() -> SiteContext {
    SiteContext {
        name: "filehost".to_string(),
        description: "Test instance".to_string(),
        base_url: "https://files.example.com".to_string(),
        timezone: "UTC".to_string(),
    }
}

/// Create a test server with an in-memory database.
pub async fn create_test_app() -> TestApp {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let db = Arc::new(db);

    let renderer = PageRenderer::new(test_site()).expect("Failed to compile templates");
    let state = Arc::new(AppState::new(db.clone(), JWT_SECRET, 900, renderer));
    let jwt_state = Arc::new(JwtState::new(JWT_SECRET));

    let static_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/static");
    let router = create_router(state.clone(), jwt_state, &[])
        .merge(create_health_router())
        .merge(create_static_router(static_dir).expect("static directory is missing"));

    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp { server, db, state }
}

/// Insert a user with the default access level.
pub async fn create_user(db: &Database, username: &str) -> User {
    create_user_with_level(db, username, AccessLevel::Default).await
}

/// Insert a user with the given access level.
pub async fn create_user_with_level(db: &Database, username: &str, level: AccessLevel) -> User {
    let new_user = NewUser::new(
        format!("{}@example.com", username),
        username,
        "not-a-real-hash",
    )
    .with_access_level(level);
    UserRepository::new(db.pool())
        .create(&new_user)
        .await
        .expect("Failed to create user")
}

/// Store a file.
pub async fn create_file(
    db: &Database,
    author: &User,
    name: &str,
    data: &[u8],
    public: bool,
) -> FileRecord {
    store(db, NewFile::new(author.id, name, data.to_vec()).with_public(public)).await
}

/// Store a prepared file.
pub async fn store(db: &Database, new_file: NewFile) -> FileRecord {
    FileRepository::new(db.pool())
        .create(&new_file)
        .await
        .expect("Failed to create file")
}
