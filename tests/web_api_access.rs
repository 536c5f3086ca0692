//! Access grant API tests.

mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use common::{create_file, create_test_app, create_user};
use filehost::file::AccessRepository;
use serde_json::{json, Value};

#[tokio::test]
async fn test_grant_makes_private_file_visible() {
    let app = create_test_app().await;
    let alice = create_user(&app.db, "alice").await;
    let bob = create_user(&app.db, "bob").await;
    let file = create_file(&app.db, &alice, "report.pdf", b"%PDF", false).await;
    let file_path = format!("/api/files/{}", file.id);

    app.server
        .get(&file_path)
        .add_header(AUTHORIZATION, app.bearer(&bob))
        .expect_failure()
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let response = app
        .server
        .post(&format!("/api/files/{}/access", file.id))
        .add_header(AUTHORIZATION, app.bearer(&alice))
        .json(&json!({ "user_id": bob.id }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["data"]["user_id"], bob.id);

    app.server
        .get(&file_path)
        .add_header(AUTHORIZATION, app.bearer(&bob))
        .await
        .assert_status_ok();

    let response = app
        .server
        .get(&format!("/files/{}/raw", file.id))
        .add_header(AUTHORIZATION, app.bearer(&bob))
        .await;
    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), b"%PDF");
}

#[tokio::test]
async fn test_grant_twice_is_idempotent() {
    let app = create_test_app().await;
    let alice = create_user(&app.db, "alice").await;
    let bob = create_user(&app.db, "bob").await;
    let file = create_file(&app.db, &alice, "a.txt", b"x", false).await;
    let path = format!("/api/files/{}/access", file.id);

    for _ in 0..2 {
        app.server
            .post(&path)
            .add_header(AUTHORIZATION, app.bearer(&alice))
            .json(&json!({ "user_id": bob.id }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let body: Value = app
        .server
        .get(&path)
        .add_header(AUTHORIZATION, app.bearer(&alice))
        .await
        .json();
    let grants = body["data"].as_array().unwrap();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0]["username"], "bob");
    assert_eq!(AccessRepository::new(app.db.pool()).count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_grant_rejections() {
    let app = create_test_app().await;
    let alice = create_user(&app.db, "alice").await;
    let bob = create_user(&app.db, "bob").await;
    let file = create_file(&app.db, &alice, "a.txt", b"x", true).await;
    let path = format!("/api/files/{}/access", file.id);

    // To the author.
    app.server
        .post(&path)
        .add_header(AUTHORIZATION, app.bearer(&alice))
        .json(&json!({ "user_id": alice.id }))
        .expect_failure()
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    // To a missing user.
    app.server
        .post(&path)
        .add_header(AUTHORIZATION, app.bearer(&alice))
        .json(&json!({ "user_id": 9999 }))
        .expect_failure()
        .await
        .assert_status(StatusCode::NOT_FOUND);

    // By someone who is not the author.
    app.server
        .post(&path)
        .add_header(AUTHORIZATION, app.bearer(&bob))
        .json(&json!({ "user_id": bob.id }))
        .expect_failure()
        .await
        .assert_status(StatusCode::FORBIDDEN);

    // Malformed body.
    app.server
        .post(&path)
        .add_header(AUTHORIZATION, app.bearer(&alice))
        .json(&json!({ "user_id": "bob" }))
        .expect_failure()
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_grantee_cannot_manage_grants() {
    let app = create_test_app().await;
    let alice = create_user(&app.db, "alice").await;
    let bob = create_user(&app.db, "bob").await;
    let carol = create_user(&app.db, "carol").await;
    let file = create_file(&app.db, &alice, "a.txt", b"x", false).await;

    AccessRepository::new(app.db.pool())
        .grant(file.id, bob.id)
        .await
        .unwrap();

    app.server
        .get(&format!("/api/files/{}/access", file.id))
        .add_header(AUTHORIZATION, app.bearer(&bob))
        .expect_failure()
        .await
        .assert_status(StatusCode::FORBIDDEN);

    app.server
        .post(&format!("/api/files/{}/access", file.id))
        .add_header(AUTHORIZATION, app.bearer(&bob))
        .json(&json!({ "user_id": carol.id }))
        .expect_failure()
        .await
        .assert_status(StatusCode::FORBIDDEN);

    // Non-grantees do not learn the file exists.
    app.server
        .get(&format!("/api/files/{}/access", file.id))
        .add_header(AUTHORIZATION, app.bearer(&carol))
        .expect_failure()
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_revoke_access() {
    let app = create_test_app().await;
    let alice = create_user(&app.db, "alice").await;
    let bob = create_user(&app.db, "bob").await;
    let file = create_file(&app.db, &alice, "a.txt", b"x", false).await;
    let revoke_path = format!("/api/files/{}/access/{}", file.id, bob.id);

    AccessRepository::new(app.db.pool())
        .grant(file.id, bob.id)
        .await
        .unwrap();

    app.server
        .delete(&revoke_path)
        .add_header(AUTHORIZATION, app.bearer(&alice))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.server
        .get(&format!("/api/files/{}", file.id))
        .add_header(AUTHORIZATION, app.bearer(&bob))
        .expect_failure()
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let response = app
        .server
        .delete(&revoke_path)
        .add_header(AUTHORIZATION, app.bearer(&alice))
        .expect_failure()
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"]["message"], "access record not found");
}
