use serde_json::{Value, json};

use crate::fixtures::test_app::TestApp;

#[tokio::test]
async fn valid_code_persists_token_file() {
    let app = TestApp::spawn().await;

    let resp = app.get_callback("validcode").await;

    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(
        resp.text().await.unwrap(),
        "Authentication successful! Please return to the console."
    );

    let token: Value =
        serde_json::from_slice(&std::fs::read(app.token_path()).unwrap()).unwrap();
    assert_eq!(token["type"], "authorized_user");
    assert_eq!(token["client_id"], "test-client");
    assert_eq!(token["client_secret"], "test-secret");
    assert_eq!(token["refresh_token"], "mock-refresh");
}

#[tokio::test]
async fn invalid_code_fails_and_leaves_no_token() {
    let app = TestApp::spawn().await;

    let resp = app.get_callback("invalid").await;

    assert_eq!(resp.status().as_u16(), 500);
    assert_eq!(resp.text().await.unwrap(), "Authentication failed");
    assert!(!app.token_path().exists());
}

#[tokio::test]
async fn invalid_code_leaves_existing_token_unchanged() {
    let app = TestApp::spawn().await;
    app.seed_stored_credential();
    let before = std::fs::read(app.token_path()).unwrap();

    let resp = app.get_callback("invalid").await;

    assert_eq!(resp.status().as_u16(), 500);
    assert_eq!(std::fs::read(app.token_path()).unwrap(), before);
}

#[tokio::test]
async fn missing_code_fails() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .get(app.url("/oauth2callback"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 500);
    assert_eq!(resp.text().await.unwrap(), "Authentication failed");
}

#[tokio::test]
async fn repeated_callback_rewrites_stable_token() {
    let app = TestApp::spawn().await;

    app.get_callback("validcode").await;
    let first = std::fs::read(app.token_path()).unwrap();
    app.get_callback("validcode").await;
    let second = std::fs::read(app.token_path()).unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn credential_from_callback_is_reused_by_uploads() {
    let app = TestApp::spawn().await;

    app.get_callback("validcode").await;
    assert_eq!(app.provider.exchange_calls(), 1);

    let resp = app
        .post_upload(&json!({
            "fileName": "a.pdf",
            "parentId": "p1",
            "mimeType": "application/pdf",
        }))
        .await;

    assert_eq!(resp.status().as_u16(), 200);
    // No second interactive flow.
    assert_eq!(app.provider.exchange_calls(), 1);
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = TestApp::spawn().await;

    let resp = app.client.get(app.url("/health")).send().await.unwrap();

    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "ok");
}
