// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth flow controller tests.
//!
//! These tests verify the state transitions and that credentials are written
//! all-or-nothing.

use serde_json::json;
use trailbook::db::{keys, load_credentials, CredentialStore};
use trailbook::error::OAuthError;
use trailbook::services::AuthState;
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

mod common;
use common::{create_test_app, seed_credentials, TOKEN_PATH};

#[tokio::test]
async fn test_load_state_from_store() {
    let server = MockServer::start().await;
    let (app, store) = create_test_app(&server);

    let mut oauth = app.oauth();
    assert_eq!(oauth.load().await.unwrap(), AuthState::Unauthenticated);

    // Expired tokens still count as authenticated at startup.
    seed_credentials(&store, -3600).await;
    assert_eq!(oauth.load().await.unwrap(), AuthState::Authenticated);
}

#[tokio::test]
async fn test_initiate_builds_authorization_url() {
    let server = MockServer::start().await;
    let (app, _store) = create_test_app(&server);

    let mut oauth = app.oauth();
    let url = oauth.initiate();

    assert_eq!(oauth.state(), AuthState::AwaitingRedirect);
    assert!(url.starts_with(&format!("{}/oauth/authorize?", server.uri())));
    assert!(url.contains("client_id=test_client_id"));
    assert!(url.contains("response_type=code"));
    assert!(url.contains("redirect_uri=trailbook%3A%2F%2Fcallback"));
    assert!(url.contains("scope=activity:read_all"));
}

#[tokio::test]
async fn test_callback_without_code_keeps_waiting() {
    let server = MockServer::start().await;
    Mock::given(matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let (app, store) = create_test_app(&server);
    let mut oauth = app.oauth();
    oauth.initiate();

    let state = oauth
        .handle_callback("trailbook://callback?state=&error=access_denied")
        .await
        .unwrap();

    assert_eq!(state, AuthState::AwaitingRedirect);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_callback_exchanges_code_and_persists_all_fields() {
    let server = MockServer::start().await;
    let expires_at = chrono::Utc::now().timestamp() + 21600;

    Mock::given(matchers::method("POST"))
        .and(matchers::path(TOKEN_PATH))
        .and(matchers::body_partial_json(json!({
            "client_id": "test_client_id",
            "client_secret": "test_secret",
            "code": "auth_code_123",
            "grant_type": "authorization_code",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "expires_at": expires_at,
            "expires_in": 21600,
            "refresh_token": "initial_refresh",
            "access_token": "initial_access",
            "athlete": {"id": 134815, "firstname": "Jane", "lastname": "Doe"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (app, store) = create_test_app(&server);
    let mut oauth = app.oauth();
    oauth.initiate();

    let state = oauth
        .handle_callback(
            "trailbook://callback?state=&code=auth_code_123&scope=read,activity:read_all",
        )
        .await
        .unwrap();
    assert_eq!(state, AuthState::Authenticated);

    let record = load_credentials(&*store).await.unwrap().unwrap();
    assert_eq!(record.access_token, "initial_access");
    assert_eq!(record.refresh_token, "initial_refresh");
    assert_eq!(record.expires_at, expires_at);

    // The stored token is now usable without a refresh.
    assert_eq!(
        app.tokens().resolve_access_token().await.as_deref(),
        Some("initial_access")
    );
}

#[tokio::test]
async fn test_exchange_missing_refresh_token_persists_nothing() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "initial_access",
            "expires_at": chrono::Utc::now().timestamp() + 3600,
        })))
        .mount(&server)
        .await;

    let (app, store) = create_test_app(&server);
    let mut oauth = app.oauth();
    oauth.initiate();

    let err = oauth
        .handle_callback("trailbook://callback?code=abc")
        .await
        .unwrap_err();

    assert!(matches!(err, OAuthError::Exchange(_)));
    assert_eq!(oauth.state(), AuthState::Unauthenticated);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_exchange_rejected_returns_error() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Bad Request",
            "errors": [{"resource": "AuthorizationCode", "field": "code", "code": "invalid"}]
        })))
        .mount(&server)
        .await;

    let (app, store) = create_test_app(&server);
    let mut oauth = app.oauth();
    oauth.initiate();

    let result = oauth.handle_callback("trailbook://callback?code=used").await;
    assert!(matches!(result, Err(OAuthError::Exchange(_))));
    assert_eq!(oauth.state(), AuthState::Unauthenticated);
    assert!(store.get(keys::ACCESS_TOKEN).await.unwrap().is_none());
}

#[tokio::test]
async fn test_callback_ignored_when_authenticated() {
    let server = MockServer::start().await;
    Mock::given(matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let (app, store) = create_test_app(&server);
    seed_credentials(&store, 3600).await;

    let mut oauth = app.oauth();
    oauth.load().await.unwrap();
    let state = oauth
        .handle_callback("trailbook://callback?code=late")
        .await
        .unwrap();
    assert_eq!(state, AuthState::Authenticated);
}

#[tokio::test]
async fn test_logout_clears_credentials() {
    let server = MockServer::start().await;
    let (app, store) = create_test_app(&server);
    seed_credentials(&store, 3600).await;

    let mut oauth = app.oauth();
    oauth.load().await.unwrap();
    oauth.logout().await.unwrap();

    assert_eq!(oauth.state(), AuthState::Unauthenticated);
    assert!(store.is_empty().await);
    assert_eq!(oauth.load().await.unwrap(), AuthState::Unauthenticated);
}
