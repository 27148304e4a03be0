//! End-to-end tests of `AuthClient` against a local mock of the login API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use loginkit_core::{ApiClient, AuthClient, Credentials, MemoryStore, User};

#[derive(Default)]
struct MockApi {
    logins: AtomicUsize,
    logouts: AtomicUsize,
    last_login_body: Mutex<Option<Value>>,
    last_logout_auth: Mutex<Option<String>>,
    logout_body: &'static str,
}

fn mock_user() -> User {
    User {
        id: 1,
        username: "testuser".to_string(),
        role: "admin".to_string(),
        token: "mockToken".to_string(),
    }
}

async fn login_handler(State(api): State<Arc<MockApi>>, Json(body): Json<Value>) -> Response {
    api.logins.fetch_add(1, Ordering::SeqCst);
    *api.last_login_body.lock().unwrap() = Some(body.clone());

    if body["username"] == "testuser" && body["password"] == "testpassword" {
        Json(mock_user()).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, "Invalid credentials").into_response()
    }
}

async fn logout_handler(State(api): State<Arc<MockApi>>, headers: HeaderMap) -> Response {
    api.logouts.fetch_add(1, Ordering::SeqCst);
    *api.last_logout_auth.lock().unwrap() = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    api.logout_body.into_response()
}

/// Start the mock API and return its login URL.
async fn spawn_api(logout_body: &'static str) -> (String, Arc<MockApi>) {
    let state = Arc::new(MockApi {
        logout_body,
        ..Default::default()
    });

    let app = Router::new()
        .route("/api/login", post(login_handler))
        .route("/api/login/logout", get(logout_handler))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/api/login", addr), state)
}

fn auth_client(url: &str) -> AuthClient<MemoryStore> {
    AuthClient::new(ApiClient::new(url).unwrap(), MemoryStore::new())
}

#[tokio::test]
async fn test_login_returns_server_payload() {
    let (url, api) = spawn_api("{}").await;
    let auth = auth_client(&url);

    let creds = Credentials::new("testuser", "testpassword").unwrap();
    let user = auth.login(&creds).await.unwrap();

    assert_eq!(user, mock_user());
    assert_eq!(api.logins.load(Ordering::SeqCst), 1);
    assert_eq!(
        api.last_login_body.lock().unwrap().clone(),
        Some(json!({"username": "testuser", "password": "testpassword"}))
    );
    // login alone stores nothing
    assert_eq!(auth.sessions().load().unwrap(), None);
}

#[tokio::test]
async fn test_login_invalid_credentials_is_401() {
    let (url, _api) = spawn_api("{}").await;
    let auth = auth_client(&url);

    let creds = Credentials::new("invaliduser", "invalidpassword").unwrap();
    let err = auth.login(&creds).await.unwrap_err();

    assert_eq!(err.status().map(|s| s.as_u16()), Some(401));
    assert_eq!(err.user_message(), "Invalid username or password");
}

#[tokio::test]
async fn test_logout_single_get_with_json_body() {
    let (url, api) = spawn_api("{}").await;
    let auth = auth_client(&url);

    auth.logout().await.unwrap();

    assert_eq!(api.logouts.load(Ordering::SeqCst), 1);
    assert_eq!(api.logins.load(Ordering::SeqCst), 0);
    assert_eq!(*api.last_logout_auth.lock().unwrap(), None);
}

#[tokio::test]
async fn test_logout_accepts_empty_body() {
    let (url, api) = spawn_api("").await;
    let auth = auth_client(&url);

    auth.logout().await.unwrap();
    assert_eq!(api.logouts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_sign_in_persists_and_grants_role() {
    let (url, _api) = spawn_api("{}").await;
    let auth = auth_client(&url);

    let creds = Credentials::new("testuser", "testpassword").unwrap();
    let user = auth.sign_in(&creds).await.unwrap();

    assert_eq!(auth.sessions().load().unwrap().as_deref(), Some("mockToken"));
    assert!(auth.has_permission("admin"));
    assert!(!auth.has_permission("user"));

    let session = auth.current_session().unwrap().unwrap();
    assert_eq!(session.user_id, user.id);
    assert_eq!(session.username, "testuser");
}

#[tokio::test]
async fn test_failed_sign_in_keeps_previous_state() {
    let (url, _api) = spawn_api("{}").await;
    let auth = auth_client(&url);
    auth.sessions().save("previousToken").unwrap();

    let creds = Credentials::new("testuser", "wrong").unwrap();
    assert!(auth.sign_in(&creds).await.is_err());
    assert_eq!(auth.sessions().load().unwrap().as_deref(), Some("previousToken"));
}

#[tokio::test]
async fn test_sign_out_sends_bearer_and_clears() {
    let (url, api) = spawn_api("{}").await;
    let auth = auth_client(&url);

    let creds = Credentials::new("testuser", "testpassword").unwrap();
    auth.sign_in(&creds).await.unwrap();
    auth.sign_out().await.unwrap();

    assert_eq!(api.logouts.load(Ordering::SeqCst), 1);
    assert_eq!(
        api.last_logout_auth.lock().unwrap().as_deref(),
        Some("Bearer mockToken")
    );
    assert_eq!(auth.sessions().load().unwrap(), None);
    assert!(!auth.has_permission("admin"));
}

#[tokio::test]
async fn test_sign_out_clears_even_when_server_unreachable() {
    // Nothing listens on the discard port
    let auth = auth_client("http://127.0.0.1:9/api/login");
    auth.sessions().save("mockToken").unwrap();

    assert!(auth.sign_out().await.is_err());
    assert_eq!(auth.sessions().load().unwrap(), None);
}
